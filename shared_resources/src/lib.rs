pub mod call;
pub mod config;
pub mod direction;
pub mod error;
pub mod request;
pub mod status;
