pub mod config;
pub mod debug;
pub mod elevator_status;
pub mod request_set;
