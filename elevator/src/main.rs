use std::process;

use tracing::error;

fn main() {
    if let Err(e) = elevator::modules::run() {
        error!("FATAL: {e}");
        process::exit(1);
    }
}
