//! JsonDB CLI Entry Point
//!
//! This binary provides the command-line interface for JsonDB.

use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = jsondb_interface::run_cli().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
