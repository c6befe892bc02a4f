//! Recall HTTP server binary.
//! Run with: cargo run --bin recall-server

use std::process::ExitCode;

use recall_engine::start_recall_server;

fn main() -> ExitCode {
    start_recall_server::run()
}
