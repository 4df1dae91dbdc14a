//! Chat summary server binary.
//! Run with: cargo run --bin chat-summary-server

use std::process::ExitCode;

use chat_summary::start_chat_summary;

fn main() -> ExitCode {
    start_chat_summary::run()
}
