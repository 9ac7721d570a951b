//! Binary entrypoint that launches the QA chat terminal client.

use std::process::ExitCode;

use qa_chat::start_chat_client;

fn main() -> ExitCode {
    start_chat_client::run()
}
