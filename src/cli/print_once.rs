//! `--print-once`: run the panel command a single time

use crate::cli::exit_codes;
use crate::runner::{CodexBarCommand, CommandResult};

/// Print the panel output and return the process exit code
pub async fn run(command: &CodexBarCommand) -> i32 {
    let result = command.panel().await;
    print_result(&result);
    exit_code(&result)
}

fn print_result(result: &CommandResult) {
    if !result.stdout.is_empty() {
        println!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprintln!("{}", result.stderr);
    }
}

fn exit_code(result: &CommandResult) -> i32 {
    if result.ok {
        exit_codes::SUCCESS
    } else {
        exit_codes::UNEXPECTED_FAILURE
    }
}
