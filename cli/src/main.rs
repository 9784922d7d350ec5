use log::LevelFilter;
use std::env;
use std::process::ExitCode;
use taskreg_core::args::parse_args;
use taskreg_core::scheduler::{delete_task, register_task, TaskRequest, TASK_NAME};
use taskreg_core::utils::logging::init_logging;

fn main() -> ExitCode {
    init_logging(LevelFilter::Warn);

    let raw_args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw_args) {
        Ok(result) => result,
        Err(err) => {
            println!("[taskreg] {err}");
            println!("[taskreg] Usage: taskreg [/s] [/d] [/c <path>] [/a <args>]");
            return ExitCode::FAILURE;
        }
    };

    // Delete mode never builds a task definition
    if args.delete_requested {
        return match delete_task() {
            Ok(()) => {
                println!("[taskreg] Success! Task {TASK_NAME} deleted.");
                ExitCode::SUCCESS
            }
            Err(err) => {
                println!("[taskreg] {err}");
                ExitCode::FAILURE
            }
        };
    }

    let request = match TaskRequest::from_args(&args) {
        Ok(result) => result,
        Err(err) => {
            println!("[taskreg] {err}");
            return ExitCode::FAILURE;
        }
    };

    match register_task(&request) {
        Ok(()) => {
            println!("[taskreg] Success! Task {TASK_NAME} registered.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("[taskreg] {err}");
            ExitCode::FAILURE
        }
    }
}
