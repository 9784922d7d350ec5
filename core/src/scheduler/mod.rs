use crate::args::InvocationArgs;
use crate::scheduler::error::SchedulerError;
use crate::utils::environment::default_command;
use log::error;

pub mod error;
#[cfg(target_os = "windows")]
mod service;

/// Name the task is always registered or deleted under
pub const TASK_NAME: &str = "netspi-native-exe-task";
/// Author recorded in the task registration info
pub const TASK_AUTHOR: &str = "NetSPI";
/// Identifier of the single registration trigger
pub const TRIGGER_ID: &str = "OneTimeTrigger";
/// Firing delay after registration, ISO-8601 duration
pub const TRIGGER_DELAY: &str = "PT30S";
/// Principal id used when running as the built-in system account
pub const SYSTEM_ACCOUNT: &str = "SYSTEM";

/// Resolved description of the task to register. Assembled fresh per
/// invocation, the host task store is the only system of record.
#[derive(Debug, PartialEq, Eq)]
pub struct TaskRequest {
    pub run_as_system: bool,
    pub command: String,
    pub arguments: Option<String>,
}

impl TaskRequest {
    /// Build a request from parsed arguments. Without an explicit `/c` value
    /// the command falls back to the system directory's default editor.
    pub fn from_args(args: &InvocationArgs) -> Result<TaskRequest, SchedulerError> {
        let command = match &args.command {
            Some(value) if !value.is_empty() => value.clone(),
            _ => {
                let default_result = default_command();
                match default_result {
                    Ok(result) => result,
                    Err(err) => {
                        error!("[scheduler] Could not resolve default command: {err:?}");
                        return Err(SchedulerError::DefaultCommand);
                    }
                }
            }
        };

        // Arguments are only attached to the action when non-empty
        let arguments = args.arguments.clone().filter(|value| !value.is_empty());

        Ok(TaskRequest {
            run_as_system: args.run_as_system,
            command,
            arguments,
        })
    }
}

/// Register the fixed-name task with create-or-update semantics. Any
/// previously registered task under the name is replaced.
#[cfg(target_os = "windows")]
pub fn register_task(request: &TaskRequest) -> Result<(), SchedulerError> {
    service::register(request)
}

#[cfg(not(target_os = "windows"))]
pub fn register_task(_request: &TaskRequest) -> Result<(), SchedulerError> {
    Err(SchedulerError::Unsupported)
}

/// Delete the fixed-name task. A task that does not exist counts as success.
#[cfg(target_os = "windows")]
pub fn delete_task() -> Result<(), SchedulerError> {
    service::delete()
}

#[cfg(not(target_os = "windows"))]
pub fn delete_task() -> Result<(), SchedulerError> {
    Err(SchedulerError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::{TaskRequest, TASK_NAME, TRIGGER_DELAY};
    use crate::args::InvocationArgs;

    #[test]
    fn test_constants() {
        assert_eq!(TASK_NAME, "netspi-native-exe-task");
        assert_eq!(TRIGGER_DELAY, "PT30S");
    }

    #[test]
    fn test_from_args_explicit_command() {
        let args = InvocationArgs {
            run_as_system: true,
            delete_requested: false,
            command: Some(String::from("C:\\Tools\\run.exe")),
            arguments: Some(String::from("-x 1")),
        };

        let result = TaskRequest::from_args(&args).unwrap();
        assert!(result.run_as_system);
        assert_eq!(result.command, "C:\\Tools\\run.exe");
        assert_eq!(result.arguments.unwrap(), "-x 1");
    }

    #[test]
    fn test_from_args_drops_empty_arguments() {
        let args = InvocationArgs {
            run_as_system: false,
            delete_requested: false,
            command: Some(String::from("C:\\Tools\\run.exe")),
            arguments: Some(String::new()),
        };

        let result = TaskRequest::from_args(&args).unwrap();
        assert_eq!(result.arguments, None);
    }

    #[test]
    fn test_from_args_default_command() {
        std::env::set_var("SystemRoot", "C:\\Windows");
        let args = InvocationArgs::default();

        let result = TaskRequest::from_args(&args).unwrap();
        assert!(result
            .command
            .to_lowercase()
            .ends_with("system32\\notepad.exe"));
    }

    #[test]
    #[cfg(target_os = "windows")]
    fn test_register_update_and_delete_task() {
        use super::{delete_task, register_task};

        let request = TaskRequest {
            run_as_system: false,
            command: String::from("C:\\Windows\\System32\\NOTEPAD.EXE"),
            arguments: None,
        };
        register_task(&request).unwrap();

        // Same name with a different action must update, not fail
        let update = TaskRequest {
            run_as_system: false,
            command: String::from("C:\\Windows\\System32\\cmd.exe"),
            arguments: Some(String::from("/c exit")),
        };
        register_task(&update).unwrap();

        delete_task().unwrap();
        // Nothing left under the fixed name, deleting again still succeeds
        delete_task().unwrap();
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_unsupported_platform() {
        use super::{delete_task, error::SchedulerError, register_task};

        let request = TaskRequest {
            run_as_system: false,
            command: String::from("C:\\Tools\\run.exe"),
            arguments: None,
        };
        assert_eq!(
            register_task(&request).unwrap_err(),
            SchedulerError::Unsupported
        );
        assert_eq!(delete_task().unwrap_err(), SchedulerError::Unsupported);
    }
}
