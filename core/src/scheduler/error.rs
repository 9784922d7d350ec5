use std::fmt;

/// Failures from the Task Scheduler client. Each variant names the step that
/// failed and carries the host HRESULT where one exists.
#[derive(Debug, PartialEq, Eq)]
pub enum SchedulerError {
    Com(i32),
    Security(i32),
    Service(i32),
    Connect(i32),
    RootFolder(i32),
    Delete(i32),
    NewTask(i32),
    RegistrationInfo(i32),
    Principal(i32),
    Settings(i32),
    Trigger(i32),
    Action(i32),
    Register(i32),
    DefaultCommand,
    Unsupported,
}

impl std::error::Error for SchedulerError {}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::Com(code) => write!(f, "Failed to initialize COM: {code:#x}"),
            SchedulerError::Security(code) => {
                write!(f, "Failed to set COM security levels: {code:#x}")
            }
            SchedulerError::Service(code) => {
                write!(f, "Failed to create an instance of the Task Scheduler service: {code:#x}")
            }
            SchedulerError::Connect(code) => {
                write!(f, "Failed to connect to the Task Scheduler service: {code:#x}")
            }
            SchedulerError::RootFolder(code) => {
                write!(f, "Cannot get root task folder: {code:#x}")
            }
            SchedulerError::Delete(code) => write!(f, "Failed to delete task: {code:#x}"),
            SchedulerError::NewTask(code) => {
                write!(f, "Failed to create a task definition: {code:#x}")
            }
            SchedulerError::RegistrationInfo(code) => {
                write!(f, "Cannot put task registration info: {code:#x}")
            }
            SchedulerError::Principal(code) => write!(f, "Cannot put task principal: {code:#x}"),
            SchedulerError::Settings(code) => write!(f, "Cannot put task settings: {code:#x}"),
            SchedulerError::Trigger(code) => {
                write!(f, "Cannot create registration trigger: {code:#x}")
            }
            SchedulerError::Action(code) => {
                write!(f, "Cannot create executable action: {code:#x}")
            }
            SchedulerError::Register(code) => write!(f, "Error saving the task: {code:#x}"),
            SchedulerError::DefaultCommand => {
                write!(f, "Unable to resolve the default command path")
            }
            SchedulerError::Unsupported => {
                write!(f, "Task Scheduler operations are only supported on Windows")
            }
        }
    }
}
