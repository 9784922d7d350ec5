use super::error::SchedulerError;
use super::{TaskRequest, SYSTEM_ACCOUNT, TASK_AUTHOR, TASK_NAME, TRIGGER_DELAY, TRIGGER_ID};
use log::error;
use windows::core::{Interface, BSTR, VARIANT};
use windows::Win32::Foundation::VARIANT_TRUE;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoInitializeSecurity, CoUninitialize, CLSCTX_INPROC_SERVER,
    COINIT_MULTITHREADED, EOAC_NONE, RPC_C_AUTHN_LEVEL_PKT, RPC_C_IMP_LEVEL_IMPERSONATE,
};
use windows::Win32::System::TaskScheduler::{
    IExecAction, IRegistrationTrigger, ITaskDefinition, ITaskFolder, ITaskService, TaskScheduler,
    TASK_ACTION_EXEC, TASK_CREATE_OR_UPDATE, TASK_LOGON_INTERACTIVE_TOKEN, TASK_RUNLEVEL_HIGHEST,
    TASK_TRIGGER_REGISTRATION,
};

/// HRESULT_FROM_WIN32(ERROR_FILE_NOT_FOUND), returned by DeleteTask when no
/// task with the name exists
const HRESULT_NOT_FOUND: i32 = 0x80070002_u32 as i32;
/// CoInitializeSecurity only accepts one call per process
const RPC_E_TOO_LATE: i32 = 0x80010119_u32 as i32;

const ROOT_FOLDER: &str = "\\";

/// Keeps COM initialized for the duration of one scheduler operation.
/// CoUninitialize runs on every exit path once the guard drops.
struct ComSession;

impl ComSession {
    fn start() -> Result<Self, SchedulerError> {
        let status = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if status.is_err() {
            error!("[scheduler] CoInitializeEx failed: {status:?}");
            return Err(SchedulerError::Com(status.0));
        }

        let session = ComSession;
        let security_result = unsafe {
            CoInitializeSecurity(
                None,
                -1,
                None,
                None,
                RPC_C_AUTHN_LEVEL_PKT,
                RPC_C_IMP_LEVEL_IMPERSONATE,
                None,
                EOAC_NONE,
                None,
            )
        };
        if let Err(err) = security_result {
            // A second operation in the same process trips RPC_E_TOO_LATE,
            // the levels from the first call are still in effect
            if err.code().0 != RPC_E_TOO_LATE {
                error!("[scheduler] CoInitializeSecurity failed: {err:?}");
                return Err(SchedulerError::Security(err.code().0));
            }
        }
        Ok(session)
    }
}

impl Drop for ComSession {
    fn drop(&mut self) {
        unsafe { CoUninitialize() }
    }
}

/// Connected Task Scheduler session with the root task folder resolved.
/// Interfaces release before the COM session uninitializes.
struct TaskServiceClient {
    service: ITaskService,
    folder: ITaskFolder,
    _session: ComSession,
}

impl TaskServiceClient {
    /// Connect to the local Task Scheduler service with default credentials
    /// and resolve the root task folder. Failure at either step is fatal.
    fn connect() -> Result<TaskServiceClient, SchedulerError> {
        let session = ComSession::start()?;

        let service_result =
            unsafe { CoCreateInstance(&TaskScheduler, None, CLSCTX_INPROC_SERVER) };
        let service: ITaskService = match service_result {
            Ok(result) => result,
            Err(err) => {
                error!("[scheduler] Failed to create an instance of ITaskService: {err:?}");
                return Err(SchedulerError::Service(err.code().0));
            }
        };

        let connect_result = unsafe {
            service.Connect(
                &VARIANT::default(),
                &VARIANT::default(),
                &VARIANT::default(),
                &VARIANT::default(),
            )
        };
        if let Err(err) = connect_result {
            error!("[scheduler] ITaskService::Connect failed: {err:?}");
            return Err(SchedulerError::Connect(err.code().0));
        }

        let folder_result = unsafe { service.GetFolder(&BSTR::from(ROOT_FOLDER)) };
        let folder = match folder_result {
            Ok(result) => result,
            Err(err) => {
                error!("[scheduler] Cannot get root folder pointer: {err:?}");
                return Err(SchedulerError::RootFolder(err.code().0));
            }
        };

        Ok(TaskServiceClient {
            service,
            folder,
            _session: session,
        })
    }
}

/// Delete the fixed-name task. A missing task counts as success so the
/// operation stays idempotent.
pub(crate) fn delete() -> Result<(), SchedulerError> {
    let client = TaskServiceClient::connect()?;

    let delete_result = unsafe { client.folder.DeleteTask(&BSTR::from(TASK_NAME), 0) };
    if let Err(err) = delete_result {
        if err.code().0 == HRESULT_NOT_FOUND {
            return Ok(());
        }
        error!("[scheduler] Failed to delete task {TASK_NAME}: {err:?}");
        return Err(SchedulerError::Delete(err.code().0));
    }
    Ok(())
}

/// Build a task definition from the request and register it under the fixed
/// name with create-or-update semantics. No secret is stored, registration
/// uses the interactive logon token.
pub(crate) fn register(request: &TaskRequest) -> Result<(), SchedulerError> {
    let client = TaskServiceClient::connect()?;

    // Clear any previous task under the name. The outcome does not matter,
    // registration replaces an existing task anyway
    let _ = unsafe { client.folder.DeleteTask(&BSTR::from(TASK_NAME), 0) };

    let task_result = unsafe { client.service.NewTask(0) };
    let task = match task_result {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] Failed to create a task definition: {err:?}");
            return Err(SchedulerError::NewTask(err.code().0));
        }
    };

    build_definition(&task, request)?;

    let register_result = unsafe {
        client.folder.RegisterTaskDefinition(
            &BSTR::from(TASK_NAME),
            &task,
            TASK_CREATE_OR_UPDATE.0,
            &VARIANT::default(),
            &VARIANT::default(),
            TASK_LOGON_INTERACTIVE_TOKEN,
            &VARIANT::from(""),
        )
    };
    if let Err(err) = register_result {
        error!("[scheduler] Error saving task {TASK_NAME}: {err:?}");
        return Err(SchedulerError::Register(err.code().0));
    }
    Ok(())
}

/// Assemble registration info, principal, settings, the single registration
/// trigger and the single exec action. The first failing sub-step aborts.
fn build_definition(task: &ITaskDefinition, request: &TaskRequest) -> Result<(), SchedulerError> {
    let info_result = unsafe { task.RegistrationInfo() };
    let info = match info_result {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] Cannot get registration info pointer: {err:?}");
            return Err(SchedulerError::RegistrationInfo(err.code().0));
        }
    };
    if let Err(err) = unsafe { info.SetAuthor(&BSTR::from(TASK_AUTHOR)) } {
        error!("[scheduler] Cannot put task author: {err:?}");
        return Err(SchedulerError::RegistrationInfo(err.code().0));
    }

    // Without /s the task keeps the service's default principal
    if request.run_as_system {
        let principal_result = unsafe { task.Principal() };
        let principal = match principal_result {
            Ok(result) => result,
            Err(err) => {
                error!("[scheduler] Cannot get principal pointer: {err:?}");
                return Err(SchedulerError::Principal(err.code().0));
            }
        };
        if let Err(err) = unsafe { principal.SetId(&BSTR::from(SYSTEM_ACCOUNT)) } {
            error!("[scheduler] Cannot put principal id: {err:?}");
            return Err(SchedulerError::Principal(err.code().0));
        }
        if let Err(err) = unsafe { principal.SetLogonType(TASK_LOGON_INTERACTIVE_TOKEN) } {
            error!("[scheduler] Cannot put principal logon type: {err:?}");
            return Err(SchedulerError::Principal(err.code().0));
        }
        if let Err(err) = unsafe { principal.SetRunLevel(TASK_RUNLEVEL_HIGHEST) } {
            error!("[scheduler] Cannot put principal run level: {err:?}");
            return Err(SchedulerError::Principal(err.code().0));
        }
    }

    let settings_result = unsafe { task.Settings() };
    let settings = match settings_result {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] Cannot get settings pointer: {err:?}");
            return Err(SchedulerError::Settings(err.code().0));
        }
    };
    // Run as soon as possible if the host was off at the scheduled time
    if let Err(err) = unsafe { settings.SetStartWhenAvailable(VARIANT_TRUE) } {
        error!("[scheduler] Cannot put start when available setting: {err:?}");
        return Err(SchedulerError::Settings(err.code().0));
    }

    let triggers_result = unsafe { task.Triggers() };
    let triggers = match triggers_result {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] Cannot get trigger collection: {err:?}");
            return Err(SchedulerError::Trigger(err.code().0));
        }
    };
    let trigger_result = unsafe { triggers.Create(TASK_TRIGGER_REGISTRATION) };
    let trigger = match trigger_result {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] Cannot create a registration trigger: {err:?}");
            return Err(SchedulerError::Trigger(err.code().0));
        }
    };
    let registration_trigger: IRegistrationTrigger = match trigger.cast() {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] QueryInterface failed on IRegistrationTrigger: {err:?}");
            return Err(SchedulerError::Trigger(err.code().0));
        }
    };
    if let Err(err) = unsafe { registration_trigger.SetId(&BSTR::from(TRIGGER_ID)) } {
        error!("[scheduler] Cannot put trigger id: {err:?}");
        return Err(SchedulerError::Trigger(err.code().0));
    }
    if let Err(err) = unsafe { registration_trigger.SetDelay(&BSTR::from(TRIGGER_DELAY)) } {
        error!("[scheduler] Cannot put registration trigger delay: {err:?}");
        return Err(SchedulerError::Trigger(err.code().0));
    }

    let actions_result = unsafe { task.Actions() };
    let actions = match actions_result {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] Cannot get action collection: {err:?}");
            return Err(SchedulerError::Action(err.code().0));
        }
    };
    let action_result = unsafe { actions.Create(TASK_ACTION_EXEC) };
    let action = match action_result {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] Cannot create the action: {err:?}");
            return Err(SchedulerError::Action(err.code().0));
        }
    };
    let exec_action: IExecAction = match action.cast() {
        Ok(result) => result,
        Err(err) => {
            error!("[scheduler] QueryInterface failed on IExecAction: {err:?}");
            return Err(SchedulerError::Action(err.code().0));
        }
    };
    if let Err(err) = unsafe { exec_action.SetPath(&BSTR::from(request.command.as_str())) } {
        error!("[scheduler] Cannot put path for executable action: {err:?}");
        return Err(SchedulerError::Action(err.code().0));
    }
    if let Some(arguments) = &request.arguments {
        if let Err(err) = unsafe { exec_action.SetArguments(&BSTR::from(arguments.as_str())) } {
            error!("[scheduler] Cannot put arguments for executable action: {err:?}");
            return Err(SchedulerError::Action(err.code().0));
        }
    }

    Ok(())
}
