use super::error::UtilError;
use log::error;
use std::collections::HashMap;
use std::env::vars_os;

/// Default editor binary appended to the system directory when no explicit
/// command is given
pub(crate) const DEFAULT_EDITOR: &str = "NOTEPAD.EXE";

/// Resolve the full default command path: system directory plus the default
/// editor binary
pub(crate) fn default_command() -> Result<String, UtilError> {
    let system_dir = system_directory()?;
    Ok(format!("{system_dir}\\{DEFAULT_EDITOR}"))
}

#[cfg(target_os = "windows")]
/// Get the system directory (System32) via the known folder API
pub(crate) fn system_directory() -> Result<String, UtilError> {
    use windows::Win32::System::Com::CoTaskMemFree;
    use windows::Win32::UI::Shell::{FOLDERID_System, SHGetKnownFolderPath, KF_FLAG_DEFAULT};

    let folder_result = unsafe { SHGetKnownFolderPath(&FOLDERID_System, KF_FLAG_DEFAULT, None) };
    match folder_result {
        Ok(path) => {
            let value = unsafe { path.to_string() };
            unsafe { CoTaskMemFree(Some(path.0 as _)) };
            match value {
                Ok(result) if !result.is_empty() => return Ok(result),
                _ => error!("[environment] Known folder query returned a bad system path"),
            }
        }
        Err(err) => error!("[environment] Unable to get system directory: {err:?}"),
    }
    system_directory_from_env()
}

#[cfg(not(target_os = "windows"))]
pub(crate) fn system_directory() -> Result<String, UtilError> {
    system_directory_from_env()
}

/// Superseded environment lookup, kept as the fallback when the known folder
/// query is unavailable
fn system_directory_from_env() -> Result<String, UtilError> {
    let system_root = get_env_value("SystemRoot");
    if system_root.is_empty() {
        error!("[environment] Empty SystemRoot value");
        return Err(UtilError::SystemDirectory);
    }
    Ok(format!("{system_root}\\System32"))
}

/// Get a specific environment variable value
pub(crate) fn get_env_value(value: &str) -> String {
    let envs = get_env();
    if let Some(env) = envs.get(value) {
        return env.to_string();
    }
    String::new()
}

/// Get all environment variables associated with the taskreg process
pub(crate) fn get_env() -> HashMap<String, String> {
    let envs = vars_os();
    let mut environment = HashMap::new();
    for (key, value) in envs {
        environment.insert(
            key.into_string().unwrap_or_default(),
            value.into_string().unwrap_or_default(),
        );
    }
    environment
}

#[cfg(test)]
mod tests {
    use super::{default_command, get_env_value, system_directory};

    #[test]
    fn test_get_env_value() {
        let result = get_env_value("PATH");
        assert!(!result.is_empty())
    }

    #[test]
    #[cfg(target_os = "windows")]
    fn test_system_directory() {
        let result = system_directory().unwrap();
        assert!(result.to_lowercase().ends_with("system32"))
    }

    #[test]
    fn test_default_command() {
        std::env::set_var("SystemRoot", "C:\\Windows");
        let result = default_command().unwrap();
        assert!(result.to_lowercase().ends_with("system32\\notepad.exe"))
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_system_directory_from_env() {
        std::env::set_var("SystemRoot", "C:\\Windows");
        let result = system_directory().unwrap();
        assert_eq!(result, "C:\\Windows\\System32")
    }
}
