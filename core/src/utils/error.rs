use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum UtilError {
    SystemDirectory,
}

impl std::error::Error for UtilError {}

impl fmt::Display for UtilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilError::SystemDirectory => write!(f, "Could not resolve the system directory"),
        }
    }
}
