pub(crate) mod environment;
pub mod error;
pub mod logging;
