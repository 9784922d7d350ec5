pub mod args;
pub mod scheduler;
pub mod utils;
