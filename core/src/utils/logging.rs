use log::LevelFilter;
use simplelog::{Config, SimpleLogger};

/// Initialize terminal logging for the process. A second init attempt is
/// ignored, logging is never fatal.
pub fn init_logging(level: LevelFilter) {
    let _ = SimpleLogger::init(level, Config::default());
}

#[cfg(test)]
mod tests {
    use super::init_logging;
    use log::{warn, LevelFilter};

    #[test]
    fn test_init_logging() {
        init_logging(LevelFilter::Warn);
        // Re-initializing must not panic
        init_logging(LevelFilter::Warn);
        warn!("A simple fancy logger!");
    }
}
