use log::Level;

/// Logging sink handed to the backend when callbacks are registered.
pub trait BackendLog: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

/// Forwards backend log lines to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl LogFacade {
    pub const TARGET: &'static str = "capture_plugin::backend";
}

impl BackendLog for LogFacade {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: Self::TARGET, level, "{}", message);
    }
}

/// Map a numeric backend log level (1 = error … 5 = trace) to `log::Level`.
///
/// Out-of-range values are clamped.
pub fn level_from_code(code: u32) -> Level {
    match code {
        0 | 1 => Level::Error,
        2 => Level::Warn,
        3 => Level::Info,
        4 => Level::Debug,
        _ => Level::Trace,
    }
}
