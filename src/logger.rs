use log::{log, log_enabled, Level};

/// The `log` target used by [`DefaultLogger`].
pub const LOG_TARGET: &str = "flageval";

/// Event id of the per-evaluation trace logged at [`Level::Info`].
pub(crate) const EVAL_LOG_EVENT_ID: u16 = 5000;
/// Event id of the warning logged when a deprecated flag is evaluated.
pub(crate) const DEPRECATED_FLAG_EVENT_ID: u16 = 3001;
/// Event id of the warning logged when a prerequisite lookup fails open.
pub(crate) const PREREQUISITE_SKIPPED_EVENT_ID: u16 = 3002;

/// Logging capability handed to the [`crate::Evaluator`].
///
/// # Examples
///
/// ```rust
/// use flageval::Logger;
/// use log::Level;
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {
///     fn enabled(&self, level: Level) -> bool {
///         level <= Level::Warn
///     }
///
///     fn log(&self, level: Level, event_id: u16, message: &str) {
///         println!("{level} [{event_id}] {message}");
///     }
/// }
/// ```
pub trait Logger: Sync + Send {
    /// Returns `true` when messages of `level` are recorded. Expensive messages are only built
    /// when this returns `true`.
    fn enabled(&self, level: Level) -> bool;

    /// Records a message.
    fn log(&self, level: Level, event_id: u16, message: &str);
}

/// [`Logger`] that forwards to the `log` facade under the [`LOG_TARGET`] target, with the event
/// id attached as the `event_id` key-value.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn enabled(&self, level: Level) -> bool {
        log_enabled!(target: LOG_TARGET, level)
    }

    fn log(&self, level: Level, event_id: u16, message: &str) {
        log!(target: LOG_TARGET, level, event_id = event_id; "{message}");
    }
}
