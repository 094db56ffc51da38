//! Timing helpers for logging.

use std::borrow::Cow;
use std::time::Instant;

/// RAII timer that logs elapsed time on drop.
///
/// # Example
/// ```ignore
/// let _t = Timed::debug("Geometry rebuild");
/// // ... do work ...
/// // logs "Geometry rebuild: 1.234ms" when _t is dropped
/// ```
pub struct Timed {
    name: Cow<'static, str>,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Timer that logs at DEBUG level.
    pub fn debug(name: impl Into<Cow<'static, str>>) -> Self {
        Self::start(name.into(), log::Level::Debug)
    }

    /// Timer that logs at TRACE level. Used on the per-frame simulation path.
    pub fn trace(name: impl Into<Cow<'static, str>>) -> Self {
        Self::start(name.into(), log::Level::Trace)
    }

    fn start(name: Cow<'static, str>, level: log::Level) -> Self {
        Self {
            name,
            start: Instant::now(),
            level,
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}
