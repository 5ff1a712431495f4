#![deny(missing_docs)]

//! # Overview
//!
//! `logging` defines the [`Logger`] sink the core consumes instead of
//! writing to stdout directly, so that CLI/console rendering stays an
//! external collaborator per the workspace's scope. [`NullLogger`] is a
//! silent implementation for tests; the `tracing` feature adds
//! [`TracingLogger`], which bridges the sink onto the `tracing` ecosystem.
//!
//! # Design
//!
//! The log levels mirror spec §6: `Details` (the most verbose,
//! per-file tracing), `Message` (routine progress), `Warning`
//! (recoverable configuration/rule problems), and `Error` (fatal run
//! failures). [`Logger::sub_header`]/[`Logger::sub_divider`] exist
//! separately from `log` because the source this crate's logging surface
//! mirrors renders section banners distinctly from plain log lines.

/// Severity of a logged message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Level {
    /// Fine-grained per-file tracing, only useful when debugging a run.
    Details,
    /// Routine progress information.
    Message,
    /// A recoverable problem (a dropped rule, a skipped folder).
    Warning,
    /// A fatal problem that aborts the run.
    Error,
}

/// A sink for the core's log output and structured section markers.
///
/// Implementations are expected to be cheap to call and side-effect only
/// (the core never branches on a sink's return value).
pub trait Logger {
    /// Records a single log line at the given severity.
    fn log(&self, level: Level, message: &str);

    /// Emits a named section header, used to group related log lines.
    fn sub_header(&self, title: &str) {
        self.log(Level::Message, title);
    }

    /// Emits a section-ending divider.
    fn sub_divider(&self) {}
}

/// A [`Logger`] that discards every message; useful in tests and for
/// callers that genuinely want a silent run.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

#[cfg(feature = "tracing")]
mod tracing_bridge {
    use super::{Level, Logger};

    /// A [`Logger`] that forwards every call onto the `tracing` ecosystem,
    /// so a caller who has installed a `tracing_subscriber` gets structured
    /// logging for free.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct TracingLogger;

    impl Logger for TracingLogger {
        fn log(&self, level: Level, message: &str) {
            match level {
                Level::Details => tracing::debug!("{message}"),
                Level::Message => tracing::info!("{message}"),
                Level::Warning => tracing::warn!("{message}"),
                Level::Error => tracing::error!("{message}"),
            }
        }

        fn sub_header(&self, title: &str) {
            tracing::info!("=== {title} ===");
        }

        fn sub_divider(&self) {
            tracing::info!("---");
        }
    }
}

#[cfg(feature = "tracing")]
pub use tracing_bridge::TracingLogger;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingLogger {
        lines: RefCell<Vec<(Level, String)>>,
    }

    impl Logger for RecordingLogger {
        fn log(&self, level: Level, message: &str) {
            self.lines.borrow_mut().push((level, message.to_owned()));
        }
    }

    #[test]
    fn null_logger_accepts_every_level() {
        let logger = NullLogger;
        logger.log(Level::Details, "x");
        logger.log(Level::Error, "y");
    }

    #[test]
    fn recording_logger_captures_messages() {
        let logger = RecordingLogger::default();
        logger.log(Level::Warning, "careful");
        assert_eq!(logger.lines.borrow().len(), 1);
        assert_eq!(logger.lines.borrow()[0].0, Level::Warning);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn tracing_logger_emits_through_an_installed_subscriber() {
        use tracing_subscriber::fmt::TestWriter;

        let subscriber = tracing_subscriber::fmt().with_writer(TestWriter::default()).finish();
        tracing::subscriber::with_default(subscriber, || {
            let logger = super::TracingLogger;
            logger.sub_header("run started");
            logger.log(Level::Message, "scanning /src");
            logger.sub_divider();
        });
    }
}
