//! Logging facade with pluggable sinks.
//!
//! Components only ever use the `log` macros. The process installs one
//! [`FanoutLogger`]: an `env_logger` console sink plus any number of extra
//! sinks, such as a [`MemorySink`] that a UI surface drains to show messages
//! next to its widgets.

use std::{
    env,
    sync::{Arc, Mutex, OnceLock},
};

use log::{Level, LevelFilter, Log, Metadata, Record};

static LOGGER: OnceLock<()> = OnceLock::new();

/// Installs the process logger once. Later calls are no-ops, so extra sinks
/// must be supplied on the first call.
pub fn init(sinks: Vec<Box<dyn Log>>) {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("dti_explorer", LevelFilter::Info);
        }
        let console = builder.format_timestamp_millis().build();
        let max_level = console.filter();
        let logger = FanoutLogger { console, sinks };
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(max_level);
        }
    });
}

/// Console logger that forwards every accepted record to additional sinks.
pub struct FanoutLogger {
    console: env_logger::Logger,
    sinks: Vec<Box<dyn Log>>,
}

impl Log for FanoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.console.matches(record) {
            return;
        }
        self.console.log(record);
        for sink in &self.sinks {
            if sink.enabled(record.metadata()) {
                sink.log(record);
            }
        }
    }

    fn flush(&self) {
        self.console.flush();
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: Level,
    pub target: String,
    pub text: String,
}

/// Buffers formatted messages in memory. Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct MemorySink {
    level: LevelFilter,
    messages: Arc<Mutex<Vec<LogMessage>>>,
}

impl MemorySink {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Removes and returns everything buffered so far.
    pub fn drain(&self) -> Vec<LogMessage> {
        self.messages
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

impl Log for MemorySink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut guard) = self.messages.lock() {
            guard.push(LogMessage {
                level: record.level(),
                target: record.target().to_string(),
                text: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}
