#![allow(dead_code)]

use flageval::{Configuration, Logger, Rule, Value, LOG_TARGET};
use log::kv::Key;
use log::{Level, Log, Metadata, Record};
use rand::distr::{Alphanumeric, SampleString};
use std::cell::RefCell;
use std::sync::{Arc, Mutex};

pub fn rand_str(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}

pub fn always(identifier: &str, value: impl Into<Value>) -> Configuration {
    Configuration {
        identifier: identifier.to_owned(),
        on: true,
        rules: vec![Arc::new(Rule {
            expression: String::new(),
            value: Some(value.into()),
        })],
        ..Configuration::default()
    }
}

/// [`Logger`] that keeps every message in memory, one `LEVEL [event_id] message` line each.
#[derive(Clone, Default)]
pub struct RecordingLogger {
    logs: Arc<Mutex<String>>,
}

impl RecordingLogger {
    pub fn take(&self) -> String {
        match self.logs.lock() {
            Ok(mut logs) => std::mem::take(&mut *logs),
            Err(_) => String::new(),
        }
    }
}

impl Logger for RecordingLogger {
    fn enabled(&self, level: Level) -> bool {
        level <= Level::Info
    }

    fn log(&self, level: Level, event_id: u16, message: &str) {
        let level = match level {
            Level::Error => "ERROR",
            Level::Warn => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        if let Ok(mut logs) = self.logs.lock() {
            logs.push_str(format!("{level} [{event_id}] {message}\n").as_str());
        }
    }
}

/// `log` facade sink recording what the default logger emits on the current thread.
pub struct FacadeRecorder {}

impl FacadeRecorder {
    thread_local!(pub static LOGS: RefCell<String> = RefCell::new(String::default()));
}

impl Log for FacadeRecorder {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target() == LOG_TARGET
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let event_id = record
            .key_values()
            .get(Key::from("event_id"))
            .and_then(|v| v.to_i64())
            .unwrap_or(-1);
        Self::LOGS.with_borrow_mut(|l| {
            l.push_str(format!("{level} [{event_id}] {}\n", record.args()).as_str())
        });
    }

    fn flush(&self) {}
}

pub fn facade_init() {
    log::set_max_level(log::LevelFilter::Info);
    _ = log::set_logger(&FacadeRecorder {});
}
