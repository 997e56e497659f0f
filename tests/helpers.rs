#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use ayalog::{ColorMode, Console, Environment, InvocationMode, Logger, LoggerBuilder};

// Serializes tests that touch process-wide state (env vars)
pub fn test_lock() -> &'static Mutex<()> {
    static L: OnceLock<Mutex<()>> = OnceLock::new();
    L.get_or_init(|| Mutex::new(()))
}

#[derive(Clone, Default)]
pub struct Mem(pub Arc<Mutex<Vec<u8>>>);
impl Write for Mem {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Mem {
    /// Everything written so far, clearing the buffer
    pub fn take(&self) -> String {
        String::from_utf8(std::mem::take(&mut *self.0.lock().unwrap())).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.take()
            .lines()
            .map(std::string::ToString::to_string)
            .collect()
    }
}

/// Terminal logger on an in-memory writer, no colors, no date.
pub fn terminal_builder(mode: InvocationMode, mem: &Mem) -> LoggerBuilder {
    Logger::builder()
        .environment(Environment::Terminal)
        .invocation_mode(mode)
        .writer(Box::new(mem.clone()))
        .color_mode(ColorMode::Never)
        .show_date(false)
}

pub fn terminal_logger(mode: InvocationMode) -> (Logger, Mem) {
    let mem = Mem::default();
    let lg = terminal_builder(mode, &mem).build().unwrap();
    (lg, mem)
}

pub const MODES: [InvocationMode; 2] = [InvocationMode::Direct, InvocationMode::Bound];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleCall {
    pub format: String,
    pub style: String,
    pub values: Vec<String>,
}

/// Browser console stand-in recording every call
#[derive(Default)]
pub struct RecordingConsole(Mutex<Vec<ConsoleCall>>);
impl Console for RecordingConsole {
    fn log(&self, format: &str, style: &str, values: &[String]) {
        self.0.lock().unwrap().push(ConsoleCall {
            format: format.to_owned(),
            style: style.to_owned(),
            values: values.to_vec(),
        });
    }
}
impl RecordingConsole {
    pub fn take(&self) -> Vec<ConsoleCall> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}
