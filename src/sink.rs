//! Output sinks: the terminal writer and the browser console.

use core::fmt::Debug;
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Error, Level, Result};

/// Color mode
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ColorMode {
    /// Color only when the target is a terminal
    #[default]
    Auto,
    /// Always
    Always,
    /// Never
    Never,
}

/// Returned when a color mode name is not `auto`, `always` or `never`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseColorModeError;

impl core::fmt::Display for ParseColorModeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("color mode must be one of auto, always, never")
    }
}

impl std::error::Error for ParseColorModeError {}

impl core::str::FromStr for ColorMode {
    type Err = ParseColorModeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("always") {
            Ok(Self::Always)
        } else if s.eq_ignore_ascii_case("never") {
            Ok(Self::Never)
        } else if s.is_empty() || s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            Err(ParseColorModeError)
        }
    }
}

#[cfg(feature = "color")]
pub(crate) mod color {
    pub const RST: &str = "\x1b[0m";
    pub const TRACE: &str = "\x1b[90m"; // grey
    pub const DEBUG: &str = "\x1b[34m"; // blue
    pub const INFO: &str = "\x1b[32m"; // green
    pub const WARN: &str = "\x1b[33m"; // yellow
    pub const ERROR: &str = "\x1b[31m"; // red
    pub const FATAL: &str = "\x1b[1;31m"; // bold red
}

/// ANSI style for a message level.
/// # Errors
/// [`Error::UnknownLevelStyle`] for the `all`/`off` sentinels.
#[cfg(feature = "color")]
pub fn terminal_style(l: Level) -> Result<&'static str> {
    use color::{DEBUG, ERROR, FATAL, INFO, TRACE, WARN};
    match l {
        Level::Trace => Ok(TRACE),
        Level::Debug => Ok(DEBUG),
        Level::Info => Ok(INFO),
        Level::Warn => Ok(WARN),
        Level::Error => Ok(ERROR),
        Level::Fatal => Ok(FATAL),
        Level::All | Level::Off => Err(Error::UnknownLevelStyle(l)),
    }
}

/// Without the `color` feature every message level maps to no style.
/// # Errors
/// [`Error::UnknownLevelStyle`] for the `all`/`off` sentinels.
#[cfg(not(feature = "color"))]
pub fn terminal_style(l: Level) -> Result<&'static str> {
    l.slot().map(|_| "").ok_or(Error::UnknownLevelStyle(l))
}

/// CSS style token for a message level.
/// # Errors
/// [`Error::UnknownLevelStyle`] for the `all`/`off` sentinels.
pub fn browser_style(l: Level) -> Result<&'static str> {
    match l {
        Level::Trace => Ok("color:grey"),
        Level::Debug => Ok("color:blue"),
        Level::Info => Ok("color:green"),
        Level::Warn => Ok("color:orange"),
        Level::Error => Ok("color:red"),
        Level::Fatal => Ok("color:red; font-weight:700"),
        Level::All | Level::Off => Err(Error::UnknownLevelStyle(l)),
    }
}

/// Wrap `text` in an ANSI style.
#[must_use]
pub fn colorize(text: &str, style: &str) -> String {
    #[cfg(feature = "color")]
    if !style.is_empty() {
        return format!("{style}{text}{}", color::RST);
    }
    text.to_owned()
}

/// Render payload values the way the terminal shows them: `{:?}`, joined by `", "`.
#[must_use]
pub fn render_payload(messages: &[&dyn Debug]) -> String {
    let mut out = String::new();
    for (i, m) in messages.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{m:?}");
    }
    out
}

/// Where a decorated item ends up.
pub trait Sink: Send + Sync {
    /// Appended to a non-empty addon list.
    fn separator(&self) -> &'static str;

    /// Write one item. `prefix` already carries the separator when non-empty.
    /// # Errors
    /// [`Error::UnknownLevelStyle`] if `level` has no style in this sink.
    fn write(&self, level: Level, prefix: &str, messages: &[&dyn Debug]) -> Result<()>;
}

// ===== Terminal =====
/// Output target
#[derive(Clone)]
pub enum Target {
    /// stdout
    Stdout,
    /// stderr
    Stderr,
    /// custom
    Writer(Arc<Mutex<Box<dyn Write + Send>>>),
}

impl Target {
    /// Wrap a custom writer.
    #[must_use]
    pub fn writer(w: Box<dyn Write + Send>) -> Self {
        Self::Writer(Arc::new(Mutex::new(w)))
    }
}

impl Debug for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Stdout => f.write_str("Stdout"),
            Self::Stderr => f.write_str("Stderr"),
            Self::Writer(_) => f.write_str("Writer"),
        }
    }
}

static EMIT_LOCK: Mutex<()> = Mutex::new(());

/// Colorized text lines on stdout, stderr or a custom writer.
#[derive(Debug)]
pub struct TerminalSink {
    target: Target,
    color_mode: ColorMode,
}

impl TerminalSink {
    /// New sink
    #[must_use]
    pub const fn new(target: Target, color_mode: ColorMode) -> Self {
        Self { target, color_mode }
    }

    fn use_color(&self) -> bool {
        if !cfg!(feature = "color") {
            return false;
        }
        match self.color_mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => match self.target {
                Target::Stdout => io::stdout().is_terminal(),
                Target::Stderr => io::stderr().is_terminal(),
                Target::Writer(_) => false, // unknown sink => assume no TTY
            },
        }
    }

    fn emit_raw_bytes(&self, bytes: &[u8]) {
        let _g = EMIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        match &self.target {
            Target::Stdout => {
                let _ = io::stdout().lock().write_all(bytes);
            }
            Target::Stderr => {
                let _ = io::stderr().lock().write_all(bytes);
            }
            Target::Writer(w) => {
                let mut w = w.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = w.write_all(bytes);
            }
        }
    }
}

impl Sink for TerminalSink {
    fn separator(&self) -> &'static str {
        ": "
    }

    fn write(&self, level: Level, prefix: &str, messages: &[&dyn Debug]) -> Result<()> {
        let style = terminal_style(level)?;
        let mut line = String::from(prefix);
        line.push_str(&render_payload(messages));
        let mut out = if self.use_color() {
            colorize(&line, style)
        } else {
            line
        };
        out.push('\n');
        self.emit_raw_bytes(out.as_bytes());
        Ok(())
    }
}

// ===== Browser console =====
/// The `console.log(format, style, ...values)` call of a browser.
pub trait Console: Send + Sync {
    /// `format` starts with `%c`, `style` applies to it, `values` follow as separate arguments.
    fn log(&self, format: &str, style: &str, values: &[String]);
}

/// Browser console through `wasm-bindgen`.
#[cfg(all(target_arch = "wasm32", feature = "web"))]
#[derive(Copy, Clone, Debug, Default)]
pub struct WebConsole;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod web {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console, js_name = log, variadic)]
        pub(super) fn console_log_styled(format: &str, style: &str, values: Box<[JsValue]>);
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl Console for WebConsole {
    fn log(&self, format: &str, style: &str, values: &[String]) {
        let values: Box<[wasm_bindgen::JsValue]> = values
            .iter()
            .map(|v| wasm_bindgen::JsValue::from_str(v))
            .collect();
        web::console_log_styled(format, style, values);
    }
}

/// Stand-in console for hosts without a browser: prints the format (minus the
/// `%c` directive) and the values to stdout, dropping the CSS.
#[derive(Copy, Clone, Debug, Default)]
pub struct PlainConsole;

impl Console for PlainConsole {
    fn log(&self, format: &str, _style: &str, values: &[String]) {
        let mut line = format.replacen("%c", "", 1);
        for v in values {
            line.push(' ');
            line.push_str(v);
        }
        line.push('\n');
        let _g = EMIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = io::stdout().lock().write_all(line.as_bytes());
    }
}

/// The console this build talks to by default.
#[must_use]
pub fn default_console() -> Arc<dyn Console> {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        Arc::new(WebConsole)
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    {
        Arc::new(PlainConsole)
    }
}

/// `%c`-styled prefix plus raw values handed to a [`Console`].
pub struct ConsoleSink {
    console: Arc<dyn Console>,
}

impl ConsoleSink {
    /// New sink
    #[must_use]
    pub fn new(console: Arc<dyn Console>) -> Self {
        Self { console }
    }
}

impl Debug for ConsoleSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn separator(&self) -> &'static str {
        ":"
    }

    fn write(&self, level: Level, prefix: &str, messages: &[&dyn Debug]) -> Result<()> {
        let style = browser_style(level)?;
        let format = format!("%c{prefix}");
        let values: Vec<String> = messages.iter().map(|m| format!("{m:?}")).collect();
        self.console.log(&format, style, &values);
        Ok(())
    }
}
