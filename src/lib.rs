#![warn(missing_docs, unsafe_code)]
//! A leveled console logger.
//!
//! Every line is prefixed with the date, the level, the calling function and
//! its source location, then colored by severity. On the terminal the line
//! goes to stdout (or a custom writer); in the browser it goes to
//! `console.log` with a `%c` style.
//!
//! ```no_run
//! use ayalog::{info, warn, Logger};
//!
//! let logger = Logger::new();
//! info!(logger, "listening", 8080).unwrap();
//! warn!(logger, "disk almost full", [92, 95]).unwrap();
//! ```

mod clock;
mod config;
mod engine;
mod error;
mod level;
mod logger;
mod sink;
mod stack;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    DateFormat, DisplayConfig, Environment, InvocationMode, BOUND_TRACE_INDEX,
    DEFAULT_DATE_FORMAT, DIRECT_TRACE_INDEX,
};
pub use error::{Error, Result};
pub use level::{IntoLevel, Level};
pub use logger::{Logger, LoggerBuilder};
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use sink::WebConsole;
pub use sink::{
    browser_style, colorize, render_payload, terminal_style, ColorMode, Console, ParseColorModeError,
    PlainConsole,
};
pub use stack::{short_path, BacktraceCapture, StackCapture, StackFrame};

/// Log any number of `Debug` values at a level
#[macro_export]
macro_rules! __ayalog_log {
    ($lg:expr, $method:ident $(, $v:expr)*) => {
        $lg.$method(&[$(&$v as &dyn ::core::fmt::Debug),*])
    };
}
/// trace
#[macro_export]
macro_rules! trace { ($lg:expr $(, $v:expr)* $(,)?) => { $crate::__ayalog_log!($lg, trace $(, $v)*) } }
/// debug
#[macro_export]
macro_rules! debug { ($lg:expr $(, $v:expr)* $(,)?) => { $crate::__ayalog_log!($lg, debug $(, $v)*) } }
/// info
#[macro_export]
macro_rules! info  { ($lg:expr $(, $v:expr)* $(,)?) => { $crate::__ayalog_log!($lg, info  $(, $v)*) } }
/// warning
#[macro_export]
macro_rules! warn  { ($lg:expr $(, $v:expr)* $(,)?) => { $crate::__ayalog_log!($lg, warn  $(, $v)*) } }
/// error
#[macro_export]
macro_rules! error { ($lg:expr $(, $v:expr)* $(,)?) => { $crate::__ayalog_log!($lg, error $(, $v)*) } }
/// fatal
#[macro_export]
macro_rules! fatal { ($lg:expr $(, $v:expr)* $(,)?) => { $crate::__ayalog_log!($lg, fatal $(, $v)*) } }
