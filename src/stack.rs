//! Call-stack capture.
//!
//! Frames come back innermost first, starting at the function that asked for
//! the capture. The capture machinery's own frames are never included.

use std::path::{Path, PathBuf};

/// One resolved stack frame. Every field is `None` when unavailable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name without module path or hash
    pub function_name: Option<String>,
    /// Source file
    pub file_name: Option<PathBuf>,
    /// 1-based line
    pub line_number: Option<u32>,
    /// 1-based column
    pub column_number: Option<u32>,
}

impl StackFrame {
    /// Frame with every field set.
    #[must_use]
    pub fn new(function: &str, file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            function_name: Some(function.to_owned()),
            file_name: Some(file.into()),
            line_number: Some(line),
            column_number: Some(column),
        }
    }
}

/// Captures the current call stack.
pub trait StackCapture: Send + Sync {
    /// Frames innermost first; index 0 is the caller of `capture`.
    fn capture(&self) -> Vec<StackFrame>;
}

/// Walks the real stack with the `backtrace` crate.
///
/// Function names need symbols, file/line/column need debug info. Without
/// them the affected fields are `None`.
#[derive(Copy, Clone, Debug, Default)]
pub struct BacktraceCapture;

impl StackCapture for BacktraceCapture {
    #[inline(never)]
    fn capture(&self) -> Vec<StackFrame> {
        let mut frames: Vec<(Option<String>, StackFrame)> = Vec::new();
        backtrace::trace(|frame| {
            let before = frames.len();
            backtrace::resolve_frame(frame, |symbol| {
                let path = symbol.name().map(|n| format!("{n:#}"));
                let f = StackFrame {
                    function_name: path.as_deref().map(short_function_name),
                    file_name: symbol.filename().map(Path::to_path_buf),
                    line_number: symbol.lineno(),
                    column_number: symbol.colno(),
                };
                frames.push((path, f));
            });
            if frames.len() == before {
                frames.push((None, StackFrame::default()));
            }
            true
        });

        let start = frames
            .iter()
            .position(|(path, _)| path.as_deref().is_some_and(is_capture_frame))
            .map_or(0, |i| i + 1);
        frames.into_iter().skip(start).map(|(_, f)| f).collect()
    }
}

fn is_capture_frame(path: &str) -> bool {
    path.contains("BacktraceCapture as ") && path.ends_with("StackCapture>::capture")
}

/// `my_crate::net::Client::connect::{{closure}}` -> `connect`
pub(crate) fn short_function_name(path: &str) -> String {
    path.rsplit("::")
        .find(|seg| !seg.is_empty() && !seg.starts_with('{'))
        .unwrap_or(path)
        .to_owned()
}

/// `/home/user/project/src/module.rs` -> `.../src/module.rs`
///
/// Always exactly one parent directory behind a literal `...`.
#[must_use]
pub fn short_path(file: &Path) -> String {
    let base = file
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let dir = file
        .parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!(".../{dir}/{base}")
}
