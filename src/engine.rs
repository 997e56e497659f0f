use core::fmt::Debug;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::DisplayConfig;
use crate::sink::Sink;
use crate::stack::{short_path, StackCapture, StackFrame};
use crate::{Level, Result};

/// Decorates items and hands them to the sink.
///
/// `trace_frame_index` is fixed for the life of the engine: it is the
/// position of the original call site in a capture taken from [`Engine::addons`].
pub(crate) struct Engine {
    sink: Arc<dyn Sink>,
    clock: Arc<dyn Clock>,
    stack: Arc<dyn StackCapture>,
    trace_frame_index: usize,
}

impl Engine {
    pub(crate) fn new(
        sink: Arc<dyn Sink>,
        clock: Arc<dyn Clock>,
        stack: Arc<dyn StackCapture>,
        trace_frame_index: usize,
    ) -> Self {
        Self {
            sink,
            clock,
            stack,
            trace_frame_index,
        }
    }

    #[inline]
    pub(crate) const fn trace_frame_index(&self) -> usize {
        self.trace_frame_index
    }

    /// Decorate and write one item. The threshold has already been checked.
    #[inline(never)]
    pub(crate) fn emit(
        &self,
        config: &DisplayConfig,
        level: Level,
        messages: &[&dyn Debug],
    ) -> Result<()> {
        let addons = self.addons(config, level);
        let prefix = self.prefix(&addons);
        self.sink.write(level, &prefix, messages)
    }

    /// Prefix fragments in display order: date, level, function, location.
    #[inline(never)]
    pub(crate) fn addons(&self, config: &DisplayConfig, level: Level) -> Vec<String> {
        let mut addons = Vec::with_capacity(4);

        if config.show_date {
            addons.push(config.date_format.format(self.clock.now()));
        }
        if config.show_level {
            addons.push(format!("[{}]", level.name()));
        }
        if !config.needs_stack() {
            return addons;
        }

        let stack = self.stack.capture();
        let frame = stack.get(self.trace_frame_index).cloned().unwrap_or_default();

        if config.show_function_name {
            addons.push(format!(
                "[{}]",
                frame.function_name.as_deref().unwrap_or_default()
            ));
        }
        if config.shows_location() {
            addons.push(location(&frame, config.show_column_number));
        }
        addons
    }

    fn prefix(&self, addons: &[String]) -> String {
        if addons.is_empty() {
            return String::new();
        }
        let mut prefix = addons.join(" ");
        prefix.push_str(self.sink.separator());
        prefix
    }
}

/// `[.../dir/file:line]` or `[.../dir/file:line-column]`
fn location(frame: &StackFrame, with_column: bool) -> String {
    let path = frame
        .file_name
        .as_deref()
        .map(short_path)
        .unwrap_or_else(|| String::from(".../"));
    let line = number(frame.line_number);
    if with_column {
        format!("[{path}:{line}-{}]", number(frame.column_number))
    } else {
        format!("[{path}:{line}]")
    }
}

fn number(n: Option<u32>) -> String {
    n.map_or_else(|| String::from("?"), |n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::Environment;
    use crate::sink::{ColorMode, Target, TerminalSink};
    use std::sync::Mutex;
    use time::macros::datetime;

    struct Fixed(Vec<StackFrame>);
    impl StackCapture for Fixed {
        fn capture(&self) -> Vec<StackFrame> {
            self.0.clone()
        }
    }

    struct Counting(Mutex<usize>);
    impl StackCapture for Counting {
        fn capture(&self) -> Vec<StackFrame> {
            *self.0.lock().unwrap() += 1;
            Vec::new()
        }
    }

    fn engine_with(stack: Arc<dyn StackCapture>, index: usize) -> Engine {
        let sink = TerminalSink::new(Target::Stdout, ColorMode::Never);
        Engine::new(
            Arc::new(sink),
            Arc::new(FixedClock(datetime!(2024-01-02 03:04:05.678 UTC))),
            stack,
            index,
        )
    }

    fn frames_with_caller_at(index: usize, caller: StackFrame) -> Vec<StackFrame> {
        let mut frames = vec![StackFrame::new("noise", "/x/y/z.rs", 1, 1); index];
        frames.push(caller);
        frames
    }

    #[test]
    fn addons_keep_order() {
        let caller = StackFrame::new("doWork", "/a/b/c.ext", 42, 7);
        let e = engine_with(Arc::new(Fixed(frames_with_caller_at(4, caller))), 4);
        let mut cfg = Environment::Terminal.default_display();
        cfg.show_column_number = false;
        let addons = e.addons(&cfg, Level::Info);
        assert_eq!(
            addons,
            vec![
                "2024-01-02 03:04:05.678".to_owned(),
                "[info]".to_owned(),
                "[doWork]".to_owned(),
                "[.../b/c.ext:42]".to_owned(),
            ]
        );
        assert_eq!(
            e.prefix(&addons),
            "2024-01-02 03:04:05.678 [info] [doWork] [.../b/c.ext:42]: "
        );
    }

    #[test]
    fn column_appended_with_dash() {
        let caller = StackFrame::new("f", "/a/b/c.ext", 42, 7);
        let e = engine_with(Arc::new(Fixed(frames_with_caller_at(5, caller))), 5);
        let mut cfg = Environment::Terminal.default_display();
        cfg.show_date = false;
        cfg.show_level = false;
        cfg.show_function_name = false;
        cfg.show_column_number = true;
        assert_eq!(e.addons(&cfg, Level::Warn), vec!["[.../b/c.ext:42-7]"]);
    }

    #[test]
    fn file_without_line_has_no_location() {
        let caller = StackFrame::new("f", "/a/b/c.ext", 42, 7);
        let e = engine_with(Arc::new(Fixed(frames_with_caller_at(4, caller))), 4);
        let mut cfg = Environment::Terminal.default_display();
        cfg.show_date = false;
        cfg.show_line_number = false;
        cfg.show_column_number = true;
        assert_eq!(e.addons(&cfg, Level::Debug), vec!["[debug]", "[f]"]);
    }

    #[test]
    fn short_stack_renders_unknowns() {
        let e = engine_with(Arc::new(Fixed(Vec::new())), 4);
        let mut cfg = Environment::Terminal.default_display();
        cfg.show_date = false;
        cfg.show_level = false;
        cfg.show_column_number = true;
        assert_eq!(e.addons(&cfg, Level::Info), vec!["[]", "[.../:?-?]"]);
    }

    #[test]
    fn stack_is_captured_only_when_needed() {
        let counter = Arc::new(Counting(Mutex::new(0)));
        let e = engine_with(counter.clone(), 4);
        let browser = Environment::Browser.default_display();
        let _ = e.addons(&browser, Level::Info);
        assert_eq!(*counter.0.lock().unwrap(), 0);

        let terminal = Environment::Terminal.default_display();
        let _ = e.addons(&terminal, Level::Info);
        assert_eq!(*counter.0.lock().unwrap(), 1, "one capture per call");
    }

    #[test]
    fn no_addons_no_separator() {
        let e = engine_with(Arc::new(Fixed(Vec::new())), 4);
        assert_eq!(e.prefix(&[]), "");
    }
}
