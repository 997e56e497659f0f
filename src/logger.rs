use core::fmt::{self, Debug};
use core::hint::black_box;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::{env_bool, DateFormat, DisplayConfig, Environment, InvocationMode};
use crate::engine::Engine;
use crate::level::{IntoLevel, Threshold};
use crate::sink::{default_console, ColorMode, Console, ConsoleSink, Sink, Target, TerminalSink};
use crate::stack::{BacktraceCapture, StackCapture};
use crate::{Level, Result};

/// A logger instance.
///
/// Log methods take `&self`; every configuration change takes `&mut self`.
/// Share one instance across threads behind a lock if it must be reconfigured
/// while in use.
///
/// Every method between the caller and the engine is `#[inline(never)]` and
/// passes its callee's result through [`black_box`], so no hop becomes a tail
/// call: the stack has to keep the shape [`InvocationMode`] documents in
/// optimized builds too.
pub struct Logger {
    engine: Arc<Engine>,
    environment: Environment,
    mode: InvocationMode,
    config: DisplayConfig,
    threshold: Threshold,
    bound: Option<[BoundDispatch; 6]>,
}

/// One cached per-level dispatch target. `config` is `None` when the level is
/// below the threshold the table was built for.
struct BoundDispatch {
    engine: Arc<Engine>,
    level: Level,
    config: Option<Arc<DisplayConfig>>,
}

impl BoundDispatch {
    #[inline(never)]
    fn invoke(&self, messages: &[&dyn Debug]) -> Result<()> {
        match &self.config {
            Some(config) => black_box(self.engine.emit(config, self.level, messages)),
            None => Ok(()),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        let environment = Environment::detect();
        Self::from_parts(
            environment,
            environment.default_invocation_mode(),
            environment.default_display(),
            Level::All,
            default_sink(environment, Target::Stdout, ColorMode::Auto, None),
            Arc::new(SystemClock),
            Arc::new(BacktraceCapture),
        )
    }
}

fn default_sink(
    environment: Environment,
    target: Target,
    color_mode: ColorMode,
    console: Option<Arc<dyn Console>>,
) -> Arc<dyn Sink> {
    match environment {
        Environment::Terminal => Arc::new(TerminalSink::new(target, color_mode)),
        Environment::Browser => Arc::new(ConsoleSink::new(console.unwrap_or_else(default_console))),
    }
}

impl Logger {
    /// Logger with the defaults of the detected environment, writing to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    /// Create a new `LoggerBuilder`
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    fn from_parts(
        environment: Environment,
        mode: InvocationMode,
        config: DisplayConfig,
        level: Level,
        sink: Arc<dyn Sink>,
        clock: Arc<dyn Clock>,
        stack: Arc<dyn StackCapture>,
    ) -> Self {
        let engine = Engine::new(sink, clock, stack, mode.trace_frame_index());
        let mut lg = Self {
            engine: Arc::new(engine),
            environment,
            mode,
            config,
            threshold: Threshold::new(level),
            bound: None,
        };
        lg.rebind();
        lg
    }

    // Rebuilds the per-level table from the current config and threshold.
    // Called from every `&mut self` path that changes either.
    fn rebind(&mut self) {
        if self.mode != InvocationMode::Bound {
            return;
        }
        let config = Arc::new(self.config.clone());
        let threshold = self.threshold.current();
        self.bound = Some(Level::LOGGABLE.map(|level| BoundDispatch {
            engine: Arc::clone(&self.engine),
            level,
            config: level.passes(threshold).then(|| Arc::clone(&config)),
        }));
    }

    #[inline(never)]
    fn dispatch(&self, level: Level, messages: &[&dyn Debug]) -> Result<()> {
        if let (Some(table), Some(slot)) = (&self.bound, level.slot()) {
            return black_box(table[slot].invoke(messages));
        }
        if !level.passes(self.threshold.current()) {
            return Ok(());
        }
        black_box(self.engine.emit(&self.config, level, messages))
    }

    // ===== logging =====
    /// Log at `level`. Below the threshold this writes nothing and returns `Ok`.
    /// # Errors
    /// [`Error::UnknownLevelStyle`](crate::Error::UnknownLevelStyle) when
    /// `level` is the `all` or `off` sentinel and passes the threshold.
    #[inline(never)]
    pub fn log(&self, level: Level, messages: &[&dyn Debug]) -> Result<()> {
        black_box(self.dispatch(level, messages))
    }
    /// Log at `trace`
    /// # Errors
    /// None in practice; see [`Logger::log`].
    #[inline(never)]
    pub fn trace(&self, messages: &[&dyn Debug]) -> Result<()> {
        black_box(self.dispatch(Level::Trace, messages))
    }
    /// Log at `debug`
    /// # Errors
    /// None in practice; see [`Logger::log`].
    #[inline(never)]
    pub fn debug(&self, messages: &[&dyn Debug]) -> Result<()> {
        black_box(self.dispatch(Level::Debug, messages))
    }
    /// Log at `info`
    /// # Errors
    /// None in practice; see [`Logger::log`].
    #[inline(never)]
    pub fn info(&self, messages: &[&dyn Debug]) -> Result<()> {
        black_box(self.dispatch(Level::Info, messages))
    }
    /// Log at `warn`
    /// # Errors
    /// None in practice; see [`Logger::log`].
    #[inline(never)]
    pub fn warn(&self, messages: &[&dyn Debug]) -> Result<()> {
        black_box(self.dispatch(Level::Warn, messages))
    }
    /// Log at `error`
    /// # Errors
    /// None in practice; see [`Logger::log`].
    #[inline(never)]
    pub fn error(&self, messages: &[&dyn Debug]) -> Result<()> {
        black_box(self.dispatch(Level::Error, messages))
    }
    /// Log at `fatal`
    /// # Errors
    /// None in practice; see [`Logger::log`].
    #[inline(never)]
    pub fn fatal(&self, messages: &[&dyn Debug]) -> Result<()> {
        black_box(self.dispatch(Level::Fatal, messages))
    }

    // ===== threshold =====
    /// Current threshold
    #[inline]
    #[must_use]
    pub const fn level(&self) -> Level {
        self.threshold.current()
    }
    /// Set the threshold from a [`Level`], a level name or a rank.
    /// # Errors
    /// [`Error::InvalidLevel`](crate::Error::InvalidLevel) for an unknown
    /// name or rank; the threshold is left unchanged.
    pub fn set_level(&mut self, level: impl IntoLevel) -> Result<()> {
        let l = level.into_level()?;
        self.threshold.set(l);
        self.rebind();
        Ok(())
    }
    /// Silence everything, remembering the current threshold.
    pub fn suspend(&mut self) {
        self.threshold.suspend();
        self.rebind();
    }
    /// Restore the threshold saved by [`Logger::suspend`]. Does nothing if
    /// the logger was never suspended.
    pub fn resume(&mut self) {
        self.threshold.resume();
        self.rebind();
    }
    /// Alias of [`Logger::suspend`]
    pub fn off(&mut self) {
        self.suspend();
    }
    /// Alias of [`Logger::resume`]
    pub fn on(&mut self) {
        self.resume();
    }

    // ===== display =====
    /// Current display configuration
    #[must_use]
    pub const fn display(&self) -> &DisplayConfig {
        &self.config
    }
    /// Whether the date addon is shown
    #[must_use]
    pub const fn show_date(&self) -> bool {
        self.config.show_date
    }
    /// Show or hide the date addon
    pub fn set_show_date(&mut self, on: bool) {
        self.config.show_date = on;
        self.rebind();
    }
    /// Whether the function name addon is shown
    #[must_use]
    pub const fn show_function_name(&self) -> bool {
        self.config.show_function_name
    }
    /// Show or hide the calling function's name
    pub fn set_show_function_name(&mut self, on: bool) {
        self.config.show_function_name = on;
        self.rebind();
    }
    /// Whether the level addon is shown
    #[must_use]
    pub const fn show_level(&self) -> bool {
        self.config.show_level
    }
    /// Show or hide the `[level]` addon
    pub fn set_show_level(&mut self, on: bool) {
        self.config.show_level = on;
        self.rebind();
    }
    /// Whether the file name is shown
    #[must_use]
    pub const fn show_file_name(&self) -> bool {
        self.config.show_file_name
    }
    /// Show or hide the file name; location needs the line number too
    pub fn set_show_file_name(&mut self, on: bool) {
        self.config.show_file_name = on;
        self.rebind();
    }
    /// Whether the line number is shown
    #[must_use]
    pub const fn show_line_number(&self) -> bool {
        self.config.show_line_number
    }
    /// Show or hide the line number; location needs the file name too
    pub fn set_show_line_number(&mut self, on: bool) {
        self.config.show_line_number = on;
        self.rebind();
    }
    /// Whether the column number is shown
    #[must_use]
    pub const fn show_column_number(&self) -> bool {
        self.config.show_column_number
    }
    /// Show or hide the column after the line number
    pub fn set_show_column_number(&mut self, on: bool) {
        self.config.show_column_number = on;
        self.rebind();
    }
    /// Date pattern in use
    #[must_use]
    pub fn date_format(&self) -> &str {
        self.config.date_format.pattern()
    }
    /// Replace the date pattern.
    /// # Errors
    /// [`Error::InvalidDateFormat`](crate::Error::InvalidDateFormat) when the
    /// pattern does not parse or cannot format a date; the old pattern stays
    /// in place.
    pub fn set_date_format(&mut self, pattern: &str) -> Result<()> {
        self.config.date_format = DateFormat::parse(pattern)?;
        self.rebind();
        Ok(())
    }

    /// Stack index of the call site, fixed at construction from the invocation mode.
    #[must_use]
    pub fn trace_frame_index(&self) -> usize {
        self.engine.trace_frame_index()
    }
    /// Invocation mode chosen at construction
    #[must_use]
    pub const fn invocation_mode(&self) -> InvocationMode {
        self.mode
    }
    /// Environment chosen at construction
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }
}

impl Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("environment", &self.environment)
            .field("mode", &self.mode)
            .field("level", &self.threshold.current())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for `Logger`
#[allow(clippy::struct_excessive_bools)]
pub struct LoggerBuilder {
    environment: Option<Environment>,
    mode: Option<InvocationMode>,
    level: Level,
    show_date: Option<bool>,
    show_function_name: Option<bool>,
    show_level: Option<bool>,
    show_file_name: Option<bool>,
    show_line_number: Option<bool>,
    show_column_number: Option<bool>,
    date_format: Option<String>,
    color_mode: ColorMode,
    target: Target,
    file_path: Option<PathBuf>,
    console: Option<Arc<dyn Console>>,
    clock: Option<Arc<dyn Clock>>,
    stack: Option<Arc<dyn StackCapture>>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            environment: None,
            mode: None,
            level: Level::All,
            show_date: None,
            show_function_name: None,
            show_level: None,
            show_file_name: None,
            show_line_number: None,
            show_column_number: None,
            date_format: None,
            color_mode: ColorMode::Auto,
            target: Target::Stdout,
            file_path: None,
            console: None,
            clock: None,
            stack: None,
        }
    }
}

impl LoggerBuilder {
    #[inline]
    #[must_use]
    /// Render for this environment instead of the detected one
    pub const fn environment(mut self, e: Environment) -> Self {
        self.environment = Some(e);
        self
    }
    #[inline]
    #[must_use]
    /// Override the environment's invocation mode
    pub const fn invocation_mode(mut self, m: InvocationMode) -> Self {
        self.mode = Some(m);
        self
    }
    #[inline]
    #[must_use]
    /// Set the initial threshold
    pub const fn level(mut self, l: Level) -> Self {
        self.level = l;
        self
    }
    #[inline]
    #[must_use]
    /// Show the date
    pub const fn show_date(mut self, on: bool) -> Self {
        self.show_date = Some(on);
        self
    }
    #[inline]
    #[must_use]
    /// Show the calling function's name
    pub const fn show_function_name(mut self, on: bool) -> Self {
        self.show_function_name = Some(on);
        self
    }
    #[inline]
    #[must_use]
    /// Show the level tag
    pub const fn show_level(mut self, on: bool) -> Self {
        self.show_level = Some(on);
        self
    }
    #[inline]
    #[must_use]
    /// Show the file name
    pub const fn show_file_name(mut self, on: bool) -> Self {
        self.show_file_name = Some(on);
        self
    }
    #[inline]
    #[must_use]
    /// Show the line number
    pub const fn show_line_number(mut self, on: bool) -> Self {
        self.show_line_number = Some(on);
        self
    }
    #[inline]
    #[must_use]
    /// Show the column number
    pub const fn show_column_number(mut self, on: bool) -> Self {
        self.show_column_number = Some(on);
        self
    }
    #[inline]
    #[must_use]
    /// Date pattern, `time` format-description syntax.
    ///
    /// Checked by [`LoggerBuilder::build`]: a pattern that does not parse, or
    /// cannot format a date, fails the build with
    /// [`Error::InvalidDateFormat`](crate::Error::InvalidDateFormat).
    pub fn date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = Some(pattern.into());
        self
    }
    #[inline]
    #[must_use]
    /// Set the color mode
    pub const fn color_mode(mut self, m: ColorMode) -> Self {
        self.color_mode = m;
        self
    }
    #[inline]
    #[must_use]
    /// Set the output target to stdout
    pub fn stdout(mut self) -> Self {
        self.target = Target::Stdout;
        self
    }
    #[inline]
    #[must_use]
    /// Set the output target to stderr
    pub fn stderr(mut self) -> Self {
        self.target = Target::Stderr;
        self
    }
    #[inline]
    #[must_use]
    /// Set the output target to a custom writer
    pub fn writer(mut self, w: Box<dyn Write + Send>) -> Self {
        self.target = Target::writer(w);
        self.file_path = None;
        self
    }
    #[inline]
    #[must_use]
    /// Append to a file
    pub fn file(mut self, p: impl Into<PathBuf>) -> Self {
        self.file_path = Some(p.into());
        self
    }
    #[inline]
    #[must_use]
    /// Browser console to hand items to
    pub fn console(mut self, c: Arc<dyn Console>) -> Self {
        self.console = Some(c);
        self
    }
    #[inline]
    #[must_use]
    /// Source of "now"
    pub fn clock(mut self, c: Arc<dyn Clock>) -> Self {
        self.clock = Some(c);
        self
    }
    #[inline]
    #[must_use]
    /// Stack capture used for function name and location
    pub fn stack_capture(mut self, s: Arc<dyn StackCapture>) -> Self {
        self.stack = Some(s);
        self
    }

    /// Apply `AYALOG_*` environment variables on top of what is set so far.
    ///
    /// `AYALOG_LEVEL`, `AYALOG_COLOR`, `AYALOG_SHOW_DATE`, `AYALOG_SHOW_LEVEL`,
    /// `AYALOG_SHOW_FUNCTION`, `AYALOG_SHOW_FILE`, `AYALOG_SHOW_LINE`,
    /// `AYALOG_SHOW_COLUMN`, `AYALOG_DATE_FORMAT`. Unparsable level or color
    /// values are ignored.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(s) = std::env::var("AYALOG_LEVEL") {
            if let Ok(l) = s.to_lowercase().parse() {
                self.level = l;
            }
        }
        if let Ok(s) = std::env::var("AYALOG_COLOR") {
            self.color_mode = s.parse().unwrap_or(self.color_mode);
        }
        let flags = [
            ("AYALOG_SHOW_DATE", &mut self.show_date),
            ("AYALOG_SHOW_LEVEL", &mut self.show_level),
            ("AYALOG_SHOW_FUNCTION", &mut self.show_function_name),
            ("AYALOG_SHOW_FILE", &mut self.show_file_name),
            ("AYALOG_SHOW_LINE", &mut self.show_line_number),
            ("AYALOG_SHOW_COLUMN", &mut self.show_column_number),
        ];
        for (name, slot) in flags {
            if let Some(on) = env_bool(name) {
                *slot = Some(on);
            }
        }
        if let Ok(s) = std::env::var("AYALOG_DATE_FORMAT") {
            self.date_format = Some(s);
        }
        self
    }

    /// Build the logger
    /// # Errors
    /// [`Error::InvalidDateFormat`](crate::Error::InvalidDateFormat) for a bad
    /// pattern, [`Error::Io`](crate::Error::Io) if the log file cannot be opened.
    pub fn build(self) -> Result<Logger> {
        let environment = self.environment.unwrap_or_else(Environment::detect);
        let mode = self
            .mode
            .unwrap_or_else(|| environment.default_invocation_mode());

        let mut config = environment.default_display();
        let overrides = [
            (self.show_date, &mut config.show_date),
            (self.show_function_name, &mut config.show_function_name),
            (self.show_level, &mut config.show_level),
            (self.show_file_name, &mut config.show_file_name),
            (self.show_line_number, &mut config.show_line_number),
            (self.show_column_number, &mut config.show_column_number),
        ];
        for (value, slot) in overrides {
            if let Some(on) = value {
                *slot = on;
            }
        }
        if let Some(p) = &self.date_format {
            config.date_format = DateFormat::parse(p)?;
        }

        let target = match self.file_path {
            Some(p) => {
                let f = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(p)?;
                Target::writer(Box::new(f))
            }
            None => self.target,
        };

        Ok(Logger::from_parts(
            environment,
            mode,
            config,
            self.level,
            default_sink(environment, target, self.color_mode, self.console),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.stack.unwrap_or_else(|| Arc::new(BacktraceCapture)),
        ))
    }

    /// Build the logger and leak it
    /// # Errors
    /// Same as [`LoggerBuilder::build`]
    pub fn build_static(self) -> Result<&'static Logger> {
        Ok(Box::leak(Box::new(self.build()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StackFrame;
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Mem(Arc<Mutex<Vec<u8>>>);
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
        fn take(&self) -> String {
            String::from_utf8(std::mem::take(&mut *self.0.lock().unwrap())).unwrap()
        }
    }

    struct NoStack;
    impl StackCapture for NoStack {
        fn capture(&self) -> Vec<StackFrame> {
            Vec::new()
        }
    }

    fn logger(mode: InvocationMode) -> (Logger, Mem) {
        let mem = Mem::default();
        let lg = Logger::builder()
            .environment(Environment::Terminal)
            .invocation_mode(mode)
            .writer(Box::new(mem.clone()))
            .color_mode(ColorMode::Never)
            .show_date(false)
            .show_function_name(false)
            .show_file_name(false)
            .stack_capture(Arc::new(NoStack))
            .build()
            .unwrap();
        (lg, mem)
    }

    const MODES: [InvocationMode; 2] = [InvocationMode::Direct, InvocationMode::Bound];

    #[test]
    fn emission_follows_threshold_in_both_modes() {
        for mode in MODES {
            for threshold in Level::ALL {
                let (mut lg, mem) = logger(mode);
                lg.set_level(threshold).unwrap();
                for l in Level::LOGGABLE {
                    lg.log(l, &[&"m"]).unwrap();
                    let out = mem.take();
                    assert_eq!(
                        !out.is_empty(),
                        l.passes(threshold),
                        "{mode:?}: {l} at threshold {threshold}: {out:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn bound_table_exists_only_in_bound_mode() {
        let (direct, _) = logger(InvocationMode::Direct);
        assert!(direct.bound.is_none());
        let (bound, _) = logger(InvocationMode::Bound);
        assert!(bound.bound.is_some());
        assert_eq!(bound.trace_frame_index(), direct.trace_frame_index() + 1);
    }

    #[test]
    fn toggles_apply_on_next_call() {
        for mode in MODES {
            let (mut lg, mem) = logger(mode);
            lg.info(&[&"a"]).unwrap();
            assert_eq!(mem.take(), "[info]: \"a\"\n");

            lg.set_show_level(false);
            lg.info(&[&"b"]).unwrap();
            assert_eq!(mem.take(), "\"b\"\n", "{mode:?}");

            lg.set_show_function_name(true);
            lg.info(&[&"c"]).unwrap();
            assert_eq!(mem.take(), "[]: \"c\"\n", "{mode:?}");
        }
    }

    #[test]
    fn threshold_change_reaches_bound_table() {
        let (mut lg, mem) = logger(InvocationMode::Bound);
        lg.set_level("error").unwrap();
        lg.warn(&[&"w"]).unwrap();
        assert!(mem.take().is_empty());
        lg.set_level(Level::Trace).unwrap();
        lg.warn(&[&"w"]).unwrap();
        assert_eq!(mem.take(), "[warn]: \"w\"\n");
    }

    #[test]
    fn suspend_silences_and_resume_restores() {
        for mode in MODES {
            let (mut lg, mem) = logger(mode);
            lg.set_level("info").unwrap();
            lg.suspend();
            assert_eq!(lg.level(), Level::Off);
            lg.fatal(&[&"f"]).unwrap();
            lg.info(&[&"i"]).unwrap();
            assert!(mem.take().is_empty(), "{mode:?}");
            lg.resume();
            assert_eq!(lg.level(), Level::Info);
            lg.info(&[&"i"]).unwrap();
            assert_eq!(mem.take(), "[info]: \"i\"\n");
        }
    }

    #[test]
    fn bad_level_leaves_threshold() {
        let (mut lg, _) = logger(InvocationMode::Direct);
        lg.set_level("warn").unwrap();
        assert!(lg.set_level("bogus").is_err());
        assert_eq!(lg.level(), Level::Warn);
    }

    #[test]
    fn bad_date_format_leaves_pattern() {
        let (mut lg, _) = logger(InvocationMode::Bound);
        let before = lg.date_format().to_owned();
        assert!(lg.set_date_format("[oops").is_err());
        assert_eq!(lg.date_format(), before);
        lg.set_date_format("[year]").unwrap();
        assert_eq!(lg.date_format(), "[year]");
    }
}
