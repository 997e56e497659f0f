use core::fmt;

use time::format_description::OwnedFormatItem;
use time::OffsetDateTime;

use crate::{Error, Result};

/// Date pattern used when none is given, in `time` format-description syntax.
pub const DEFAULT_DATE_FORMAT: &str =
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]";

// ===== Environment =====
/// Runtime environment the logger renders for
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Environment {
    /// Web browser console (wasm32 on the web)
    Browser,
    /// Terminal / process stdout
    Terminal,
}

impl Environment {
    /// Detect the environment this binary was compiled for.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(all(
            target_arch = "wasm32",
            not(any(target_os = "emscripten", target_os = "wasi"))
        )) {
            Self::Browser
        } else {
            Self::Terminal
        }
    }

    /// Invocation mode this environment uses unless told otherwise.
    #[must_use]
    pub const fn default_invocation_mode(self) -> InvocationMode {
        match self {
            Self::Browser => InvocationMode::Bound,
            Self::Terminal => InvocationMode::Direct,
        }
    }

    /// Display defaults: the browser console already shows the source link, the
    /// terminal does not.
    #[must_use]
    pub fn default_display(self) -> DisplayConfig {
        let terminal = matches!(self, Self::Terminal);
        DisplayConfig {
            show_date: true,
            show_function_name: terminal,
            show_level: true,
            show_file_name: terminal,
            show_line_number: terminal,
            show_column_number: false,
            date_format: DateFormat::default(),
        }
    }
}

// ===== Invocation mode =====
/// How the per-level methods reach the engine.
///
/// The call chain between the logging call site and the stack capture has a
/// fixed shape per mode:
///
/// ```text
/// Direct: caller -> Logger::info -> Logger::dispatch -> Engine::emit -> Engine::addons
/// Bound:  caller -> Logger::info -> Logger::dispatch -> BoundDispatch::invoke
///                -> Engine::emit -> Engine::addons
/// ```
///
/// Frame 0 of a capture is `Engine::addons`, so the caller sits at
/// [`DIRECT_TRACE_INDEX`] in direct mode and one frame deeper in bound mode.
///
/// Each hop keeps its frame in optimized builds as well. The caller's own
/// frame is the caller's business: a log call returned as the tail expression
/// of an optimized function may be reported at that function's caller.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum InvocationMode {
    /// Every call reads the live configuration.
    Direct,
    /// Calls go through a per-level dispatch table rebuilt on each configuration change.
    Bound,
}

/// Caller's frame index when calls reach the engine directly.
pub const DIRECT_TRACE_INDEX: usize = 4;
/// Caller's frame index when calls pass through a bound dispatch entry.
pub const BOUND_TRACE_INDEX: usize = DIRECT_TRACE_INDEX + 1;

impl InvocationMode {
    /// Stack index of the original call site for this mode.
    #[must_use]
    pub const fn trace_frame_index(self) -> usize {
        match self {
            Self::Direct => DIRECT_TRACE_INDEX,
            Self::Bound => BOUND_TRACE_INDEX,
        }
    }
}

// ===== Date format =====
/// A validated date pattern.
#[derive(Clone)]
pub struct DateFormat {
    pattern: String,
    items: OwnedFormatItem,
}

impl DateFormat {
    /// Parse a `time` format description such as `[hour]:[minute]`.
    ///
    /// The pattern is also rendered once against the Unix epoch, so a
    /// description that cannot format an [`OffsetDateTime`] is rejected here
    /// instead of producing an empty date on every line.
    /// # Errors
    /// [`Error::InvalidDateFormat`] if the pattern is not a valid description
    /// or cannot format a date.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidDateFormat {
            pattern: pattern.to_owned(),
            reason,
        };
        let items = time::format_description::parse_owned::<1>(pattern)
            .map_err(|e| invalid(e.to_string()))?;
        OffsetDateTime::UNIX_EPOCH
            .format(&items)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_owned(),
            items,
        })
    }

    /// The pattern text
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render `at`. A pattern accepted by [`DateFormat::parse`] always formats;
    /// should formatting still fail, the date renders as an empty string.
    #[must_use]
    pub fn format(&self, at: OffsetDateTime) -> String {
        at.format(&self.items).unwrap_or_default()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_FORMAT.to_owned(),
            items: time::format_description::parse_owned::<1>(DEFAULT_DATE_FORMAT)
                .unwrap_or_else(|_| OwnedFormatItem::Compound(Box::default())),
        }
    }
}

impl fmt::Debug for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DateFormat").field(&self.pattern).finish()
    }
}

impl PartialEq for DateFormat {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

// ===== Display config =====
/// Which addons prefix every line.
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DisplayConfig {
    /// `<date>`
    pub show_date: bool,
    /// `[function]`
    pub show_function_name: bool,
    /// `[level]`
    pub show_level: bool,
    /// file part of `[.../dir/file:line]`
    pub show_file_name: bool,
    /// line part of `[.../dir/file:line]`
    pub show_line_number: bool,
    /// `-column` suffix of the location
    pub show_column_number: bool,
    /// Pattern for the date addon
    pub date_format: DateFormat,
}

impl DisplayConfig {
    /// Location is emitted only when both file and line are on.
    #[inline]
    #[must_use]
    pub const fn shows_location(&self) -> bool {
        self.show_file_name && self.show_line_number
    }

    /// Whether rendering needs a stack capture at all.
    #[inline]
    #[must_use]
    pub const fn needs_stack(&self) -> bool {
        self.show_function_name || self.shows_location()
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Environment::detect().default_display()
    }
}

/// `1`/`true` (any case) enable, anything else disables.
pub(crate) fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
}
