use core::fmt;
use core::str::FromStr;

use crate::Error;

// ===== Levels =====
/// Log levels, ordered by rank.
///
/// `All` and `Off` are threshold sentinels: `All` lets everything through,
/// `Off` suppresses everything.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(u8)]
pub enum Level {
    /// Allow all
    All = 0,
    /// Trace
    Trace = 10,
    /// Debug
    Debug = 20,
    /// Info
    Info = 30,
    /// Warn
    Warn = 40,
    /// Error
    Error = 50,
    /// Fatal
    Fatal = 60,
    /// Allow none
    Off = 100,
}

impl Level {
    /// Every level, lowest rank first.
    pub const ALL: [Self; 8] = [
        Self::All,
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
        Self::Off,
    ];

    /// The six levels a message can be logged at.
    pub const LOGGABLE: [Self; 6] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
    ];

    /// Resolve a level from its name or its numeric rank.
    ///
    /// # Errors
    /// [`Error::InvalidLevel`] if the name is unknown or the number is not
    /// one of the defined ranks.
    pub fn rank(level: impl IntoLevel) -> Result<Self, Error> {
        level.into_level()
    }

    /// Numeric rank
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Lowercase symbolic name, as used in the `[level]` addon.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Off => "off",
        }
    }

    /// Whether a message at `self` passes a `threshold`.
    #[inline]
    #[must_use]
    pub const fn passes(self, threshold: Self) -> bool {
        (self as u8) >= (threshold as u8)
    }

    /// Every level name in rank order, comma separated.
    #[must_use]
    pub fn names() -> String {
        Self::ALL.map(Self::name).join(", ")
    }

    /// Position in [`Level::LOGGABLE`], `None` for the sentinels.
    #[inline]
    pub(crate) const fn slot(self) -> Option<usize> {
        match self {
            Self::Trace => Some(0),
            Self::Debug => Some(1),
            Self::Info => Some(2),
            Self::Warn => Some(3),
            Self::Error => Some(4),
            Self::Fatal => Some(5),
            Self::All | Self::Off => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.name() == s)
            .ok_or_else(|| Error::invalid_level(s))
    }
}

impl TryFrom<u8> for Level {
    type Error = Error;
    fn try_from(x: u8) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_u8() == x)
            .ok_or_else(|| Error::invalid_level(x))
    }
}

/// Anything a level can be resolved from: a [`Level`], a name, or a rank.
pub trait IntoLevel {
    /// Resolve to a [`Level`].
    ///
    /// # Errors
    /// [`Error::InvalidLevel`] when the input names no level.
    fn into_level(self) -> Result<Level, Error>;
}

impl IntoLevel for Level {
    #[inline]
    fn into_level(self) -> Result<Level, Error> {
        Ok(self)
    }
}

impl IntoLevel for &str {
    fn into_level(self) -> Result<Level, Error> {
        self.parse()
    }
}

impl IntoLevel for &String {
    fn into_level(self) -> Result<Level, Error> {
        self.parse()
    }
}

impl IntoLevel for String {
    fn into_level(self) -> Result<Level, Error> {
        self.parse()
    }
}

impl IntoLevel for u8 {
    fn into_level(self) -> Result<Level, Error> {
        Level::try_from(self)
    }
}

impl IntoLevel for u32 {
    fn into_level(self) -> Result<Level, Error> {
        u8::try_from(self).map_or_else(|_| Err(Error::invalid_level(self)), Level::try_from)
    }
}

impl IntoLevel for i32 {
    fn into_level(self) -> Result<Level, Error> {
        u8::try_from(self).map_or_else(|_| Err(Error::invalid_level(self)), Level::try_from)
    }
}

/// Threshold state of one logger.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Threshold {
    current: Level,
    saved: Option<Level>,
}

impl Threshold {
    pub(crate) const fn new(current: Level) -> Self {
        Self {
            current,
            saved: None,
        }
    }

    #[inline]
    pub(crate) const fn current(&self) -> Level {
        self.current
    }

    pub(crate) fn set(&mut self, l: Level) {
        self.current = l;
    }

    pub(crate) fn suspend(&mut self) {
        self.saved = Some(self.current);
        self.current = Level::Off;
    }

    // no prior suspend: nothing to restore
    pub(crate) fn resume(&mut self) {
        if let Some(l) = self.saved {
            self.current = l;
        }
    }
}
