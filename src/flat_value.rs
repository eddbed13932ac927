use {
    crate::error::{Error, Result},
    serde_json::{Map, Value},
    std::{borrow::Cow, fmt},
    tap::Pipe,
};

pub const DEFAULT_SEPARATOR: &str = ".";

/// Single-level map from separator-joined paths to leaf values.
pub type FlatMap = Map<String, Value>;

/// Non-empty string joining path segments of a flat key.
///
/// The same separator has to be used for a flatten/expand round trip. There is no
/// escaping: a separator occurring inside a key name is indistinguishable from a
/// path boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Separator(Cow<'static, str>);

impl Separator {
    pub fn new(separator: impl Into<Cow<'static, str>>) -> Result<Self> {
        match separator.into() {
            empty if empty.is_empty() => Err(Error::EmptySeparator),
            separator => separator.pipe(Self).pipe(Ok),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    /// Path every child key of `prefix` starts with: `prefix + separator`, or
    /// nothing at the root.
    pub(crate) fn base(&self, prefix: &str) -> String {
        match prefix.is_empty() {
            true => String::new(),
            false => format!("{prefix}{}", self.as_str()),
        }
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self(Cow::Borrowed(DEFAULT_SEPARATOR))
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Separator {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value.to_owned())
    }
}

pub mod expand;
pub mod flatten;
mod leaf;
mod map_key;
