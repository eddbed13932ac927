//! Flatten nested structures into single-level maps keyed by separator-joined paths,
//! and expand such maps back into nested ones.
//!
//! ```
//! use serde_json::json;
//!
//! let flat = bellows::flatten(&json!({"some": {"other": "element"}})).unwrap();
//! assert_eq!(serde_json::Value::Object(flat.clone()), json!({"some.other": "element"}));
//! assert_eq!(
//!     serde_json::Value::Object(bellows::expand(&flat)),
//!     json!({"some": {"other": "element"}})
//! );
//! ```

use serde_json::{Map, Value};

pub mod error;
pub mod ext;
pub mod flat_value;
pub mod strings;

pub use {
    error::{Error, Result},
    flat_value::{
        DEFAULT_SEPARATOR, FlatMap, Separator,
        expand::expand_into,
        flatten::flatten_into,
    },
};

/// Serializes `T` as a flat map with `.`-joined keys, and deserializes it back from one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Flattened<T>(pub T);

#[derive(Debug)]
pub struct FlattenedRef<'a, T>(&'a T);

impl<T> Flattened<T> {
    pub fn as_ref(&self) -> FlattenedRef<'_, T> {
        FlattenedRef(&self.0)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

mod serde;

pub fn flatten<T>(value: &T) -> Result<FlatMap>
where
    T: ::serde::Serialize + ?Sized,
{
    flatten_prefixed(value, "")
}

pub fn flatten_with_separator<T>(value: &T, separator: &str) -> Result<FlatMap>
where
    T: ::serde::Serialize + ?Sized,
{
    flatten_prefixed_with_separator(value, "", separator)
}

pub fn flatten_prefixed<T>(value: &T, prefix: &str) -> Result<FlatMap>
where
    T: ::serde::Serialize + ?Sized,
{
    flat_value::flatten::flattened(value, prefix, &Separator::default())
}

/// Every leaf of `value` keyed by its path, starting at `prefix` (empty for none).
///
/// Mappings whose keys are not strings contribute nothing. A scalar `value` yields
/// `{prefix: value}`, or nothing without a prefix.
pub fn flatten_prefixed_with_separator<T>(
    value: &T,
    prefix: &str,
    separator: &str,
) -> Result<FlatMap>
where
    T: ::serde::Serialize + ?Sized,
{
    Separator::try_from(separator)
        .and_then(|separator| flatten_prefixed_with(value, prefix, &separator))
}

/// [`flatten_prefixed_with_separator`] with a separator that is already validated.
pub fn flatten_prefixed_with<T>(
    value: &T,
    prefix: &str,
    separator: &Separator,
) -> Result<FlatMap>
where
    T: ::serde::Serialize + ?Sized,
{
    flat_value::flatten::flattened(value, prefix, separator)
}

pub fn expand(flat: &FlatMap) -> Map<String, Value> {
    expand_prefixed(flat, "")
}

pub fn expand_with_separator(flat: &FlatMap, separator: &str) -> Result<Map<String, Value>> {
    expand_prefixed_with_separator(flat, "", separator)
}

pub fn expand_prefixed(flat: &FlatMap, prefix: &str) -> Map<String, Value> {
    flat_value::expand::expanded(flat, prefix, &Separator::default())
}

/// Nested form of the keys of `flat` found under `prefix`; the prefix itself is stripped.
pub fn expand_prefixed_with_separator(
    flat: &FlatMap,
    prefix: &str,
    separator: &str,
) -> Result<Map<String, Value>> {
    Separator::try_from(separator).map(|separator| expand_prefixed_with(flat, prefix, &separator))
}

/// [`expand_prefixed_with_separator`] with a separator that is already validated.
pub fn expand_prefixed_with(
    flat: &FlatMap,
    prefix: &str,
    separator: &Separator,
) -> Map<String, Value> {
    flat_value::expand::expanded(flat, prefix, separator)
}
