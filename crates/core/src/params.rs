//! Typed lookups over a host-supplied JSON options object.
//!
//! Missing or `null` keys fall back to the caller's default. A key that is
//! present but has the wrong type, or a value outside its accepted range,
//! is an error naming the key, so a typo in a host setting does not
//! silently become a default.

use std::ops::RangeInclusive;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ColorError;

/// Reads option values out of a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    value: &'a Value,
}

impl<'a> Params<'a> {
    /// Wraps `value`. Anything other than an object or `null` is rejected.
    pub fn new(value: &'a Value) -> Result<Self, ColorError> {
        match value {
            Value::Object(_) | Value::Null => Ok(Self { value }),
            other => Err(ColorError::Parse(format!(
                "options must be a JSON object, got {other}"
            ))),
        }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.value.get(name).filter(|v| !v.is_null())
    }

    fn wrong_type(name: &str, expected: &str, got: &Value) -> ColorError {
        ColorError::Parse(format!("option '{name}' must be {expected}, got {got}"))
    }

    pub fn f64(&self, name: &str, default: f64) -> Result<f64, ColorError> {
        match self.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_f64()
                .ok_or_else(|| Self::wrong_type(name, "a number", v)),
        }
    }

    /// Like [`Params::f64`] but also rejects values outside `range`.
    pub fn f64_in(
        &self,
        name: &str,
        default: f64,
        range: RangeInclusive<f64>,
    ) -> Result<f64, ColorError> {
        let v = self.f64(name, default)?;
        if range.contains(&v) {
            Ok(v)
        } else {
            Err(ColorError::range(name, v))
        }
    }

    pub fn usize(&self, name: &str, default: usize) -> Result<usize, ColorError> {
        match self.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| Self::wrong_type(name, "a non-negative integer", v)),
        }
    }

    pub fn usize_in(
        &self,
        name: &str,
        default: usize,
        range: RangeInclusive<usize>,
    ) -> Result<usize, ColorError> {
        let v = self.usize(name, default)?;
        if range.contains(&v) {
            Ok(v)
        } else {
            Err(ColorError::range(name, v))
        }
    }

    pub fn u64(&self, name: &str, default: u64) -> Result<u64, ColorError> {
        match self.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .ok_or_else(|| Self::wrong_type(name, "a non-negative integer", v)),
        }
    }

    pub fn bool(&self, name: &str, default: bool) -> Result<bool, ColorError> {
        match self.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_bool()
                .ok_or_else(|| Self::wrong_type(name, "a boolean", v)),
        }
    }

    pub fn str(&self, name: &str) -> Result<Option<&'a str>, ColorError> {
        match self.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| Self::wrong_type(name, "a string", v)),
        }
    }

    /// A string option parsed with `FromStr`, e.g. a blend mode name.
    pub fn parsed<T>(&self, name: &str, default: T) -> Result<T, ColorError>
    where
        T: FromStr<Err = ColorError>,
    {
        match self.str(name)? {
            None => Ok(default),
            Some(s) => s.parse(),
        }
    }
}
