//! Field validator that collects every violation instead of stopping at the first.
//!
//! Each `check_*` call returns a small handle whose checks chain by value:
//!
//! ```
//! use subscriptions::domain::validator::Validator;
//!
//! let mut v = Validator::new();
//! v.check_string("", "service_name").is_min(1).is_max(255);
//! v.check_number(-1, "price").is_min(0);
//! assert_eq!(v.errors().len(), 2);
//! assert_eq!(v.checked_fields(), 2);
//! ```

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Accumulated violation messages, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
    checked: usize,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_string<'v>(&'v mut self, value: &'v str, field: &'v str) -> StringCheck<'v> {
        self.checked += 1;
        StringCheck {
            validator: self,
            value,
            field,
        }
    }

    pub fn check_number<'v>(
        &'v mut self,
        value: impl Into<Number>,
        field: &'v str,
    ) -> NumberCheck<'v> {
        self.checked += 1;
        NumberCheck {
            validator: self,
            value: value.into(),
            field,
        }
    }

    /// Record a message that does not belong to a single field check.
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Number of `check_*` calls made so far.
    pub fn checked_fields(&self) -> usize {
        self.checked
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

pub struct StringCheck<'v> {
    validator: &'v mut Validator,
    value: &'v str,
    field: &'v str,
}

impl<'v> StringCheck<'v> {
    /// Fails when the value has fewer than `min` characters.
    pub fn is_min(self, min: usize) -> Self {
        let len = self.value.chars().count();
        if len < min {
            let msg = format!(
                "[{}] - Min required length is {}, Provided: {}",
                self.field, min, len
            );
            self.validator.add_error(msg);
        }
        self
    }

    /// Fails when the value has more than `max` characters.
    pub fn is_max(self, max: usize) -> Self {
        let len = self.value.chars().count();
        if len > max {
            let msg = format!(
                "[{}] - Max available length is {}, Provided: {}",
                self.field, max, len
            );
            self.validator.add_error(msg);
        }
        self
    }

    pub fn is_uuid(self) -> Self {
        if Uuid::parse_str(self.value).is_err() {
            let msg = format!("[{}] - Invalid uuid", self.field);
            self.validator.add_error(msg);
        }
        self
    }
}

/// A numeric value as seen by the validator.
///
/// Values that cannot be compared (NaN, unsigned values past `i64::MAX`) are kept
/// as `Unsupported` so the check reports them instead of passing them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
    Unsupported(&'static str),
}

impl Number {
    fn as_f64(self) -> Option<f64> {
        match self {
            Number::Int(v) => Some(v as f64),
            Number::Float(v) => Some(v),
            Number::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v}"),
            Number::Unsupported(ty) => f.write_str(ty),
        }
    }
}

macro_rules! number_from_lossless {
    ($($t:ty),*) => {$(
        impl From<$t> for Number {
            fn from(v: $t) -> Self {
                Number::Int(i64::from(v))
            }
        }
    )*};
}

number_from_lossless!(i8, i16, i32, i64, u8, u16, u32);

impl From<isize> for Number {
    fn from(v: isize) -> Self {
        i64::try_from(v).map_or(Number::Unsupported("isize"), Number::Int)
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Number::Unsupported("u64"), Number::Int)
    }
}

impl From<usize> for Number {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(Number::Unsupported("usize"), Number::Int)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::from(f64::from(v))
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Number::Unsupported("NaN")
        } else {
            Number::Float(v)
        }
    }
}

pub struct NumberCheck<'v> {
    validator: &'v mut Validator,
    value: Number,
    field: &'v str,
}

impl<'v> NumberCheck<'v> {
    pub fn is_min(self, min: impl Into<Number>) -> Self {
        self.compare(min.into(), |value, bound| value < bound, "Min required")
    }

    pub fn is_max(self, max: impl Into<Number>) -> Self {
        self.compare(max.into(), |value, bound| value > bound, "Max available")
    }

    fn compare(self, bound: Number, fails: fn(f64, f64) -> bool, label: &str) -> Self {
        let (Some(value), Some(limit)) = (self.value.as_f64(), bound.as_f64()) else {
            let msg = format!("[{}] - Unsupported type: {}", self.field, self.value);
            self.validator.add_error(msg);
            return self;
        };
        if fails(value, limit) {
            let msg = format!(
                "[{}] - {}: {}, Provided: {}",
                self.field, label, bound, self.value
            );
            self.validator.add_error(msg);
        }
        self
    }
}
