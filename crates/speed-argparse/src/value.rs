//! One captured token and the outcome of validating it.

use std::fmt;

use regex::Regex;

use crate::cast::DynCaster;
use crate::flag_set;
use crate::style::highlight;

flag_set! {
    /// Why an [`ArgValue`] was rejected.
    pub struct ValueErrorFlags: u8 {
        ASSERTION_ERROR = 0b0001,
        PATTERN_ERROR = 0b0010,
        CAST_ERROR = 0b0100,
        /// Set together with `CAST_ERROR` when the target is a filesystem path.
        INVALID_PATH_ERROR = 0b1000,
    }
}

const DEFAULT_ASSERTION_MESSAGE: &str = "Invalid value";
const PATTERN_MESSAGE: &str = "Invalid format";

/// A predicate every value must satisfy, with the message shown when it fails.
pub struct Assertion {
    message: String,
    check: Box<dyn Fn(&str) -> bool>,
}

impl Assertion {
    pub fn new(message: impl Into<String>, check: impl Fn(&str) -> bool + 'static) -> Self {
        let message = message.into();
        Self {
            message: if message.is_empty() {
                DEFAULT_ASSERTION_MESSAGE.to_string()
            } else {
                message
            },
            check: Box::new(check),
        }
    }

    pub fn holds(&self, raw: &str) -> bool {
        (self.check)(raw)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgValue {
    raw: String,
    message: String,
    errors: ValueErrorFlags,
}

impl ArgValue {
    /// Run the assertion, the pattern and the caster over `raw`, in that
    /// order, stopping at the first failure.
    pub fn check(
        raw: impl Into<String>,
        assertion: Option<&Assertion>,
        pattern: Option<&Regex>,
        caster: Option<&mut (dyn DynCaster + 'static)>,
    ) -> Self {
        let mut value = Self {
            raw: raw.into(),
            message: String::new(),
            errors: ValueErrorFlags::empty(),
        };

        if let Some(assertion) = assertion {
            if !assertion.holds(&value.raw) {
                value.fail(ValueErrorFlags::ASSERTION_ERROR, assertion.message());
                return value;
            }
        }

        if let Some(pattern) = pattern {
            if !pattern.is_match(&value.raw) {
                value.fail(ValueErrorFlags::PATTERN_ERROR, PATTERN_MESSAGE);
                return value;
            }
        }

        if let Some(caster) = caster {
            if let Err(err) = caster.try_cast(&value.raw) {
                let mut flags = ValueErrorFlags::CAST_ERROR;
                flags.set(ValueErrorFlags::INVALID_PATH_ERROR, err.is_path());
                value.fail(flags, &err.to_string());
            }
        }

        value
    }

    fn fail(&mut self, flags: ValueErrorFlags, message: &str) {
        self.errors = flags;
        self.message = message.to_string();
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> ValueErrorFlags {
        self.errors
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The diagnostic line for this value, without the trailing newline.
    pub(crate) fn error_line(&self, error_id: &str, name: &str, colors: bool) -> Option<String> {
        if !self.has_errors() {
            return None;
        }
        let line = if self.errors.contains(ValueErrorFlags::INVALID_PATH_ERROR) {
            format!(
                "{error_id}: {}: {}",
                highlight(&self.raw, colors),
                self.message
            )
        } else {
            format!(
                "{error_id}: {}: {} '{}'",
                highlight(name, colors),
                self.message,
                self.raw
            )
        };
        Some(line)
    }
}
