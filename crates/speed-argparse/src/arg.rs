//! The argument record shared by every kind of argument.
//!
//! Kinds differ only in which capability records they carry: keyed kinds
//! have a [`KeyInfo`], value-bearing kinds have a [`ValueInfo`]. Code that
//! needs a capability asks for it through [`Arg::key_info`] or
//! [`Arg::value_info`] and handles its absence.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use regex::Regex;

use crate::cast::DynCaster;
use crate::flag_set;
use crate::parser::ArgParser;
use crate::style::highlight;
use crate::value::{ArgValue, Assertion};

flag_set! {
    /// Behaviour switches of an argument.
    pub struct ArgFlags: u16 {
        /// Single-character short keys may be combined, as in `-la`.
        GROUPING = 0b0000_0001,
        /// `key=value` is accepted.
        ASSIGNMENT_OPERATOR = 0b0000_0010,
        /// Matching the argument ends parsing and skips validation.
        TERMINAL = 0b0000_0100,
        MANDATORY = 0b0000_1000,
        /// Request process exit once the terminal action ran.
        PKILL_AFTER_TRIGGERING = 0b0001_0000,
    }
}

flag_set! {
    /// Problems found on an argument after parsing.
    pub struct ArgErrorFlags: u8 {
        MIN_OCCURRENCES_ERROR = 0b0001,
        MAX_OCCURRENCES_ERROR = 0b0010,
        MIN_VALUES_ERROR = 0b0100,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Key,
    KeyValue,
    Keyless,
    Help,
    Version,
}

impl ArgKind {
    pub fn is_keyed(self) -> bool {
        !matches!(self, Self::Keyless)
    }

    pub fn has_values(self) -> bool {
        matches!(self, Self::KeyValue | Self::Keyless | Self::Help)
    }

    fn default_flags(self) -> ArgFlags {
        match self {
            Self::Key => ArgFlags::GROUPING,
            Self::KeyValue => ArgFlags::ASSIGNMENT_OPERATOR,
            Self::Keyless => ArgFlags::MANDATORY,
            Self::Help | Self::Version => {
                ArgFlags::TERMINAL | ArgFlags::PKILL_AFTER_TRIGGERING | ArgFlags::ASSIGNMENT_OPERATOR
            }
        }
    }

    fn default_occurrences(self) -> (usize, usize) {
        match self {
            Self::Keyless => (1, 1),
            _ => (0, 1),
        }
    }

    fn default_values(self) -> (usize, usize) {
        match self {
            Self::Help => (0, 1),
            _ => (1, 1),
        }
    }
}

/// Keys of a keyed argument and the sub-parser it hands off to, if any.
pub struct KeyInfo {
    pub(crate) keys: Vec<String>,
    pub(crate) subparser: Option<Box<ArgParser>>,
}

impl KeyInfo {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn subparser(&self) -> Option<&ArgParser> {
        self.subparser.as_deref()
    }
}

/// Captured values and everything used to validate them.
pub struct ValueInfo {
    pub(crate) values: Vec<ArgValue>,
    /// Values taken by each occurrence, in order.
    pub(crate) per_occurrence: Vec<usize>,
    pub(crate) min_values: usize,
    pub(crate) max_values: usize,
    pub(crate) range_fixed: bool,
    pub(crate) casters: Vec<Box<dyn DynCaster>>,
    pub(crate) patterns: Vec<Regex>,
    pub(crate) assertions: Vec<Assertion>,
    pub(crate) values_names: Vec<String>,
}

impl ValueInfo {
    fn new((min_values, max_values): (usize, usize)) -> Self {
        Self {
            values: Vec::new(),
            per_occurrence: Vec::new(),
            min_values,
            max_values,
            range_fixed: false,
            casters: Vec::new(),
            patterns: Vec::new(),
            assertions: Vec::new(),
            values_names: Vec::new(),
        }
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    pub fn values_range(&self) -> (usize, usize) {
        (self.min_values, self.max_values)
    }

    pub fn values_names(&self) -> &[String] {
        &self.values_names
    }

    fn reset(&mut self) {
        self.values.clear();
        self.per_occurrence.clear();
        for caster in &mut self.casters {
            caster.reset();
        }
    }
}

/// Picks the entry for the `index`-th value, reusing the last one when the
/// list is shorter.
fn positional<T>(items: &[T], index: usize) -> Option<&T> {
    items.get(index).or_else(|| items.last())
}

pub struct Arg {
    pub(crate) kind: ArgKind,
    pub(crate) flags: ArgFlags,
    pub(crate) occurrences: usize,
    pub(crate) min_occurrences: usize,
    pub(crate) max_occurrences: usize,
    pub(crate) description: Option<String>,
    pub(crate) error_name: Option<String>,
    pub(crate) presence: Option<Rc<Cell<bool>>>,
    pub(crate) action: Option<Box<dyn FnMut()>>,
    pub(crate) errors: ArgErrorFlags,
    pub(crate) help_menus: Vec<String>,
    /// Lookup name of a keyless argument.
    pub(crate) name: Option<String>,
    pub(crate) key: Option<KeyInfo>,
    pub(crate) value: Option<ValueInfo>,
    /// Help menu printed by a help argument when no menu is named.
    pub(crate) help_trigger: Option<String>,
    pub(crate) version: Option<String>,
}

impl Arg {
    pub(crate) fn keyed(kind: ArgKind, keys: Vec<String>) -> Self {
        let mut arg = Self::with_kind(kind);
        arg.key = Some(KeyInfo {
            keys,
            subparser: None,
        });
        arg
    }

    pub(crate) fn keyless(name: String) -> Self {
        let mut arg = Self::with_kind(ArgKind::Keyless);
        arg.name = Some(name);
        arg
    }

    fn with_kind(kind: ArgKind) -> Self {
        let (min_occurrences, max_occurrences) = kind.default_occurrences();
        Self {
            kind,
            flags: kind.default_flags(),
            occurrences: 0,
            min_occurrences,
            max_occurrences,
            description: None,
            error_name: None,
            presence: None,
            action: None,
            errors: ArgErrorFlags::empty(),
            help_menus: vec![String::new()],
            name: None,
            key: None,
            value: kind.has_values().then(|| ValueInfo::new(kind.default_values())),
            help_trigger: None,
            version: None,
        }
    }

    pub fn kind(&self) -> ArgKind {
        self.kind
    }

    pub fn flags(&self) -> ArgFlags {
        self.flags
    }

    pub fn key_info(&self) -> Option<&KeyInfo> {
        self.key.as_ref()
    }

    pub fn value_info(&self) -> Option<&ValueInfo> {
        self.value.as_ref()
    }

    pub(crate) fn key_info_mut(&mut self) -> Option<&mut KeyInfo> {
        self.key.as_mut()
    }

    pub(crate) fn value_info_mut(&mut self) -> Option<&mut ValueInfo> {
        self.value.as_mut()
    }

    pub fn keys(&self) -> &[String] {
        self.key.as_ref().map(|k| k.keys.as_slice()).unwrap_or(&[])
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    pub fn occurrences_range(&self) -> (usize, usize) {
        (self.min_occurrences, self.max_occurrences)
    }

    pub fn errors(&self) -> ArgErrorFlags {
        self.errors
    }

    pub fn was_found(&self) -> bool {
        self.occurrences > 0
    }

    /// Name used in diagnostics: the configured error name, else the
    /// longest key, else the keyless name.
    pub fn display_name(&self) -> &str {
        if let Some(name) = &self.error_name {
            return name;
        }
        let longest = self
            .keys()
            .iter()
            .fold(None::<&String>, |best, key| match best {
                Some(b) if b.len() >= key.len() => Some(b),
                _ => Some(key),
            });
        longest
            .or(self.name.as_ref())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
            || self
                .value
                .as_ref()
                .is_some_and(|v| v.values.iter().any(ArgValue::has_errors))
    }

    pub(crate) fn in_menu(&self, menu: &str) -> bool {
        self.help_menus.iter().any(|m| m == menu)
    }

    pub(crate) fn subparser_mut(&mut self) -> Option<&mut ArgParser> {
        self.key.as_mut().and_then(|k| k.subparser.as_deref_mut())
    }

    /// Record a new occurrence. Returns `false` when the maximum was already
    /// reached; the occurrence is then flagged and not counted.
    pub(crate) fn begin_occurrence(&mut self) -> bool {
        if self.occurrences >= self.max_occurrences {
            self.errors.insert(ArgErrorFlags::MAX_OCCURRENCES_ERROR);
            return false;
        }
        self.occurrences += 1;
        if let Some(presence) = &self.presence {
            presence.set(true);
        }
        if let Some(info) = &mut self.value {
            info.per_occurrence.push(0);
            for caster in &mut info.casters {
                caster.request_addition();
            }
        }
        if let Some(action) = &mut self.action {
            action();
        }
        true
    }

    /// Whether the current occurrence can take another value.
    pub(crate) fn accepts_value(&self) -> bool {
        self.value.as_ref().is_some_and(|info| {
            info.per_occurrence
                .last()
                .is_some_and(|&taken| taken < info.max_values)
        })
    }

    pub(crate) fn max_values(&self) -> usize {
        self.value.as_ref().map_or(0, |info| info.max_values)
    }

    /// Capture `raw` into the current occurrence.
    pub(crate) fn push_value(&mut self, raw: &str) {
        let Some(info) = &mut self.value else {
            return;
        };
        let ValueInfo {
            values,
            per_occurrence,
            casters,
            patterns,
            assertions,
            ..
        } = info;
        let Some(taken) = per_occurrence.last_mut() else {
            return;
        };

        let index = *taken;
        let caster_index = if casters.len() > 1 {
            index.min(casters.len() - 1)
        } else {
            0
        };
        let caster = casters.get_mut(caster_index).map(|c| c.as_mut());
        values.push(ArgValue::check(
            raw,
            positional(assertions, index),
            positional(patterns, index),
            caster,
        ));
        *taken += 1;
    }

    pub(crate) fn update_error_flags(&mut self) {
        if self.occurrences < self.min_occurrences {
            self.errors.insert(ArgErrorFlags::MIN_OCCURRENCES_ERROR);
        }
        if let Some(info) = &self.value {
            if info.per_occurrence.iter().any(|&taken| taken < info.min_values) {
                self.errors.insert(ArgErrorFlags::MIN_VALUES_ERROR);
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.occurrences = 0;
        self.errors = ArgErrorFlags::empty();
        if let Some(presence) = &self.presence {
            presence.set(false);
        }
        if let Some(info) = &mut self.value {
            info.reset();
        }
        if let Some(subparser) = self.subparser_mut() {
            subparser.reset();
        }
    }

    /// Diagnostic lines for this argument, without trailing newlines.
    pub(crate) fn error_lines(&self, error_id: &str, colors: bool) -> Vec<String> {
        let name = self.display_name();
        let mut lines = Vec::new();
        let mut push = |message: String| {
            lines.push(format!("{error_id}: {}: {message}", highlight(name, colors)));
        };

        if self.errors.contains(ArgErrorFlags::MIN_OCCURRENCES_ERROR) {
            push(match self.min_occurrences {
                1 => "Argument is required".to_string(),
                n => format!("Argument must appear at least {n} times"),
            });
        }
        if self.errors.contains(ArgErrorFlags::MAX_OCCURRENCES_ERROR) {
            push(match self.max_occurrences {
                1 => "Argument may appear only once".to_string(),
                n => format!("Argument may appear at most {n} times"),
            });
        }
        if let Some(info) = &self.value {
            if self.errors.contains(ArgErrorFlags::MIN_VALUES_ERROR) {
                push(match info.min_values {
                    1 => "Expected a value".to_string(),
                    n => format!("Expected at least {n} values"),
                });
            }
            lines.extend(
                info.values
                    .iter()
                    .filter_map(|v| v.error_line(error_id, name, colors)),
            );
        }
        lines
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("kind", &self.kind)
            .field("name", &self.display_name())
            .field("flags", &self.flags)
            .field("occurrences", &self.occurrences)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
