//! Fluent configuration of a freshly declared argument.
//!
//! Every `add_*` method of [`ArgParser`] returns an [`ArgBuilder`] tagged
//! with the kind of argument it configures. Setters that only make sense for
//! some kinds live in impl blocks bounded by [`Keyed`] or [`Valued`], so
//! asking a plain flag for value names does not compile.

use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::Rc;

use regex::Regex;

use crate::arg::{Arg, ArgFlags, ArgKind, ValueInfo};
use crate::cast::{Castable, TypeCaster};
use crate::error::{ConfigError, ConfigResult};
use crate::parser::ArgParser;
use crate::value::Assertion;

mod sealed {
    pub trait Sealed {}
}

/// Marker for the kind of argument an [`ArgBuilder`] configures.
pub trait ArgKindMarker: sealed::Sealed {
    const KIND: ArgKind;
}

/// Kinds matched through keys such as `-a` or `--all`.
pub trait Keyed: ArgKindMarker {}

/// Kinds that capture values.
pub trait Valued: ArgKindMarker {}

/// Kinds whose match prints something and may end the process.
pub trait Triggering: ArgKindMarker {}

macro_rules! kind_markers {
    ($($(#[$meta:meta])* $name:ident => $kind:ident: $($cap:ident),*;)*) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl sealed::Sealed for $name {}

        impl ArgKindMarker for $name {
            const KIND: ArgKind = ArgKind::$kind;
        }

        $(impl $cap for $name {})*
    )*};
}

kind_markers! {
    /// A key that takes no values, e.g. `--verbose`.
    KeyArg => Key: Keyed;
    /// A key followed by values, e.g. `--seconds 10`.
    KeyValueArg => KeyValue: Keyed, Valued;
    /// Values identified by position.
    KeylessArg => Keyless: Valued;
    HelpArg => Help: Keyed, Triggering;
    VersionArg => Version: Keyed, Triggering;
}

fn check_range(min: usize, max: usize) -> ConfigResult<()> {
    if max == 0 || min > max {
        return Err(ConfigError::InvalidRange { min, max });
    }
    Ok(())
}

/// Handle on one argument of a parser.
pub struct ArgBuilder<'p, K> {
    parser: &'p mut ArgParser,
    id: usize,
    _kind: PhantomData<K>,
}

impl<'p, K: ArgKindMarker> ArgBuilder<'p, K> {
    pub(crate) fn new(parser: &'p mut ArgParser, id: usize) -> Self {
        debug_assert_eq!(parser.args[id].kind(), K::KIND);
        Self {
            parser,
            id,
            _kind: PhantomData,
        }
    }

    fn arg(&mut self) -> &mut Arg {
        &mut self.parser.args[self.id]
    }

    fn values(&mut self) -> &mut ValueInfo {
        self.parser.args[self.id]
            .value_info_mut()
            .unwrap_or_else(|| unreachable!("kind {:?} carries values", K::KIND))
    }

    /// Text shown in help menus. Arguments without one are hidden.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.arg().description = Some(text.into());
        self
    }

    /// Name used in error messages instead of the longest key.
    pub fn error_name(mut self, name: impl Into<String>) -> Self {
        self.arg().error_name = Some(name.into());
        self
    }

    /// Called once for every recognized occurrence.
    pub fn action(mut self, action: impl FnMut() + 'static) -> Self {
        self.arg().action = Some(Box::new(action));
        self
    }

    /// Set to `true` whenever the argument is found, reset on every parse.
    pub fn store_presence(mut self, flag: Rc<Cell<bool>>) -> Self {
        flag.set(false);
        self.arg().presence = Some(flag);
        self
    }

    /// Help menus listing this argument. Defaults to the main menu only.
    pub fn help_menus<I, S>(mut self, menus: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let menus: Vec<String> = menus.into_iter().map(Into::into).collect();
        if let Some(unknown) = menus.iter().find(|m| !self.parser.help_menus.contains_key(*m)) {
            return Err(ConfigError::UnknownHelpMenu(unknown.clone()));
        }
        self.arg().help_menus = menus;
        Ok(self)
    }

    pub fn occurrences_range(mut self, min: usize, max: usize) -> ConfigResult<Self> {
        check_range(min, max)?;
        let arg = self.arg();
        arg.min_occurrences = min;
        arg.max_occurrences = max;
        arg.flags.set(ArgFlags::MANDATORY, min > 0);
        Ok(self)
    }

    /// Mandatory arguments must occur at least once.
    pub fn mandatory(mut self, on: bool) -> Self {
        let arg = self.arg();
        arg.flags.set(ArgFlags::MANDATORY, on);
        arg.min_occurrences = if on { arg.min_occurrences.max(1) } else { 0 };
        self
    }

    /// Stop parsing when matched and skip validation.
    pub fn terminal(mut self, on: bool) -> Self {
        self.arg().flags.set(ArgFlags::TERMINAL, on);
        self
    }
}

impl<K: Keyed> ArgBuilder<'_, K> {
    /// Allow single-character short keys to be combined, as in `-la`.
    pub fn grouping(mut self, on: bool) -> Self {
        self.arg().flags.set(ArgFlags::GROUPING, on);
        self
    }
}

impl ArgBuilder<'_, KeyArg> {
    /// Hand every token after this key to `parser`.
    pub fn subparser(mut self, parser: ArgParser) -> Self {
        if let Some(key) = self.arg().key_info_mut() {
            key.subparser = Some(Box::new(parser));
        }
        self
    }
}

impl ArgBuilder<'_, KeyValueArg> {
    /// Accept `key=value` in a single token.
    pub fn assignment_operator(mut self, on: bool) -> Self {
        self.arg().flags.set(ArgFlags::ASSIGNMENT_OPERATOR, on);
        self
    }
}

impl<K: Valued> ArgBuilder<'_, K> {
    /// Values taken per occurrence. Once set, binding storage no longer
    /// changes the range.
    pub fn values_range(mut self, min: usize, max: usize) -> ConfigResult<Self> {
        check_range(min, max)?;
        let info = self.values();
        info.min_values = min;
        info.max_values = max;
        info.range_fixed = true;
        Ok(self)
    }

    /// Names shown for the values in usage and help.
    pub fn values_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values().values_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Convert every value into a `T` kept by the parser; read it back with
    /// [`ArgParser::stored`]. Several scalar targets may be stored, one per
    /// value position; a container target must be the only one.
    pub fn store<T: Castable>(mut self) -> ConfigResult<Self> {
        if T::MAX_VALUES == 0 {
            return Err(ConfigError::InvalidRange {
                min: T::MIN_VALUES,
                max: T::MAX_VALUES,
            });
        }
        let info = self.values();
        let has_container = info.casters.iter().any(|c| c.is_container());
        if !info.casters.is_empty() && (T::IS_CONTAINER || has_container) {
            return Err(ConfigError::MultipleContainerTargets);
        }
        info.casters.push(Box::new(TypeCaster::<T>::new()));
        if !info.range_fixed {
            if info.casters.len() == 1 {
                info.min_values = T::MIN_VALUES;
                info.max_values = T::MAX_VALUES;
            } else {
                info.min_values = info.casters.len();
                info.max_values = info.casters.len();
            }
        }
        Ok(self)
    }

    /// Regular expressions each value must match entirely. The n-th value of
    /// an occurrence uses the n-th pattern, or the last one.
    pub fn patterns<I, S>(mut self, patterns: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
                    ConfigError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: err.to_string(),
                    }
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        self.values().patterns = compiled;
        Ok(self)
    }

    /// Add a predicate values must satisfy; applied positionally like
    /// [`patterns`](Self::patterns). An empty message means "Invalid value".
    pub fn assertion(
        mut self,
        message: impl Into<String>,
        check: impl Fn(&str) -> bool + 'static,
    ) -> Self {
        self.values().assertions.push(Assertion::new(message, check));
        self
    }
}

impl<K: Triggering> ArgBuilder<'_, K> {
    /// Whether matching the argument asks the caller to exit afterwards.
    pub fn pkill_after_triggering(mut self, on: bool) -> Self {
        self.arg().flags.set(ArgFlags::PKILL_AFTER_TRIGGERING, on);
        self
    }
}

impl ArgBuilder<'_, HelpArg> {
    /// Help menu printed when no menu name follows the key.
    pub fn help_menu_triggered(mut self, menu: impl Into<String>) -> ConfigResult<Self> {
        let menu = menu.into();
        if !self.parser.help_menus.contains_key(&menu) {
            return Err(ConfigError::UnknownHelpMenu(menu));
        }
        self.arg().help_trigger = Some(menu);
        Ok(self)
    }
}

impl ArgBuilder<'_, VersionArg> {
    pub fn version(mut self, text: impl Into<String>) -> Self {
        self.arg().version = Some(text.into());
        self
    }
}
