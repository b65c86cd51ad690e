//! The parser: owns every declared argument, help menu and constraint, and
//! turns a command line into validated values.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use indexmap::IndexMap;

use crate::arg::{Arg, ArgFlags, ArgKind};
use crate::builder::{ArgBuilder, HelpArg, KeyArg, KeyValueArg, KeylessArg, VersionArg};
use crate::cast::{Castable, TypeCaster, try_type_cast};
use crate::config::{Configurator, ParserConfig};
use crate::constraint::{ArgConstraint, ConstraintKind};
use crate::error::{ConfigError, ConfigResult};
use crate::flag_set;
use crate::help::{HelpMenu, HelpMenuBuilder};
use crate::style::highlight;

flag_set! {
    /// Problems found by the last parse, summarized for the whole parser.
    pub struct ParserErrorFlags: u8 {
        /// At least one argument or value has errors.
        ARGS_ERROR = 0b001,
        UNRECOGNIZED_ARGS_ERROR = 0b010,
        ARGS_CONSTRAINTS_ERROR = 0b100,
    }
}

/// What the caller should do once parsing returns.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    Completed,
    /// A help or version argument was triggered, or errors were printed,
    /// and the configuration asks for the process to end with this code.
    Exit(i32),
}

impl ParseStatus {
    pub fn is_exit(self) -> bool {
        matches!(self, Self::Exit(_))
    }

    /// Terminate the process if an exit was requested.
    pub fn exit_if_requested(self) {
        if let Self::Exit(code) = self {
            std::process::exit(code);
        }
    }
}

/// Slot the next non-key token may fill.
#[derive(Debug, Clone, Copy)]
struct OpenSlot {
    id: usize,
    /// The occurrence was rejected; swallow its values without recording.
    discard: bool,
    discarded: usize,
}

#[derive(Debug, Default)]
struct Scan {
    open: Option<OpenSlot>,
    loose: Vec<String>,
    after_separator: bool,
}

enum Token<'t> {
    Key(usize),
    Assigned(usize, &'t str),
    Group(Vec<usize>),
    Other,
}

enum Flow {
    Continue,
    /// A terminal argument was matched.
    Stop(ParseStatus),
}

const SEPARATOR: &str = "--";

pub struct ArgParser {
    pub(crate) config: ParserConfig,
    pub(crate) output: Box<dyn Write>,
    pub(crate) args: Vec<Arg>,
    pub(crate) help_menus: IndexMap<String, HelpMenu>,
    pub(crate) constraints: Vec<ArgConstraint>,
    /// Every key and keyless name, mapped to its argument.
    lookup: IndexMap<String, usize>,
    program_name: String,
    unrecognized: Vec<String>,
    errors: ParserErrorFlags,
    active_subparser: Option<usize>,
}

impl Default for ArgParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgParser {
    pub fn new() -> Self {
        let config = ParserConfig {
            colors: io::stdout().is_terminal(),
            ..ParserConfig::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let mut help_menus = IndexMap::new();
        help_menus.insert(String::new(), HelpMenu::new(String::new()));
        Self {
            program_name: config.program_name.clone().unwrap_or_default(),
            config,
            output: Box::new(io::stdout()),
            args: Vec::new(),
            help_menus,
            constraints: Vec::new(),
            lookup: IndexMap::new(),
            unrecognized: Vec::new(),
            errors: ParserErrorFlags::empty(),
            active_subparser: None,
        }
    }

    pub fn configure(&mut self) -> Configurator<'_> {
        Configurator::new(self)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn program_name(&self) -> &str {
        self.config
            .program_name
            .as_deref()
            .unwrap_or(&self.program_name)
    }

    fn error_id(&self) -> &str {
        self.config
            .error_id
            .as_deref()
            .unwrap_or_else(|| self.program_name())
    }

    fn register(&mut self, names: &[String], arg: Arg) -> ConfigResult<usize> {
        if names.is_empty() || names.iter().any(|n| n.is_empty()) {
            return Err(ConfigError::EmptyKey);
        }
        for (i, name) in names.iter().enumerate() {
            if self.lookup.contains_key(name) || names[..i].contains(name) {
                return Err(ConfigError::DuplicateKey(name.clone()));
            }
        }
        let id = self.args.len();
        for name in names {
            self.lookup.insert(name.clone(), id);
        }
        self.args.push(arg);
        tracing::trace!(id, ?names, "declared argument");
        Ok(id)
    }

    fn add_keyed<I, S>(&mut self, kind: ArgKind, keys: I) -> ConfigResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.register(&keys, Arg::keyed(kind, keys.clone()))
    }

    /// Declare a key that takes no values, such as `-v` or `--verbose`.
    pub fn add_key_arg<I, S>(&mut self, keys: I) -> ConfigResult<ArgBuilder<'_, KeyArg>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.add_keyed(ArgKind::Key, keys)?;
        Ok(ArgBuilder::new(self, id))
    }

    /// Declare a key followed by values, such as `--seconds 10`.
    pub fn add_key_value_arg<I, S>(&mut self, keys: I) -> ConfigResult<ArgBuilder<'_, KeyValueArg>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.add_keyed(ArgKind::KeyValue, keys)?;
        Ok(ArgBuilder::new(self, id))
    }

    /// Declare a positional argument. `name` is used for lookups, usage and
    /// error messages.
    pub fn add_keyless_arg(&mut self, name: impl Into<String>) -> ConfigResult<ArgBuilder<'_, KeylessArg>> {
        let name = name.into();
        let id = self.register(std::slice::from_ref(&name), Arg::keyless(name.clone()))?;
        Ok(ArgBuilder::new(self, id))
    }

    /// Declare a key that prints a help menu when found.
    pub fn add_help_arg<I, S>(&mut self, keys: I) -> ConfigResult<ArgBuilder<'_, HelpArg>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.add_keyed(ArgKind::Help, keys)?;
        Ok(ArgBuilder::new(self, id))
    }

    /// Declare a key that prints version text when found.
    pub fn add_version_arg<I, S>(&mut self, keys: I) -> ConfigResult<ArgBuilder<'_, VersionArg>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.add_keyed(ArgKind::Version, keys)?;
        Ok(ArgBuilder::new(self, id))
    }

    pub fn add_help_menu(&mut self, name: impl Into<String>) -> ConfigResult<HelpMenuBuilder<'_>> {
        let name = name.into();
        if self.help_menus.contains_key(&name) {
            return Err(ConfigError::DuplicateHelpMenu(name));
        }
        let menu = self
            .help_menus
            .entry(name.clone())
            .or_insert_with(|| HelpMenu::new(name));
        Ok(HelpMenuBuilder::new(menu))
    }

    /// Settings of an existing menu; the main menu is named `""`.
    pub fn help_menu(&mut self, name: &str) -> ConfigResult<HelpMenuBuilder<'_>> {
        self.help_menus
            .get_mut(name)
            .map(HelpMenuBuilder::new)
            .ok_or_else(|| ConfigError::UnknownHelpMenu(name.to_string()))
    }

    fn add_constraint<I, S>(&mut self, kind: ConstraintKind, keys: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = keys
            .into_iter()
            .map(|key| {
                let key = key.as_ref();
                self.lookup
                    .get(key)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownArgument(key.to_string()))
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        self.constraints.push(ArgConstraint::new(kind, ids));
        Ok(())
    }

    /// Require at least one of the arguments named by `keys` to be found.
    pub fn add_at_least_one_found_constraint<I, S>(&mut self, keys: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_constraint(ConstraintKind::AtLeastOneFound, keys)
    }

    /// Allow at most one of the arguments named by `keys` to be found.
    pub fn add_mutually_exclusive_constraint<I, S>(&mut self, keys: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_constraint(ConstraintKind::MutuallyExclusive, keys)
    }

    /// Clear everything the last parse recorded.
    pub fn reset(&mut self) {
        for arg in &mut self.args {
            arg.reset();
        }
        for constraint in &mut self.constraints {
            constraint.reset();
        }
        self.unrecognized.clear();
        self.errors = ParserErrorFlags::empty();
        self.active_subparser = None;
    }

    /// Parse the process arguments.
    pub fn parse_env(&mut self) -> ParseStatus {
        self.parse_args(std::env::args())
    }

    /// Parse `args`; the first item is the program path, as in `argv`.
    pub fn parse_args<I, S>(&mut self, args: I) -> ParseStatus
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        if let Some(program) = args.next() {
            self.program_name = Path::new(&program)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or(program);
        }
        let tokens: Vec<String> = args.collect();

        self.reset();
        tracing::debug!(program = self.program_name(), tokens = tokens.len(), "parsing arguments");

        let mut scan = Scan::default();
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();
            i += 1;

            if scan.after_separator {
                scan.loose.push(token.to_string());
                continue;
            }
            if token == SEPARATOR && !self.lookup.contains_key(SEPARATOR) {
                scan.after_separator = true;
                scan.open = None;
                continue;
            }

            let ids = match self.classify(token) {
                Token::Key(id) => vec![id],
                Token::Group(ids) => ids,
                Token::Assigned(id, value) => {
                    tracing::trace!(token, "assignment");
                    if self.occur(id, &mut scan, Some(value)) {
                        return self.trigger(id);
                    }
                    continue;
                }
                Token::Other if self.looks_like_key(token) => {
                    tracing::trace!(token, "unrecognized");
                    scan.open = None;
                    self.unrecognize(token);
                    continue;
                }
                Token::Other => {
                    tracing::trace!(token, "value");
                    if !self.feed(&mut scan, token) {
                        scan.loose.push(token.to_string());
                    }
                    continue;
                }
            };

            for id in ids {
                tracing::trace!(token, key = self.args[id].display_name(), "key");
                if let Flow::Stop(status) = self.occur_key(id, &mut scan, &tokens, &mut i) {
                    return status;
                }
                if self.has_subparser(id) && self.args[id].was_found() {
                    return self.hand_off(id, token, &tokens[i..], scan.loose);
                }
            }
        }

        self.finish(scan.loose)
    }

    fn classify<'t>(&self, token: &'t str) -> Token<'t> {
        if let Some(&id) = self.lookup.get(token) {
            if self.args[id].kind().is_keyed() {
                return Token::Key(id);
            }
        }

        if let Some((key, value)) = token.split_once(self.config.assignment_operator) {
            if let Some(&id) = self.lookup.get(key) {
                let arg = &self.args[id];
                if arg.kind().is_keyed()
                    && arg.kind().has_values()
                    && arg.flags().contains(ArgFlags::ASSIGNMENT_OPERATOR)
                {
                    return Token::Assigned(id, value);
                }
            }
        }

        if let Some(ids) = self.group(token) {
            return Token::Group(ids);
        }
        Token::Other
    }

    /// Expand `-la` into the arguments behind `-l` and `-a`, if every
    /// character names a grouping-enabled single-character short key. A key
    /// owning a sub-parser may only come last, since it consumes the rest.
    fn group(&self, token: &str) -> Option<Vec<usize>> {
        let prefix = self.config.short_prefix_of(token)?;
        let rest = &token[prefix.len()..];
        if rest.chars().count() < 2 {
            return None;
        }
        let ids = rest
            .chars()
            .map(|c| {
                let id = *self.lookup.get(&format!("{prefix}{c}"))?;
                let arg = &self.args[id];
                (arg.kind().is_keyed() && arg.flags().contains(ArgFlags::GROUPING)).then_some(id)
            })
            .collect::<Option<Vec<_>>>()?;
        let (_, init) = ids.split_last()?;
        if init.iter().any(|&id| self.has_subparser(id)) {
            return None;
        }
        Some(ids)
    }

    fn has_subparser(&self, id: usize) -> bool {
        self.args[id]
            .key_info()
            .is_some_and(|k| k.subparser().is_some())
    }

    /// Record an occurrence of a keyed argument. An `inline` value comes
    /// from `key=value` and closes the occurrence; otherwise the value slot
    /// stays open for the following tokens. Returns whether a terminal
    /// argument was matched.
    fn occur(&mut self, id: usize, scan: &mut Scan, inline: Option<&str>) -> bool {
        let arg = &mut self.args[id];
        let accepted = arg.begin_occurrence();
        scan.open = None;
        match inline {
            Some(value) if accepted => arg.push_value(value),
            Some(_) => {}
            None if arg.kind().has_values() && arg.kind() != ArgKind::Help => {
                scan.open = Some(OpenSlot {
                    id,
                    discard: !accepted,
                    discarded: 0,
                });
            }
            None => {}
        }
        accepted && arg.flags().contains(ArgFlags::TERMINAL)
    }

    /// Handle a key token at `tokens[*i - 1]`. A help argument takes the
    /// next token as its value when it names a help menu; any other terminal
    /// argument takes its values before the scan stops.
    fn occur_key(&mut self, id: usize, scan: &mut Scan, tokens: &[String], i: &mut usize) -> Flow {
        if self.args[id].kind() == ArgKind::Help {
            let menu = tokens
                .get(*i)
                .filter(|next| !next.is_empty())
                .filter(|next| self.help_menus.contains_key(next.as_str()))
                .filter(|next| !self.lookup.contains_key(next.as_str()));
            if let Some(menu) = menu {
                *i += 1;
                if self.occur(id, scan, Some(menu.as_str())) {
                    return Flow::Stop(self.trigger(id));
                }
                return Flow::Continue;
            }
        }

        if !self.occur(id, scan, None) {
            return Flow::Continue;
        }
        while let Some(next) = tokens.get(*i) {
            let is_value = matches!(self.classify(next), Token::Other) && !self.looks_like_key(next);
            if !is_value || !self.feed(scan, next) {
                break;
            }
            *i += 1;
        }
        Flow::Stop(self.trigger(id))
    }

    /// Try to put a non-key token into the open value slot.
    fn feed(&mut self, scan: &mut Scan, token: &str) -> bool {
        let Some(slot) = scan.open.as_mut() else {
            return false;
        };
        let arg = &mut self.args[slot.id];
        if slot.discard {
            if slot.discarded < arg.max_values() {
                slot.discarded += 1;
                return true;
            }
        } else if arg.accepts_value() {
            arg.push_value(token);
            return true;
        }
        scan.open = None;
        false
    }

    /// Prefixed tokens that are not negative numbers are never taken as
    /// values.
    fn looks_like_key(&self, token: &str) -> bool {
        self.config.starts_with_prefix(token) && token.parse::<f64>().is_err()
    }

    fn unrecognize(&mut self, token: &str) {
        self.errors.insert(ParserErrorFlags::UNRECOGNIZED_ARGS_ERROR);
        if self.unrecognized.len() < self.config.maximum_unrecognized_args {
            self.unrecognized.push(token.to_string());
        }
    }

    /// Run the action of a terminal argument and decide whether to exit.
    fn trigger(&mut self, id: usize) -> ParseStatus {
        let arg = &self.args[id];
        let text = match arg.kind() {
            ArgKind::Help => {
                let requested = arg
                    .value_info()
                    .and_then(|info| info.values().last())
                    .map(|v| v.raw().to_string())
                    .filter(|name| self.help_menus.contains_key(name));
                let menu = requested
                    .or_else(|| arg.help_trigger.clone())
                    .unwrap_or_default();
                self.help_text(&menu)
            }
            ArgKind::Version => arg.version.as_ref().map(|v| format!("{v}\n")),
            _ => None,
        };
        let pkill = arg.flags().contains(ArgFlags::PKILL_AFTER_TRIGGERING);
        tracing::debug!(key = arg.display_name(), pkill, "terminal argument matched");

        if let Some(text) = text {
            self.write_out(&text);
        }
        if pkill {
            ParseStatus::Exit(0)
        } else {
            ParseStatus::Completed
        }
    }

    /// Give the remaining tokens to the sub-parser of `id`; this parser
    /// consumes nothing more.
    fn hand_off(&mut self, id: usize, key: &str, rest: &[String], loose: Vec<String>) -> ParseStatus {
        let program = format!("{} {key}", self.program_name());
        tracing::debug!(%program, tokens = rest.len(), "handing off to sub-parser");
        self.active_subparser = Some(id);

        let argv = std::iter::once(program).chain(rest.iter().cloned());
        let status = match self.args[id].subparser_mut() {
            Some(subparser) => subparser.parse_args(argv),
            None => ParseStatus::Completed,
        };
        if status.is_exit() {
            return status;
        }
        self.finish(loose)
    }

    /// Distribute positional tokens in declaration order, keeping enough
    /// tokens back for the minimum of every later keyless argument.
    fn assign_keyless(&mut self, loose: Vec<String>) {
        let keyless: Vec<usize> = (0..self.args.len())
            .filter(|&id| self.args[id].kind() == ArgKind::Keyless)
            .collect();
        let floor = |arg: &Arg| {
            let (min_occurrences, _) = arg.occurrences_range();
            let (min_values, _) = arg.value_info().map_or((0, 0), |v| v.values_range());
            if min_occurrences > 0 { min_values } else { 0 }
        };

        let mut rest = loose.as_slice();
        for (pos, &id) in keyless.iter().enumerate() {
            let reserved: usize = keyless[pos + 1..].iter().map(|&j| floor(&self.args[j])).sum();
            let (min, max) = self.args[id]
                .value_info()
                .map_or((0, 0), |v| v.values_range());
            let mut take = rest.len().saturating_sub(reserved).min(max);
            if take < min {
                take = min.min(rest.len());
            }
            if take == 0 {
                continue;
            }
            let arg = &mut self.args[id];
            arg.begin_occurrence();
            for token in &rest[..take] {
                arg.push_value(token);
            }
            rest = &rest[take..];
        }

        for token in rest {
            self.unrecognize(token);
        }
    }

    /// Post-scan validation and error reporting.
    fn finish(&mut self, loose: Vec<String>) -> ParseStatus {
        self.assign_keyless(loose);

        let args = &self.args;
        let mut violated = false;
        for constraint in &mut self.constraints {
            violated |= constraint.evaluate(|id| args[id].was_found());
        }
        if violated {
            self.errors.insert(ParserErrorFlags::ARGS_CONSTRAINTS_ERROR);
        }

        for arg in &mut self.args {
            arg.update_error_flags();
        }
        if self.args.iter().any(Arg::has_errors) {
            self.errors.insert(ParserErrorFlags::ARGS_ERROR);
        }
        tracing::debug!(errors = ?self.errors, unrecognized = self.unrecognized.len(), "parse finished");

        if self.errors.is_empty() || !self.config.print_errors {
            return ParseStatus::Completed;
        }
        let mut text = self.errors_text();
        if self.config.print_help_after_printing_errors {
            if let Some(help) = self.help_text("") {
                text.push_str(&help);
            }
        }
        self.write_out(&text);
        if self.config.pkill_after_printing_errors {
            ParseStatus::Exit(1)
        } else {
            ParseStatus::Completed
        }
    }

    fn write_out(&mut self, text: &str) {
        let result = self
            .output
            .write_all(text.as_bytes())
            .and_then(|()| self.output.flush());
        if let Err(err) = result {
            tracing::warn!(%err, "failed to write parser output");
        }
    }

    fn find(&self, key: &str) -> Option<&Arg> {
        self.lookup.get(key).map(|&id| &self.args[id])
    }

    /// Look up a declared argument by any of its keys or its keyless name.
    pub fn arg(&self, key: &str) -> Option<&Arg> {
        self.find(key)
    }

    pub fn was_found(&self, key: &str) -> bool {
        self.find(key).is_some_and(Arg::was_found)
    }

    pub fn count_occurrences(&self, key: &str) -> usize {
        self.find(key).map_or(0, Arg::occurrences)
    }

    pub fn count_values_found(&self, key: &str) -> usize {
        self.find(key)
            .and_then(Arg::value_info)
            .map_or(0, |info| info.values().len())
    }

    /// Raw values captured for `key`, across all occurrences.
    pub fn values_found(&self, key: &str) -> Vec<&str> {
        self.find(key)
            .and_then(Arg::value_info)
            .map(|info| info.values().iter().map(|v| v.raw()).collect())
            .unwrap_or_default()
    }

    /// The first value of `key` converted to `T`.
    pub fn get_front_as<T: Castable>(&self, key: &str) -> Option<T> {
        self.get_at_as(key, 0)
    }

    /// The `index`-th value of `key` converted to `T`.
    pub fn get_at_as<T: Castable>(&self, key: &str, index: usize) -> Option<T> {
        let raw = *self.values_found(key).get(index)?;
        try_type_cast(raw).ok()
    }

    /// The storage bound with `store::<T>()`.
    pub fn stored<T: Castable>(&self, key: &str) -> Option<&T> {
        self.stored_at(key, 0)
    }

    /// The `index`-th storage bound to `key`.
    pub fn stored_at<T: Castable>(&self, key: &str, index: usize) -> Option<&T> {
        self.find(key)?
            .value_info()?
            .casters
            .get(index)?
            .as_any()
            .downcast_ref::<TypeCaster<T>>()?
            .value()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_flags(&self) -> ParserErrorFlags {
        self.errors
    }

    pub fn unrecognized_args(&self) -> &[String] {
        &self.unrecognized
    }

    /// The sub-parser declared on `key`.
    pub fn subparser(&self, key: &str) -> Option<&ArgParser> {
        self.find(key)?.key_info()?.subparser()
    }

    /// The sub-parser that consumed the tail of the last command line.
    pub fn active_subparser(&self) -> Option<&ArgParser> {
        self.args[self.active_subparser?].key_info()?.subparser()
    }

    pub fn help_text(&self, menu: &str) -> Option<String> {
        self.help_menus.get(menu).map(|m| m.render(self))
    }

    pub fn usage_text(&self) -> String {
        self.help_menus
            .get("")
            .map(|m| m.usage_text(self))
            .unwrap_or_default()
    }

    /// Version text of the first version argument.
    pub fn version_text(&self) -> Option<String> {
        self.args
            .iter()
            .find_map(|arg| arg.version.as_ref())
            .map(|v| format!("{v}\n"))
    }

    /// Every diagnostic of the last parse, one line each.
    pub fn errors_text(&self) -> String {
        let id = self.error_id();
        let colors = self.config.colors;
        let mut lines: Vec<String> = self
            .unrecognized
            .iter()
            .map(|token| format!("{id}: Unrecognized argument '{}'", highlight(token, colors)))
            .collect();
        for arg in &self.args {
            lines.extend(arg.error_lines(id, colors));
        }
        for constraint in self.constraints.iter().filter(|c| c.is_violated()) {
            let names: Vec<&str> = constraint
                .args()
                .iter()
                .map(|&i| self.args[i].display_name())
                .collect();
            lines.push(constraint.error_line(id, &names, colors));
        }
        lines.into_iter().map(|line| line + "\n").collect()
    }

    pub fn print_help(&mut self) {
        self.print_help_menu("");
    }

    pub fn print_help_menu(&mut self, menu: &str) {
        if let Some(text) = self.help_text(menu) {
            self.write_out(&text);
        }
    }

    pub fn print_usage(&mut self) {
        let text = self.usage_text();
        self.write_out(&text);
    }

    pub fn print_version(&mut self) {
        if let Some(text) = self.version_text() {
            self.write_out(&text);
        }
    }

    pub fn print_errors(&mut self) {
        let text = self.errors_text();
        self.write_out(&text);
    }
}
