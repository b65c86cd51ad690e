//! Parser-wide settings.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::parser::ArgParser;

/// How a key is introduced on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixKind {
    Long,
    Short,
    /// No configured prefix, e.g. a command word like `build`.
    None,
}

/// Everything `configure()` can change, in a form that can be loaded from a
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParserConfig {
    pub colors: bool,
    /// Prefix of every error line. Defaults to the program name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
    pub long_prefixes: Vec<String>,
    pub short_prefixes: Vec<String>,
    pub assignment_operator: char,
    pub maximum_unrecognized_args: usize,
    pub pkill_after_printing_errors: bool,
    pub print_errors: bool,
    pub print_help_after_printing_errors: bool,
    /// Defaults to the file name of the first parsed token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            colors: false,
            error_id: None,
            long_prefixes: vec!["--".to_string()],
            short_prefixes: vec!["-".to_string()],
            assignment_operator: '=',
            maximum_unrecognized_args: usize::MAX,
            pkill_after_printing_errors: true,
            print_errors: true,
            print_help_after_printing_errors: false,
            program_name: None,
        }
    }
}

impl ParserConfig {
    /// Classify `key` by the longest configured prefix it starts with. Long
    /// prefixes win over short ones, and a key made only of a prefix has none.
    pub fn prefix_kind(&self, key: &str) -> PrefixKind {
        if longest_prefix(&self.long_prefixes, key).is_some() {
            PrefixKind::Long
        } else if longest_prefix(&self.short_prefixes, key).is_some() {
            PrefixKind::Short
        } else {
            PrefixKind::None
        }
    }

    /// The short prefix `token` starts with, if it is not long-prefixed.
    pub(crate) fn short_prefix_of<'t>(&self, token: &'t str) -> Option<&'t str> {
        if longest_prefix(&self.long_prefixes, token).is_some() {
            return None;
        }
        longest_prefix(&self.short_prefixes, token).map(|len| &token[..len])
    }

    pub(crate) fn starts_with_prefix(&self, token: &str) -> bool {
        self.prefix_kind(token) != PrefixKind::None
    }
}

fn longest_prefix(prefixes: &[String], token: &str) -> Option<usize> {
    prefixes
        .iter()
        .filter(|p| !p.is_empty() && token.len() > p.len() && token.starts_with(p.as_str()))
        .map(String::len)
        .max()
}

/// Fluent access to a parser's settings, returned by [`ArgParser::configure`].
pub struct Configurator<'p> {
    parser: &'p mut ArgParser,
}

impl<'p> Configurator<'p> {
    pub(crate) fn new(parser: &'p mut ArgParser) -> Self {
        Self { parser }
    }

    fn config(&mut self) -> &mut ParserConfig {
        &mut self.parser.config
    }

    pub fn colors(mut self, on: bool) -> Self {
        self.config().colors = on;
        self
    }

    pub fn error_id(mut self, id: impl Into<String>) -> Self {
        self.config().error_id = Some(id.into());
        self
    }

    pub fn long_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config().long_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn short_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config().short_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn assignment_operator(mut self, op: char) -> Self {
        self.config().assignment_operator = op;
        self
    }

    pub fn maximum_unrecognized_args(mut self, max: usize) -> Self {
        self.config().maximum_unrecognized_args = max;
        self
    }

    pub fn pkill_after_printing_errors(mut self, on: bool) -> Self {
        self.config().pkill_after_printing_errors = on;
        self
    }

    pub fn print_errors(mut self, on: bool) -> Self {
        self.config().print_errors = on;
        self
    }

    pub fn print_help_after_printing_errors(mut self, on: bool) -> Self {
        self.config().print_help_after_printing_errors = on;
        self
    }

    pub fn program_name(mut self, name: impl Into<String>) -> Self {
        self.config().program_name = Some(name.into());
        self
    }

    /// Where help, usage, version and errors are written. Defaults to stdout.
    pub fn output(self, output: Box<dyn Write>) -> Self {
        self.parser.output = output;
        self
    }
}
