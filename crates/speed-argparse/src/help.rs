//! Help menus and their rendering.
//!
//! Rendering makes two passes over the printable arguments of a menu. The
//! first measures the short-key and long-key columns so every row lines up,
//! the second emits each section whose header has at least one entry.

use crate::arg::{Arg, ArgKind};
use crate::config::PrefixKind;
use crate::flag_set;
use crate::parser::ArgParser;

flag_set! {
    /// Sections printed by a help menu.
    pub struct HelpMenuFlags: u8 {
        PRINT_USAGE = 0b0000_0001,
        PRINT_DESCRIPTION = 0b0000_0010,
        PRINT_OPTIONS = 0b0000_0100,
        PRINT_COMMANDS = 0b0000_1000,
        PRINT_VALUES = 0b0001_0000,
        PRINT_CONSTRAINTS = 0b0010_0000,
        PRINT_EPILOGUE = 0b0100_0000,
        /// Show the key column of options and commands.
        PRINT_KEYS = 0b1000_0000,
    }
}

impl HelpMenuFlags {
    pub const DEFAULT: Self = Self::PRINT_USAGE
        .union(Self::PRINT_DESCRIPTION)
        .union(Self::PRINT_OPTIONS)
        .union(Self::PRINT_COMMANDS)
        .union(Self::PRINT_VALUES)
        .union(Self::PRINT_CONSTRAINTS)
        .union(Self::PRINT_EPILOGUE)
        .union(Self::PRINT_KEYS);
}

/// Below this many columns, descriptions move under their keys.
const MIN_DESCRIPTION_WIDTH: usize = 20;
const COLUMN_GAP: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpMenu {
    name: String,
    description: Option<String>,
    epilogue: Option<String>,
    max_line_length: usize,
    entries_indentation: usize,
    args_indentation: usize,
    flags: HelpMenuFlags,
}

impl HelpMenu {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            description: None,
            epilogue: None,
            max_line_length: 80,
            entries_indentation: 2,
            args_indentation: 4,
            flags: HelpMenuFlags::DEFAULT,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> HelpMenuFlags {
        self.flags
    }

    pub(crate) fn render(&self, parser: &ArgParser) -> String {
        let printable = self.printable(parser);
        let layout = Layout::measure(&printable, parser);

        let mut blocks: Vec<String> = Vec::new();
        if self.flags.contains(HelpMenuFlags::PRINT_USAGE) {
            blocks.push(self.usage(&printable, parser));
        }
        if self.flags.contains(HelpMenuFlags::PRINT_DESCRIPTION) {
            if let Some(text) = self.description.as_deref().filter(|d| !d.is_empty()) {
                blocks.push(self.paragraph(text));
            }
        }
        if self.flags.contains(HelpMenuFlags::PRINT_OPTIONS) {
            self.push_section(&mut blocks, "Options:", &layout.options, &layout);
        }
        if self.flags.contains(HelpMenuFlags::PRINT_COMMANDS) {
            self.push_section(&mut blocks, "Commands:", &layout.commands, &layout);
        }
        if self.flags.contains(HelpMenuFlags::PRINT_VALUES) {
            self.push_section(&mut blocks, "Values:", &layout.values, &layout);
        }
        if self.flags.contains(HelpMenuFlags::PRINT_CONSTRAINTS) {
            let lines = self.constraint_lines(parser);
            if !lines.is_empty() {
                blocks.push(format!("Constraints:\n{}", lines.concat()));
            }
        }
        if self.flags.contains(HelpMenuFlags::PRINT_EPILOGUE) {
            if let Some(text) = self.epilogue.as_deref().filter(|e| !e.is_empty()) {
                blocks.push(self.paragraph(text));
            }
        }
        blocks.join("\n")
    }

    fn printable<'a>(&self, parser: &'a ArgParser) -> Vec<&'a Arg> {
        parser
            .args
            .iter()
            .filter(|arg| arg.in_menu(&self.name))
            .filter(|arg| arg.description().is_some_and(|d| !d.is_empty()))
            .collect()
    }

    /// The usage block alone, wrapped under the program name.
    pub(crate) fn usage_text(&self, parser: &ArgParser) -> String {
        self.usage(&self.printable(parser), parser)
    }

    fn usage(&self, printable: &[&Arg], parser: &ArgParser) -> String {
        let head = format!("Usage: {}", parser.program_name());
        let hang = " ".repeat(head.chars().count());
        let mut out = String::new();
        let mut line = head;
        let mut items_on_line = 0;
        for arg in printable {
            let item = usage_item(arg, parser);
            if items_on_line > 0
                && line.chars().count() + 1 + item.chars().count() > self.max_line_length
            {
                out.push_str(&line);
                out.push('\n');
                line = hang.clone();
                items_on_line = 0;
            }
            line.push(' ');
            line.push_str(&item);
            items_on_line += 1;
        }
        out.push_str(&line);
        out.push('\n');
        out
    }

    fn paragraph(&self, text: &str) -> String {
        wrap(text, self.max_line_length)
            .into_iter()
            .map(|line| format!("{line}\n"))
            .collect()
    }

    fn push_section(&self, blocks: &mut Vec<String>, header: &str, rows: &[Row], layout: &Layout) {
        if rows.is_empty() {
            return;
        }
        let mut block = format!("{header}\n");
        for row in rows {
            self.entry(&mut block, row, layout);
        }
        blocks.push(block);
    }

    fn entry(&self, out: &mut String, row: &Row, layout: &Layout) {
        let indent = " ".repeat(self.entries_indentation);
        let show_keys = self.flags.contains(HelpMenuFlags::PRINT_KEYS) || row.kind == RowKind::Value;
        if !show_keys {
            let width = self.max_line_length.saturating_sub(self.entries_indentation);
            for line in wrap(&row.text, width) {
                out.push_str(&format!("{indent}{line}\n"));
            }
            return;
        }

        let left = row.left(layout);
        let column = self.entries_indentation + layout.key_width + COLUMN_GAP;
        let width = self.max_line_length.saturating_sub(column);
        if width < MIN_DESCRIPTION_WIDTH {
            out.push_str(&format!("{indent}{}\n", left.trim_end()));
            let hang = self.entries_indentation + self.args_indentation;
            let pad = " ".repeat(hang);
            for line in wrap(&row.text, self.max_line_length.saturating_sub(hang)) {
                out.push_str(&format!("{pad}{line}\n"));
            }
            return;
        }

        let pad = " ".repeat(column);
        let gap = " ".repeat(COLUMN_GAP);
        for (i, line) in wrap(&row.text, width).into_iter().enumerate() {
            if i == 0 {
                out.push_str(&format!(
                    "{indent}{}{gap}{line}\n",
                    pad_to(&left, layout.key_width)
                ));
            } else {
                out.push_str(&format!("{pad}{line}\n"));
            }
        }
    }

    fn constraint_lines(&self, parser: &ArgParser) -> Vec<String> {
        let width = self.max_line_length.saturating_sub(self.entries_indentation);
        let indent = " ".repeat(self.entries_indentation);
        parser
            .constraints
            .iter()
            .filter(|c| c.args().iter().any(|&id| parser.args[id].in_menu(&self.name)))
            .flat_map(|c| {
                let names: Vec<&str> = c
                    .args()
                    .iter()
                    .map(|&id| parser.args[id].display_name())
                    .collect();
                wrap(&c.help_line(&names), width)
            })
            .map(|line| format!("{indent}{line}\n"))
            .collect()
    }
}

/// Fluent settings of a help menu, returned by [`ArgParser::add_help_menu`]
/// and [`ArgParser::help_menu`].
pub struct HelpMenuBuilder<'p> {
    menu: &'p mut HelpMenu,
}

impl<'p> HelpMenuBuilder<'p> {
    pub(crate) fn new(menu: &'p mut HelpMenu) -> Self {
        Self { menu }
    }

    pub fn description(self, text: impl Into<String>) -> Self {
        self.menu.description = Some(text.into());
        self
    }

    pub fn epilogue(self, text: impl Into<String>) -> Self {
        self.menu.epilogue = Some(text.into());
        self
    }

    pub fn max_line_length(self, length: usize) -> Self {
        self.menu.max_line_length = length;
        self
    }

    pub fn entries_indentation(self, indent: usize) -> Self {
        self.menu.entries_indentation = indent;
        self
    }

    /// Indentation of descriptions placed under their keys.
    pub fn args_indentation(self, indent: usize) -> Self {
        self.menu.args_indentation = indent;
        self
    }

    pub fn flags(self, flags: HelpMenuFlags) -> Self {
        self.menu.flags = flags;
        self
    }

    pub fn print(self, section: HelpMenuFlags, on: bool) -> Self {
        self.menu.flags.set(section, on);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Option,
    Command,
    Value,
}

#[derive(Debug)]
struct Row {
    kind: RowKind,
    short: String,
    long: String,
    text: String,
}

impl Row {
    fn left(&self, layout: &Layout) -> String {
        if self.kind != RowKind::Option {
            return self.short.clone();
        }
        let mut left = pad_to(&self.short, layout.short_width);
        if layout.short_width > 0 && layout.long_width > 0 {
            left.push_str(if !self.short.is_empty() && !self.long.is_empty() {
                ", "
            } else {
                "  "
            });
        }
        left.push_str(&self.long);
        left
    }
}

struct Layout {
    options: Vec<Row>,
    commands: Vec<Row>,
    values: Vec<Row>,
    short_width: usize,
    long_width: usize,
    key_width: usize,
}

impl Layout {
    fn measure(printable: &[&Arg], parser: &ArgParser) -> Self {
        let mut options = Vec::new();
        let mut commands = Vec::new();
        let mut values = Vec::new();

        for arg in printable {
            let text = arg.description().unwrap_or_default().to_string();
            let names = value_names_text(arg);
            if arg.kind() == ArgKind::Keyless {
                values.push(Row {
                    kind: RowKind::Value,
                    short: names,
                    long: String::new(),
                    text,
                });
                continue;
            }

            let mut short = Vec::new();
            let mut long = Vec::new();
            let mut bare = Vec::new();
            for key in arg.keys() {
                match parser.config.prefix_kind(key) {
                    PrefixKind::Short => short.push(key.as_str()),
                    PrefixKind::Long => long.push(key.as_str()),
                    PrefixKind::None => bare.push(key.as_str()),
                }
            }
            if short.is_empty() && long.is_empty() {
                commands.push(Row {
                    kind: RowKind::Command,
                    short: bare.join(", "),
                    long: String::new(),
                    text,
                });
                continue;
            }

            let mut short = short.join(", ");
            let mut long = long.join(", ");
            if !names.is_empty() {
                let target = if long.is_empty() { &mut short } else { &mut long };
                target.push(' ');
                target.push_str(&names);
            }
            options.push(Row {
                kind: RowKind::Option,
                short,
                long,
                text,
            });
        }

        let width = |s: &str| s.chars().count();
        let short_width = options.iter().map(|r| width(&r.short)).max().unwrap_or(0);
        let long_width = options.iter().map(|r| width(&r.long)).max().unwrap_or(0);
        let gap = if short_width > 0 && long_width > 0 { 2 } else { 0 };
        let key_width = commands
            .iter()
            .chain(values.iter())
            .map(|r| width(&r.short))
            .chain(std::iter::once(short_width + gap + long_width))
            .max()
            .unwrap_or(0);

        Self {
            options,
            commands,
            values,
            short_width,
            long_width,
            key_width,
        }
    }
}

fn pad_to(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

/// Value names as shown after keys: `NAME`, `[NAME]` when values are optional.
fn value_names_text(arg: &Arg) -> String {
    let Some(info) = arg.value_info() else {
        return String::new();
    };
    let names: Vec<&str> = if !info.values_names().is_empty() {
        info.values_names().iter().map(String::as_str).collect()
    } else {
        match arg.kind() {
            ArgKind::Keyless => vec![arg.display_name()],
            ArgKind::KeyValue => vec!["VALUE"],
            _ => Vec::new(),
        }
    };
    if names.is_empty() {
        return String::new();
    }
    let (min, max) = info.values_range();
    let mut text = names.join(" ");
    if max > 1 && names.len() < max {
        text.push_str("...");
    }
    if min == 0 {
        text = format!("[{text}]");
    }
    text
}

fn usage_item(arg: &Arg, parser: &ArgParser) -> String {
    let names = value_names_text(arg);
    let mut item = match arg.kind() {
        ArgKind::Keyless => names,
        _ => {
            let key = arg
                .keys()
                .iter()
                .find(|k| parser.config.prefix_kind(k) == PrefixKind::Short)
                .or_else(|| arg.keys().first())
                .cloned()
                .unwrap_or_default();
            if names.is_empty() {
                key
            } else {
                format!("{key} {names}")
            }
        }
    };
    if arg.occurrences_range().0 == 0 {
        item = format!("[{item}]");
    }
    item
}

/// Greedy word wrap. Explicit newlines in `text` are kept.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if len > 0 && len + 1 + word_len > width {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.push_str(word);
            len += word_len;
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap("one\ntwo three", 80), vec!["one", "two three"]);
        assert_eq!(wrap("unbreakableword", 4), vec!["unbreakableword"]);
    }

    #[test]
    fn pad_to_fills_with_spaces() {
        assert_eq!(pad_to("-s", 4), "-s  ");
        assert_eq!(pad_to("--seconds", 4), "--seconds");
    }

    #[test]
    fn default_flags_print_every_section() {
        let flags = HelpMenuFlags::DEFAULT;
        assert!(flags.contains(HelpMenuFlags::PRINT_USAGE | HelpMenuFlags::PRINT_EPILOGUE));
        assert!(flags.contains(HelpMenuFlags::PRINT_KEYS));
    }
}
