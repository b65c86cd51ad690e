use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

use speed_argparse::{
    ArgParser, ConfigError, HelpMenuFlags, ParseStatus, ParserConfig, ParserErrorFlags,
    ReadableDirectory,
};

/// Shared in-memory sink standing in for stdout.
#[derive(Clone, Default)]
struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn new_parser() -> (ArgParser, Capture) {
    let capture = Capture::default();
    let mut parser = ArgParser::with_config(ParserConfig::default());
    parser
        .configure()
        .program_name("speed")
        .output(Box::new(capture.clone()));
    (parser, capture)
}

fn seconds_parser() -> (ArgParser, Capture) {
    let (mut parser, capture) = new_parser();
    parser
        .add_help_arg(["-h", "--help"])
        .unwrap()
        .description("Print help.");
    parser
        .add_key_value_arg(["-s", "--seconds"])
        .unwrap()
        .description("Seconds to wait.")
        .values_names(["INTEGER"])
        .store::<u64>()
        .unwrap();
    (parser, capture)
}

#[test]
fn scalar_value_after_key() {
    let (mut parser, capture) = seconds_parser();

    let status = parser.parse_args(["speed", "-s", "10"]);
    assert_eq!(status, ParseStatus::Completed);
    assert!(parser.was_found("-s"));
    assert!(parser.was_found("--seconds"));
    assert_eq!(parser.get_front_as::<u64>("-s"), Some(10));
    assert_eq!(parser.count_values_found("-s"), 1);
    assert_eq!(parser.stored::<u64>("-s"), Some(&10));
    assert!(!parser.has_errors());
    assert_eq!(capture.text(), "");
}

#[test]
fn assignment_operator_matches_separate_value() {
    let (mut parser, _) = seconds_parser();

    let _ = parser.parse_args(["speed", "-s=10"]);
    assert_eq!(parser.get_front_as::<u64>("-s"), Some(10));
    assert_eq!(parser.count_values_found("-s"), 1);

    let _ = parser.parse_args(["speed", "--seconds=7"]);
    assert_eq!(parser.stored::<u64>("--seconds"), Some(&7));
}

#[test]
fn invalid_number_is_reported_exactly() {
    let (mut parser, capture) = seconds_parser();

    let status = parser.parse_args(["speed", "--seconds", "4896K"]);
    assert_eq!(status, ParseStatus::Exit(1));
    assert!(parser.has_errors());
    assert!(parser.error_flags().contains(ParserErrorFlags::ARGS_ERROR));
    assert_eq!(parser.stored::<u64>("-s"), None);
    assert_eq!(capture.text(), "speed: --seconds: Invalid number '4896K'\n");
}

#[test]
fn errors_are_kept_when_printing_is_disabled() {
    let (mut parser, capture) = seconds_parser();
    parser.configure().print_errors(false);

    let status = parser.parse_args(["speed", "-s", "abc"]);
    assert_eq!(status, ParseStatus::Completed);
    assert!(parser.has_errors());
    assert_eq!(capture.text(), "");
    assert_eq!(parser.errors_text(), "speed: --seconds: Invalid number 'abc'\n");
}

#[test]
fn error_id_overrides_program_name() {
    let (mut parser, capture) = seconds_parser();
    parser.configure().error_id("speed-test");

    let _ = parser.parse_args(["speed", "-s", "x"]);
    assert_eq!(capture.text(), "speed-test: --seconds: Invalid number 'x'\n");
}

#[test]
fn grouped_short_keys_match_separate_keys() {
    let (mut parser, _) = new_parser();
    parser.add_key_arg(["-a"]).unwrap();
    parser.add_key_arg(["-b"]).unwrap();
    parser.add_key_arg(["-c"]).unwrap();

    let _ = parser.parse_args(["speed", "-ab"]);
    let grouped: Vec<bool> = ["-a", "-b", "-c"].iter().map(|k| parser.was_found(k)).collect();
    let _ = parser.parse_args(["speed", "-a", "-b"]);
    let separate: Vec<bool> = ["-a", "-b", "-c"].iter().map(|k| parser.was_found(k)).collect();

    assert_eq!(grouped, vec![true, true, false]);
    assert_eq!(grouped, separate);
}

#[test]
fn grouping_requires_every_character_to_be_known() {
    let (mut parser, _) = new_parser();
    parser.configure().pkill_after_printing_errors(false);
    parser.add_key_arg(["-a"]).unwrap();
    parser.add_key_arg(["-b"]).unwrap().grouping(false);

    let _ = parser.parse_args(["speed", "-az"]);
    assert!(!parser.was_found("-a"));
    assert_eq!(parser.unrecognized_args(), ["-az".to_string()]);

    let _ = parser.parse_args(["speed", "-ab"]);
    assert!(!parser.was_found("-a"));
    assert!(parser.error_flags().contains(ParserErrorFlags::UNRECOGNIZED_ARGS_ERROR));
}

#[test]
fn repeated_occurrences_fill_separate_groups() {
    let (mut parser, _) = new_parser();
    parser
        .add_key_value_arg(["-x"])
        .unwrap()
        .occurrences_range(0, 4)
        .unwrap()
        .store::<Vec<Vec<String>>>()
        .unwrap();

    let _ = parser.parse_args(["speed", "-x", "v1", "v2", "-x", "v3"]);
    assert!(!parser.has_errors());
    assert_eq!(parser.count_occurrences("-x"), 2);
    assert_eq!(parser.values_found("-x"), vec!["v1", "v2", "v3"]);
    assert_eq!(
        parser.stored::<Vec<Vec<String>>>("-x"),
        Some(&vec![
            vec!["v1".to_string(), "v2".to_string()],
            vec!["v3".to_string()],
        ])
    );
}

#[test]
fn flat_container_collects_every_occurrence() {
    let (mut parser, _) = new_parser();
    parser
        .add_key_value_arg(["-n", "--numbers"])
        .unwrap()
        .occurrences_range(1, 3)
        .unwrap()
        .store::<Vec<i32>>()
        .unwrap();

    let _ = parser.parse_args(["speed", "-n", "1", "-2", "--numbers", "3"]);
    assert!(!parser.has_errors());
    assert_eq!(parser.stored::<Vec<i32>>("-n"), Some(&vec![1, -2, 3]));
    assert_eq!(parser.get_at_as::<i32>("-n", 1), Some(-2));
}

#[test]
fn one_storage_per_value_position() {
    let (mut parser, _) = new_parser();
    parser
        .add_key_value_arg(["--size"])
        .unwrap()
        .store::<u32>()
        .unwrap()
        .store::<u32>()
        .unwrap();

    let _ = parser.parse_args(["speed", "--size", "640", "480"]);
    assert_eq!(parser.stored_at::<u32>("--size", 0), Some(&640));
    assert_eq!(parser.stored_at::<u32>("--size", 1), Some(&480));

    let err = parser
        .add_key_value_arg(["--list"])
        .unwrap()
        .store::<u32>()
        .unwrap()
        .store::<Vec<u32>>()
        .err();
    assert_eq!(err, Some(ConfigError::MultipleContainerTargets));
}

#[test]
fn positionals_take_tokens_in_declaration_order() {
    let (mut parser, _) = new_parser();
    parser.add_keyless_arg("SRC").unwrap().values_range(1, 3).unwrap();
    parser.add_keyless_arg("DST").unwrap();

    let _ = parser.parse_args(["speed", "a", "b", "c"]);
    assert!(!parser.has_errors());
    assert_eq!(parser.values_found("SRC"), vec!["a", "b"]);
    assert_eq!(parser.values_found("DST"), vec!["c"]);
}

#[test]
fn missing_positional_values_are_errors() {
    let (mut parser, capture) = new_parser();
    parser.configure().pkill_after_printing_errors(false);
    parser.add_keyless_arg("FIRST").unwrap();
    parser.add_keyless_arg("PAIR").unwrap().values_range(2, 2).unwrap();

    let status = parser.parse_args(["speed", "x", "y"]);
    assert_eq!(status, ParseStatus::Completed);
    assert!(parser.has_errors());
    assert_eq!(parser.values_found("FIRST"), vec!["x"]);
    assert_eq!(capture.text(), "speed: PAIR: Expected at least 2 values\n");

    let _ = parser.parse_args(["speed"]);
    assert!(parser.has_errors());
    assert!(parser.errors_text().contains("speed: FIRST: Argument is required\n"));
}

#[test]
fn extra_positional_tokens_are_unrecognized() {
    let (mut parser, capture) = new_parser();
    parser.configure().pkill_after_printing_errors(false);
    parser.add_keyless_arg("FILE").unwrap();

    let _ = parser.parse_args(["speed", "one", "two"]);
    assert_eq!(parser.values_found("FILE"), vec!["one"]);
    assert_eq!(parser.unrecognized_args(), ["two".to_string()]);
    assert_eq!(capture.text(), "speed: Unrecognized argument 'two'\n");
}

#[test]
fn mutually_exclusive_constraint() {
    let (mut parser, _) = new_parser();
    parser.configure().print_errors(false);
    for key in ["-a", "-b", "-c"] {
        parser.add_key_arg([key]).unwrap();
    }
    parser.add_mutually_exclusive_constraint(["-a", "-b", "-c"]).unwrap();

    let _ = parser.parse_args(["speed", "-a"]);
    assert!(!parser.error_flags().contains(ParserErrorFlags::ARGS_CONSTRAINTS_ERROR));

    let _ = parser.parse_args(["speed", "-a", "-b"]);
    assert!(parser.error_flags().contains(ParserErrorFlags::ARGS_CONSTRAINTS_ERROR));
    assert_eq!(
        parser.errors_text(),
        "speed: These arguments are mutually exclusive: -a, -b, -c\n"
    );
}

#[test]
fn at_least_one_found_constraint() {
    let (mut parser, _) = new_parser();
    parser.configure().print_errors(false);
    for key in ["-a", "-b", "-c"] {
        parser.add_key_arg([key]).unwrap();
    }
    parser.add_at_least_one_found_constraint(["-a", "-b", "-c"]).unwrap();

    let _ = parser.parse_args(["speed"]);
    assert!(parser.error_flags().contains(ParserErrorFlags::ARGS_CONSTRAINTS_ERROR));

    let _ = parser.parse_args(["speed", "-c"]);
    assert!(!parser.has_errors());

    assert_eq!(
        parser.add_at_least_one_found_constraint(["-a", "-z"]),
        Err(ConfigError::UnknownArgument("-z".to_string()))
    );
}

#[test]
fn help_output_is_aligned() {
    let (mut parser, capture) = seconds_parser();

    parser.print_help();
    let expected = format!(
        "Usage: speed [-h] [-s INTEGER]\n\
         \n\
         Options:\n  \
         -h, --help{}Print help.\n  \
         -s, --seconds INTEGER  Seconds to wait.\n",
        " ".repeat(13)
    );
    assert_eq!(capture.text(), expected);
}

#[test]
fn print_help_is_idempotent() {
    let (mut parser, capture) = seconds_parser();
    parser.add_keyless_arg("FILE").unwrap().description("Input file.");
    parser
        .help_menu("")
        .unwrap()
        .description("Wait a while.")
        .epilogue("Report bugs upstream.");

    parser.print_help();
    let first = capture.text();
    capture.clear();
    parser.print_help();
    assert_eq!(first, capture.text());
    assert!(first.contains("Values:\n"));
    assert!(first.ends_with("Report bugs upstream.\n"));
}

#[test]
fn help_key_prints_and_requests_exit() {
    let (mut parser, capture) = seconds_parser();
    parser.add_keyless_arg("FILE").unwrap();

    let status = parser.parse_args(["speed", "--help"]);
    assert_eq!(status, ParseStatus::Exit(0));
    assert!(status.is_exit());
    assert!(!parser.has_errors());
    assert_eq!(Some(capture.text()), parser.help_text(""));
}

#[test]
fn help_key_selects_named_menu() {
    let (mut parser, capture) = seconds_parser();
    parser
        .add_help_menu("advanced")
        .unwrap()
        .print(HelpMenuFlags::PRINT_USAGE, false);
    parser
        .add_key_arg(["--turbo"])
        .unwrap()
        .description("Go faster.")
        .help_menus(["advanced"])
        .unwrap();

    let _ = parser.parse_args(["speed", "-h", "advanced"]);
    assert_eq!(capture.text(), "Options:\n  --turbo  Go faster.\n");

    assert!(parser.add_help_menu("advanced").is_err());
    assert!(parser.add_key_arg(["-q"]).unwrap().help_menus(["missing"]).is_err());
}

#[test]
fn version_key_prints_version() {
    let (mut parser, capture) = new_parser();
    parser
        .add_version_arg(["-v", "--version"])
        .unwrap()
        .version("speed 1.0.0")
        .description("Print version.");

    let status = parser.parse_args(["speed", "-v", "--bogus"]);
    assert_eq!(status, ParseStatus::Exit(0));
    assert_eq!(capture.text(), "speed 1.0.0\n");
    assert!(parser.unrecognized_args().is_empty());
}

#[test]
fn subparser_consumes_the_rest() {
    let mut build = ArgParser::with_config(ParserConfig::default());
    build
        .configure()
        .pkill_after_printing_errors(false)
        .output(Box::new(io::sink()));
    build.add_key_arg(["-r", "--release"]).unwrap();

    let (mut parser, _) = new_parser();
    parser.add_key_arg(["-q"]).unwrap();
    parser.add_key_arg(["build"]).unwrap().subparser(build);

    let status = parser.parse_args(["speed", "build", "-r", "-q"]);
    assert_eq!(status, ParseStatus::Completed);
    assert!(parser.was_found("build"));
    assert!(!parser.was_found("-q"));

    let build = parser.active_subparser().unwrap();
    assert!(build.was_found("--release"));
    assert_eq!(build.program_name(), "speed build");
    assert!(build.has_errors());
    assert!(parser.subparser("build").is_some());
}

#[test]
fn presence_flags_and_actions() {
    let (mut parser, _) = new_parser();
    let verbose = Rc::new(Cell::new(false));
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    parser
        .add_key_arg(["-v"])
        .unwrap()
        .occurrences_range(0, 3)
        .unwrap()
        .store_presence(verbose.clone())
        .action(move || counter.set(counter.get() + 1));

    let _ = parser.parse_args(["speed", "-vvv"]);
    assert!(verbose.get());
    assert_eq!(calls.get(), 3);
    assert_eq!(parser.count_occurrences("-v"), 3);
}

#[test]
fn patterns_and_assertions_validate_values() {
    let (mut parser, _) = new_parser();
    parser.configure().print_errors(false);
    parser
        .add_key_value_arg(["--mode"])
        .unwrap()
        .patterns(["fast|slow"])
        .unwrap();
    parser
        .add_key_value_arg(["--port"])
        .unwrap()
        .assertion("Port out of range", |v| v.parse::<u16>().is_ok_and(|p| p >= 1024))
        .store::<u16>()
        .unwrap();

    let _ = parser.parse_args(["speed", "--mode", "fast", "--port", "8080"]);
    assert!(!parser.has_errors());

    let _ = parser.parse_args(["speed", "--mode", "faster", "--port", "80"]);
    assert_eq!(
        parser.errors_text(),
        "speed: --mode: Invalid format 'faster'\nspeed: --port: Port out of range '80'\n"
    );

    let err = parser.add_key_value_arg(["--bad"]).unwrap().patterns(["("]).err();
    assert!(matches!(err, Some(ConfigError::InvalidPattern { .. })));
}

#[test]
fn path_values_report_the_path() {
    let (mut parser, capture) = new_parser();
    parser
        .add_key_value_arg(["--dir"])
        .unwrap()
        .store::<ReadableDirectory>()
        .unwrap();

    let missing = std::env::temp_dir().join("speed-argparse-missing-dir");
    let missing = missing.to_string_lossy().into_owned();
    let status = parser.parse_args(["speed", "--dir", missing.as_str()]);
    assert_eq!(status, ParseStatus::Exit(1));
    assert_eq!(
        capture.text(),
        format!("speed: {missing}: No such file or directory\n")
    );

    let tmp = std::env::temp_dir().to_string_lossy().into_owned();
    let _ = parser.parse_args(["speed", "--dir", tmp.as_str()]);
    assert!(!parser.has_errors());
    assert!(parser.stored::<ReadableDirectory>("--dir").is_some());
}

#[test]
fn negative_numbers_are_values() {
    let (mut parser, _) = new_parser();
    parser.add_keyless_arg("OFFSET").unwrap().store::<i64>().unwrap();

    let _ = parser.parse_args(["speed", "-42"]);
    assert!(!parser.has_errors());
    assert_eq!(parser.stored::<i64>("OFFSET"), Some(&-42));
}

#[test]
fn terminal_value_argument_keeps_its_values() {
    let (mut parser, _) = new_parser();
    parser
        .add_key_value_arg(["--config"])
        .unwrap()
        .terminal(true)
        .store::<String>()
        .unwrap();
    parser.add_keyless_arg("FILE").unwrap();

    let status = parser.parse_args(["speed", "--config", "file.json", "ignored"]);
    assert_eq!(status, ParseStatus::Completed);
    assert_eq!(parser.values_found("--config"), vec!["file.json"]);
    assert_eq!(parser.stored::<String>("--config"), Some(&"file.json".to_string()));
    assert!(!parser.has_errors());

    let _ = parser.parse_args(["speed", "--config=other.json"]);
    assert_eq!(parser.stored::<String>("--config"), Some(&"other.json".to_string()));
}

#[test]
fn grouped_subparser_key_must_come_last() {
    let mut build = ArgParser::with_config(ParserConfig::default());
    build
        .configure()
        .pkill_after_printing_errors(false)
        .output(Box::new(io::sink()));
    build.add_key_arg(["-r"]).unwrap();

    let (mut parser, _) = new_parser();
    parser.configure().pkill_after_printing_errors(false);
    parser.add_key_arg(["-q"]).unwrap();
    parser.add_key_arg(["-b"]).unwrap().subparser(build);

    let _ = parser.parse_args(["speed", "-bq", "-r"]);
    assert!(!parser.was_found("-b"));
    assert!(!parser.was_found("-q"));
    assert_eq!(parser.unrecognized_args(), ["-bq".to_string(), "-r".to_string()]);

    let status = parser.parse_args(["speed", "-qb", "-r"]);
    assert_eq!(status, ParseStatus::Completed);
    assert!(parser.was_found("-q"));
    assert!(parser.was_found("-b"));
    assert!(parser.subparser("-b").unwrap().was_found("-r"));
}

#[test]
fn empty_token_is_not_a_help_menu_name() {
    let (mut parser, capture) = seconds_parser();

    let status = parser.parse_args(["speed", "-h", ""]);
    assert_eq!(status, ParseStatus::Exit(0));
    assert_eq!(parser.values_found("-h"), Vec::<&str>::new());
    assert_eq!(Some(capture.text()), parser.help_text(""));
}

#[test]
fn help_follows_printed_errors() {
    let (mut parser, capture) = seconds_parser();
    parser.configure().print_help_after_printing_errors(true);

    let status = parser.parse_args(["speed", "-s", "x"]);
    assert_eq!(status, ParseStatus::Exit(1));
    let help = parser.help_text("").unwrap();
    assert_eq!(
        capture.text(),
        format!("speed: --seconds: Invalid number 'x'\n{help}")
    );
}

#[test]
fn custom_prefixes_drive_parsing() {
    let (mut parser, _) = new_parser();
    parser
        .configure()
        .short_prefixes(["+"])
        .long_prefixes(["++"])
        .print_errors(false);
    parser.add_key_arg(["+a"]).unwrap();
    parser.add_key_arg(["+b"]).unwrap();
    parser
        .add_key_value_arg(["++size"])
        .unwrap()
        .store::<u32>()
        .unwrap();
    parser.add_keyless_arg("REST").unwrap();

    let _ = parser.parse_args(["speed", "+ab", "++size=3", "-x", "+q"]);
    assert!(parser.was_found("+a"));
    assert!(parser.was_found("+b"));
    assert_eq!(parser.stored::<u32>("++size"), Some(&3));
    assert_eq!(parser.values_found("REST"), vec!["-x"]);
    assert_eq!(parser.unrecognized_args(), ["+q".to_string()]);
}

#[test]
fn colored_error_lines_highlight_names() {
    let (mut parser, _) = new_parser();
    parser.configure().colors(true).print_errors(false);
    parser.add_key_arg(["-a"]).unwrap();
    parser.add_key_arg(["-b"]).unwrap();
    parser
        .add_key_value_arg(["-s"])
        .unwrap()
        .store::<u64>()
        .unwrap();
    parser.add_mutually_exclusive_constraint(["-a", "-b"]).unwrap();

    let _ = parser.parse_args(["speed", "-a", "-b", "-s", "x", "--bogus"]);
    let hl = |s: &str| format!("\x1b[1;31m{s}\x1b[0m");
    assert_eq!(
        parser.errors_text(),
        format!(
            "speed: Unrecognized argument '{}'\n\
             speed: {}: Invalid number 'x'\n\
             speed: These arguments are mutually exclusive: {}, {}\n",
            hl("--bogus"),
            hl("-s"),
            hl("-a"),
            hl("-b"),
        )
    );
}

#[test]
fn actions_fire_even_when_a_constraint_fails() {
    let (mut parser, _) = new_parser();
    parser.configure().print_errors(false);
    let fired = Rc::new(Cell::new(0));
    for key in ["-a", "-b"] {
        let fired = fired.clone();
        parser
            .add_key_arg([key])
            .unwrap()
            .action(move || fired.set(fired.get() + 1));
    }
    parser.add_mutually_exclusive_constraint(["-a", "-b"]).unwrap();

    let _ = parser.parse_args(["speed", "-a", "-b"]);
    assert!(parser.error_flags().contains(ParserErrorFlags::ARGS_CONSTRAINTS_ERROR));
    assert_eq!(fired.get(), 2);
}
