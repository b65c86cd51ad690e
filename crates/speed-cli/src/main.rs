use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use speed_argparse::{ArgParser, ConfigResult, HelpMenuFlags};
use tracing_subscriber::{EnvFilter, fmt};

const ABOUT: &str = "Wait for the given amount of time, then exit.";

fn main() -> Result<()> {
    init_tracing();
    let mut parser = build_parser().context("failed to declare arguments")?;
    parser.parse_env().exit_if_requested();

    let seconds = parser.stored::<u64>("--seconds").copied().unwrap_or(0);
    let minutes = parser.stored::<u64>("--minutes").copied().unwrap_or(0);
    let Some(total) = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
    else {
        bail!("duration of {minutes} minutes and {seconds} seconds is too long");
    };

    if parser.was_found("--dry-run") {
        println!("{total}");
        return Ok(());
    }

    tracing::debug!(total, "sleeping");
    thread::sleep(Duration::from_secs(total));
    tracing::debug!("done");
    Ok(())
}

fn build_parser() -> ConfigResult<ArgParser> {
    let mut parser = ArgParser::new();
    parser.configure().program_name("speed");
    parser.help_menu("")?.description(ABOUT).epilogue(
        "SECONDS and MINUTES add up. Use -n to print the total instead of waiting.",
    );
    parser
        .add_help_menu("examples")?
        .flags(HelpMenuFlags::PRINT_DESCRIPTION)
        .description("speed -s 10\nspeed -m 1 -s 30\nspeed -n -m 2");

    parser
        .add_help_arg(["-h", "--help"])?
        .description("Print this help menu, or the menu named after it (examples).");
    parser
        .add_version_arg(["-v", "--version"])?
        .version(format!("speed {}", env!("CARGO_PKG_VERSION")))
        .description("Print the version.");
    parser
        .add_key_value_arg(["-s", "--seconds"])?
        .description("Seconds to wait.")
        .values_names(["INTEGER"])
        .store::<u64>()?;
    parser
        .add_key_value_arg(["-m", "--minutes"])?
        .description("Minutes to wait.")
        .values_names(["INTEGER"])
        .store::<u64>()?;
    parser
        .add_key_arg(["-n", "--dry-run"])?
        .description("Print the total number of seconds and exit.");
    parser.add_at_least_one_found_constraint(["--seconds", "--minutes"])?;

    Ok(parser)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
