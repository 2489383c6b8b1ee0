//! Command-line surface.

use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use switchres_display::Resolution;
use switchres_watchdog::{Condition, PollPolicy};

const AFTER_HELP: &str = "\
  - check-script: shell script that determines if resolution should stay changed or revert back
  - time-step:    how often (in seconds) check-script is run
  - no-quit:      don't quit if check-script failed once";

#[derive(Debug, Parser)]
#[command(name = "switch-res")]
#[command(version, about = "Switch the primary display's resolution")]
#[command(override_usage = "switch-res 1234x567 [-c|--check script] [-n|--no-quit] [-t|--time-step 10]\n       switch-res -l|--list [--json]")]
#[command(after_help = AFTER_HELP)]
#[command(arg_required_else_help = true, args_override_self = true)]
pub struct Cli {
    /// Requested resolution, e.g. 1920x1080
    #[arg(value_name = "WIDTHxHEIGHT")]
    pub resolution: Option<Resolution>,

    /// Shell command re-run every time step; exit status 0 keeps the resolution
    #[arg(short = 'c', long = "check", value_name = "SCRIPT", allow_hyphen_values = true)]
    pub check: Option<String>,

    /// Revert and keep watching when the check fails instead of quitting
    #[arg(short = 'n', long = "no-quit")]
    pub no_quit: bool,

    /// Seconds between checks
    #[arg(
        short = 't',
        long = "time-step",
        value_name = "SECONDS",
        default_value_t = 10,
        value_parser = parse_time_step
    )]
    pub time_step: u64,

    /// List the modes matching the current aspect ratio (current marked with *)
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Print the --list output as JSON
    #[arg(long = "json", requires = "list")]
    pub json: bool,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse the process arguments.
    ///
    /// Help and version requests become `Err(ExitCode::SUCCESS)` after
    /// printing; every other parse error is printed and becomes exit 1.
    pub fn parse_args() -> Result<Self, ExitCode> {
        Self::try_parse().map_err(report_parse_error)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::default()
            .with_interval(Duration::from_secs(self.time_step))
            .with_quit_on_failure(!self.no_quit)
            .with_condition(Condition::from_script(self.check.clone()))
    }
}

fn report_parse_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            println!("{}", Cli::command().render_help());
            ExitCode::SUCCESS
        }
        _ => {
            let _ = err.print();
            ExitCode::FAILURE
        }
    }
}

fn parse_time_step(value: &str) -> Result<u64, String> {
    let not_positive = || format!("Time step is not a positive integer: {}", value);

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_positive());
    }
    match value.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(not_positive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("switch-res").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_one_shot() {
        let cli = parse(&["1920x1080"]).unwrap();
        let policy = cli.poll_policy();

        assert_eq!(cli.resolution, Some(Resolution::new(1920, 1080)));
        assert_eq!(policy.interval, Duration::from_secs(10));
        assert!(policy.quit_on_failure);
        assert_eq!(policy.condition, Condition::Always);
    }

    #[test]
    fn test_watch_flags() {
        let cli = parse(&["1280x720", "-c", "test -f /tmp/flag", "--no-quit", "-t", "1"]).unwrap();
        let policy = cli.poll_policy();

        assert_eq!(policy.interval, Duration::from_secs(1));
        assert!(!policy.quit_on_failure);
        assert_eq!(policy.condition, Condition::Command("test -f /tmp/flag".to_string()));
    }

    #[test]
    fn test_last_check_wins() {
        let cli = parse(&["1280x720", "-c", "false", "--check", "true"]).unwrap();
        assert_eq!(cli.check.as_deref(), Some("true"));
    }

    #[test]
    fn test_list_without_resolution() {
        let cli = parse(&["--list", "--json"]).unwrap();
        assert!(cli.list && cli.json);
        assert_eq!(cli.resolution, None);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(parse(&["abcx100"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["100x"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["1920x1080", "-t", "abc"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["1920x1080", "-t", "0"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["1920x1080", "--bogus"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert!(parse(&["1920x1080", "-c"]).is_err());
        assert!(parse(&["--json"]).is_err());
    }

    #[test]
    fn test_parse_time_step() {
        assert_eq!(parse_time_step("15"), Ok(15));
        assert!(parse_time_step("").is_err());
        assert!(parse_time_step("-1").is_err());
        assert!(parse_time_step("1.5").is_err());
        assert!(parse_time_step("0").is_err());
    }
}
