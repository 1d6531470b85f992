use crate::commands::dispatch::FailurePolicy;
use crate::commands::request::{self, Request};
use crate::shared::catalog;
use crate::shared::session::{
    DEFAULT_MAX_LINES, DEFAULT_POLL_MS, DEFAULT_READ_CHUNK_BYTES, DEFAULT_SETTLE_MS,
    ExchangeSettings,
};
use anyhow::Result;
use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

// CLI root definition. Exactly one request intent is accepted per run.
#[derive(Parser, Debug)]
#[command(name = "perdctl", disable_version_flag = true)]
#[command(about = "Query and configure a PERD* GNSS timing receiver over a serial link")]
#[command(after_long_help = catalog::long_help())]
#[command(group(
    ArgGroup::new("request")
        .required(true)
        .args(["query", "execute", "set_baud", "request_version"])
))]
pub struct Cli {
    /// Serial port to use; discovered from the USB bridge when omitted
    #[arg(short = 'D', long = "device", visible_short_alias = 'p', env = "PERDCTL_PORT")]
    pub port: Option<String>,
    /// Baud rate of the serial link
    #[arg(short = 's', long, default_value_t = 38_400)]
    pub baud_rate: u32,
    /// Comma-separated API/CFG/SYS command names to query, e.g. GNSS,FIXMASK
    #[arg(short = 'g', long, value_name = "COMMANDS")]
    pub query: Option<String>,
    /// Comma-separated commands with space-separated parameters, e.g. "PPS 1,RESTART 0"
    #[arg(short = 'z', long, value_name = "COMMANDS")]
    pub execute: Option<String>,
    /// Send a UART1 sentence switching the receiver to this baud rate
    #[arg(short = 'S', long, value_name = "BAUD", value_parser = clap::value_parser!(u32).range(1..))]
    pub set_baud: Option<u32>,
    /// Request the receiver software version (SYS VERSION)
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    pub request_version: bool,
    /// Print the sentences without opening the serial port
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
    /// Continue a batch after a failed entry and report failures at the end
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,
    /// Hold an exclusive lock on this file while talking to the receiver
    #[arg(long)]
    pub lock_file: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_SETTLE_MS)]
    pub settle_ms: u64,
    #[arg(long, default_value_t = DEFAULT_READ_CHUNK_BYTES)]
    pub read_chunk_bytes: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_LINES)]
    pub max_lines: usize,
    #[arg(long, default_value_t = DEFAULT_POLL_MS)]
    pub poll_ms: u64,
}

impl Cli {
    // Turn the single selected intent into its ordered list of requests.
    pub fn requests(&self) -> Result<Vec<Request>> {
        if let Some(list) = &self.query {
            return request::query_requests(list);
        }
        if let Some(list) = &self.execute {
            return request::execute_requests(list);
        }
        if let Some(baud_rate) = self.set_baud {
            return Ok(vec![request::baud_update_request(baud_rate)]);
        }
        Ok(vec![request::version_request()])
    }

    pub fn exchange_settings(&self) -> ExchangeSettings {
        ExchangeSettings {
            settle: Duration::from_millis(self.settle_ms),
            read_chunk_bytes: self.read_chunk_bytes.max(1),
            max_lines: self.max_lines,
            poll: Duration::from_millis(self.poll_ms.max(1)),
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::FailFast
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("perdctl").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_intent_is_a_usage_error() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn intents_are_mutually_exclusive() {
        let err = parse(&["-g", "GNSS", "-V"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn defaults_match_receiver_factory_settings() {
        let cli = parse(&["-V"]).unwrap();
        assert_eq!(cli.baud_rate, 38_400);
        assert_eq!(cli.failure_policy(), FailurePolicy::FailFast);
        let settings = cli.exchange_settings();
        assert_eq!(settings.settle, Duration::from_millis(500));
        assert_eq!(settings.read_chunk_bytes, 128);
        assert_eq!(settings.max_lines, 10);
        assert_eq!(cli.requests().unwrap(), vec![request::version_request()]);
    }

    #[test]
    fn query_flag_builds_query_requests() {
        let cli = parse(&["-D", "/dev/ttyUSB1", "-s", "115200", "-g", "GNSS"]).unwrap();
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(cli.baud_rate, 115_200);
        let requests = cli.requests().unwrap();
        assert_eq!(requests[0].fields, vec!["PERDAPI", "GNSS", "QUERY"]);
    }

    #[test]
    fn p_is_an_alias_for_device() {
        let cli = parse(&["-p", "COM4", "-V"]).unwrap();
        assert_eq!(cli.port.as_deref(), Some("COM4"));
    }

    #[test]
    fn set_baud_must_be_a_positive_integer() {
        let cli = parse(&["-S", "115200"]).unwrap();
        assert_eq!(cli.requests().unwrap(), vec![request::baud_update_request(115_200)]);

        assert_eq!(parse(&["-S", "fast"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["-S", "0"]).unwrap_err().kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn keep_going_selects_lenient_policy() {
        let cli = parse(&["--keep-going", "-z", "PPS 1,RESTART 0"]).unwrap();
        assert_eq!(cli.failure_policy(), FailurePolicy::KeepGoing);
        assert_eq!(cli.requests().unwrap().len(), 2);
    }

    #[test]
    fn long_help_carries_the_command_catalog() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("FLASHBACKUP"));
        assert!(help.contains("NMEAOUT,Type,Interval"));
    }
}
