use super::{ARG_BASE, base_arg};
use crate::guard::LOGIN_PATH;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

pub const SUBCOMMAND: &str = "navigate";
pub const ARG_TO: &str = "to";
pub const ARG_FROM: &str = "from";
pub const ARG_STORAGE: &str = "storage";
pub const ARG_PUBLIC: &str = "public";
pub const ARG_REDIRECT_TO: &str = "redirect-to";

#[derive(Debug, Clone)]
pub struct Options {
    pub to: String,
    pub from: String,
    pub storage: PathBuf,
    pub public_paths: Vec<String>,
    pub redirect_to: String,
    pub base: String,
}

impl Options {
    /// Parse `navigate` arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read = |id: &str| -> anyhow::Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            to: read(ARG_TO)?,
            from: read(ARG_FROM)?,
            storage: PathBuf::from(read(ARG_STORAGE)?),
            public_paths: matches
                .get_many::<String>(ARG_PUBLIC)
                .map(|values| values.cloned().collect())
                .unwrap_or_else(|| vec![LOGIN_PATH.to_string()]),
            redirect_to: read(ARG_REDIRECT_TO)?,
            base: read(ARG_BASE)?,
        })
    }
}

#[must_use]
pub fn command() -> Command {
    Command::new(SUBCOMMAND)
        .about("Run a navigation through the guard and print where it lands")
        .arg(
            Arg::new(ARG_TO)
                .long(ARG_TO)
                .help("Browser URL to navigate to, e.g. /conversations/42")
                .required(true),
        )
        .arg(
            Arg::new(ARG_FROM)
                .long(ARG_FROM)
                .help("Browser URL the navigation starts from")
                .default_value("/"),
        )
        .arg(
            Arg::new(ARG_STORAGE)
                .short('s')
                .long(ARG_STORAGE)
                .help("JSON file acting as client-local storage")
                .default_value("wasatext-storage.json")
                .env("WASATEXT_STORAGE"),
        )
        .arg(
            Arg::new(ARG_PUBLIC)
                .long(ARG_PUBLIC)
                .help("Path reachable without a token (repeatable)")
                .action(ArgAction::Append)
                .default_value(LOGIN_PATH),
        )
        .arg(
            Arg::new(ARG_REDIRECT_TO)
                .long(ARG_REDIRECT_TO)
                .help("Where unauthenticated visitors are sent")
                .default_value(LOGIN_PATH),
        )
        .arg(base_arg())
}
