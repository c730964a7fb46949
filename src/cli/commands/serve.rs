use super::{ARG_BASE, base_arg};
use crate::proxy::DEFAULT_BACKEND;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const SUBCOMMAND: &str = "serve";
pub const ARG_PORT: &str = "port";
pub const ARG_BACKEND: &str = "backend";
pub const ARG_DIST: &str = "dist";

#[derive(Debug, Clone)]
pub struct Options {
    pub port: u16,
    pub backend: String,
    pub dist: PathBuf,
    pub base: String,
}

impl Options {
    /// Parse `serve` arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_required = |id: &str| -> anyhow::Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(5173),
            backend: read_required(ARG_BACKEND)?,
            dist: PathBuf::from(read_required(ARG_DIST)?),
            base: matches
                .get_one::<String>(ARG_BASE)
                .cloned()
                .unwrap_or_else(|| "/".to_string()),
        })
    }
}

#[must_use]
pub fn command() -> Command {
    Command::new(SUBCOMMAND)
        .about("Serve the built web UI and forward API calls to the backend")
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("5173")
                .env("WASATEXT_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_BACKEND)
                .short('b')
                .long(ARG_BACKEND)
                .help("Backend origin for /session, /users and /conversations")
                .default_value(DEFAULT_BACKEND)
                .env("WASATEXT_BACKEND_URL"),
        )
        .arg(
            Arg::new(ARG_DIST)
                .short('d')
                .long(ARG_DIST)
                .help("Directory with the built web UI (index.html and assets)")
                .default_value("webui/dist")
                .env("WASATEXT_DIST"),
        )
        .arg(base_arg())
}
