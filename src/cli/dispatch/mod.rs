//! Map parsed CLI arguments to the action to run.

use crate::cli::actions::{Action, navigate, serve};
use crate::cli::commands;
use anyhow::{Result, bail};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or no subcommand was given.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((commands::serve::SUBCOMMAND, sub)) => {
            let options = commands::serve::Options::parse(sub)?;
            Ok(Action::Serve(serve::Args {
                port: options.port,
                backend: options.backend,
                dist: options.dist,
                base: options.base,
            }))
        }
        Some((commands::navigate::SUBCOMMAND, sub)) => {
            let options = commands::navigate::Options::parse(sub)?;
            Ok(Action::Navigate(navigate::Args {
                to: options.to,
                from: options.from,
                storage: options.storage,
                public_paths: options.public_paths,
                redirect_to: options.redirect_to,
                base: options.base,
            }))
        }
        Some((other, _)) => bail!("unknown subcommand: {other}"),
        None => bail!("missing subcommand"),
    }
}
