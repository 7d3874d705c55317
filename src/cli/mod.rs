//! Command-line interface for milelog.
//!
//! Argument parsing only. Each subcommand maps onto one function in
//! [`crate::ops`]; `main` does the dispatch.

use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use crate::entries::RemoveTarget;
use crate::ops::FindOptions;
use crate::render::OutputFormat;
use clap::{Parser, Subcommand};

/// Mirror your dailymile training log locally and search it offline
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// User to act on, overriding MILELOG_USER and the saved default
    #[clap(short = 'u', long, global = true)]
    pub user: Option<String>,

    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log format for stderr
    #[clap(long, global = true, value_name = "FORMAT", default_value = LOG_FORMAT_TEXT,
           value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch new entries from the API into the local store
    Sync,

    /// Search the local store
    Find {
        /// Relative range such as "today", "last week" or "this year"
        #[clap(value_name = "RANGE")]
        range: Vec<String>,

        /// First day to include (YYYY-MM-DD, YYYYMMDD or yy/m/d)
        #[clap(short = 's', long)]
        start: Option<String>,

        /// Last day to include (YYYY-MM-DD, YYYYMMDD or yy/m/d)
        #[clap(short = 'e', long)]
        end: Option<String>,

        /// Regex matched against message, workout title and felt; "*" matches all
        #[clap(short = 'p', long)]
        pattern: Option<String>,

        /// Output format: tsv or json
        #[clap(short = 'f', long, default_value_t = OutputFormat::Tsv)]
        format: OutputFormat,
    },

    /// Remove an entry from the local store ("last" or an entry id)
    Rm {
        #[clap(value_name = "TARGET")]
        target: RemoveTarget,
    },

    /// Show the current user, or set the default user
    User {
        #[clap(value_name = "NAME")]
        name: Option<String>,
    },
}

impl Command {
    /// Collects the `find` arguments into [`FindOptions`]; `None` for other commands.
    pub fn find_options(&self) -> Option<FindOptions> {
        match self {
            Command::Find {
                range,
                start,
                end,
                pattern,
                ..
            } => Some(FindOptions {
                range: if range.is_empty() {
                    None
                } else {
                    Some(range.join(" "))
                },
                start: start.clone(),
                end: end.clone(),
                pattern: pattern.clone(),
            }),
            _ => None,
        }
    }
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        <CliArgs as Parser>::parse()
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == LOG_FORMAT_JSON
    }
}
