//! Global options shared by every command.
//!
//! Each option falls back to a `CANDIDATE_*` environment variable.

use candidate_core::db::{open_db, open_db_read_only};
use candidate_core::{default_log_level, init_logging, LogTarget};
use clap::Args;
use rusqlite::Connection;
use std::error::Error;
use std::path::PathBuf;

pub const DEFAULT_DATABASE: &str = "candidate.sqlite3";

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// SQLite database file
    #[arg(long, global = true, env = "CANDIDATE_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, global = true, env = "CANDIDATE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr when unset
    #[arg(long, global = true, env = "CANDIDATE_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl GlobalArgs {
    pub fn init_logging(&self) -> Result<(), String> {
        let level = self.log_level.as_deref().unwrap_or(default_log_level());
        let target = match &self.log_dir {
            Some(dir) => LogTarget::directory(dir)?,
            None => LogTarget::Stderr,
        };
        init_logging(level, target)
    }

    /// Opens the configured database with migrations applied.
    pub fn open_database(&self) -> Result<Connection, Box<dyn Error>> {
        Ok(open_db(&self.database)?)
    }

    /// Opens the configured database as it is, without creating or migrating it.
    pub fn open_database_read_only(&self) -> Result<Connection, Box<dyn Error>> {
        Ok(open_db_read_only(&self.database)?)
    }
}
