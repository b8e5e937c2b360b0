//! `dump:tables` command

use crate::config::GlobalArgs;
use candidate_core::schema::DEFAULT_DUMP_DIRECTORY;
use candidate_core::{dump_tables, DumpOptions};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DumpTablesArgs {
    /// Where to dump the sql
    #[arg(short, long, default_value = DEFAULT_DUMP_DIRECTORY)]
    pub directory: PathBuf,

    /// Display tables only
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(global: &GlobalArgs, args: DumpTablesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = global.open_database_read_only()?;
    let options = DumpOptions {
        directory: args.directory,
        dry_run: args.dry_run,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dump_tables(&conn, &options, &mut out)?;
    Ok(())
}
