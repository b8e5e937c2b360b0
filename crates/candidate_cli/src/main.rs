//! Candidate profile command-line tool.
//!
//! # Responsibility
//! - Parse global options and dispatch to one command.
//! - Bootstrap logging before any command touches storage.

use clap::{Parser, Subcommand};

mod commands;
mod config;

use config::GlobalArgs;

#[derive(Debug, Parser)]
#[command(name = "candidate", version)]
#[command(about = "Candidate profile management utilities", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Dump the current database table structures to a directory
    #[command(name = "dump:tables")]
    DumpTables(commands::dump_tables::DumpTablesArgs),
    /// Show one member and their age
    #[command(name = "member:show")]
    MemberShow(commands::member::ShowArgs),
    /// List members, optionally filtered by username
    #[command(name = "member:list")]
    MemberList(commands::member::ListArgs),
    /// Count members, optionally filtered by username
    #[command(name = "member:count")]
    MemberCount(commands::member::CountArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.global.init_logging() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::DumpTables(args) => commands::dump_tables::execute(&cli.global, args),
        Commands::MemberShow(args) => commands::member::show(&cli.global, args),
        Commands::MemberList(args) => commands::member::list(&cli.global, args),
        Commands::MemberCount(args) => commands::member::count(&cli.global, args),
    };

    if let Err(e) = result {
        log::error!("event=command module=cli status=error error={e}");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_dump_tables_with_defaults() {
        let cli = Cli::try_parse_from(["candidate", "dump:tables"]).unwrap();
        match cli.command {
            Commands::DumpTables(args) => {
                assert_eq!(args.directory, PathBuf::from("resources/sql"));
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_dump_tables_options() {
        let cli = Cli::try_parse_from([
            "candidate",
            "--database",
            "/tmp/members.sqlite3",
            "dump:tables",
            "-d",
            "/tmp/out",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.global.database, PathBuf::from("/tmp/members.sqlite3"));
        match cli.command {
            Commands::DumpTables(args) => {
                assert_eq!(args.directory, PathBuf::from("/tmp/out"));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_member_list_paging() {
        let cli = Cli::try_parse_from([
            "candidate",
            "member:list",
            "--search",
            "ann",
            "--offset",
            "5",
            "--limit",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::MemberList(args) => {
                assert_eq!(args.search.as_deref(), Some("ann"));
                assert_eq!(args.offset, 5);
                assert_eq!(args.limit, Some(10));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn member_show_rejects_malformed_as_of() {
        let result = Cli::try_parse_from(["candidate", "member:show", "alice", "--as-of", "soon"]);
        assert!(result.is_err());
    }
}
