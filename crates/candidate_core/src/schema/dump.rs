//! Table-structure dump.
//!
//! # Responsibility
//! - Print the platform, the table list and each table's columns.
//! - Write one `<table>.sql` file per table unless running dry.
//!
//! # Invariants
//! - A dry run never touches the filesystem.
//! - Files are written only after the table's report has been printed.
//! - Every file lands directly inside the target directory; a table whose
//!   name could resolve elsewhere aborts the dump before anything is written.

use super::{Column, SchemaError, SchemaInspector, SchemaResult, Table};
use log::info;
use rusqlite::Connection;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Directory used when the caller does not pick one.
pub const DEFAULT_DUMP_DIRECTORY: &str = "resources/sql";

const DRY_RUN_HEADER: &str = " (dry run only)";
const COLUMN_HEADERS: [&str; 4] = ["column", "type", "length", "not null"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    pub directory: PathBuf,
    pub dry_run: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DUMP_DIRECTORY),
            dry_run: false,
        }
    }
}

/// What a dump saw and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpReport {
    pub tables: Vec<String>,
    pub written: Vec<PathBuf>,
}

/// Dumps every user table of `conn`, reporting progress to `out`.
///
/// # Errors
/// - `SchemaError::Db` when metadata cannot be read.
/// - `SchemaError::UnsafeTableName` when a table name cannot be used as a
///   file name inside the target directory.
/// - `SchemaError::Write` when a dump file or its directory cannot be written.
/// - `SchemaError::Output` when `out` rejects the report.
pub fn dump_tables(
    conn: &Connection,
    options: &DumpOptions,
    out: &mut dyn Write,
) -> SchemaResult<DumpReport> {
    let started_at = Instant::now();
    info!(
        "event=dump_tables module=schema status=start dry_run={} directory={}",
        options.dry_run,
        options.directory.display()
    );

    let inspector = SchemaInspector::new(conn);
    let platform = inspector.platform()?;

    writeln!(out)?;
    write!(out, "Dumping the table structures")?;
    if options.dry_run {
        write!(out, "{DRY_RUN_HEADER}")?;
    }
    writeln!(out)?;
    writeln!(out, "Platform: {}", platform.name)?;

    let tables = inspector.list_tables()?;
    let table_rows = tables
        .iter()
        .map(|table| vec![table.name.clone()])
        .collect::<Vec<_>>();
    render_table(out, &["tables"], &table_rows)?;
    writeln!(out)?;

    let targets = if options.dry_run {
        None
    } else {
        let file_names = tables
            .iter()
            .map(dump_file_name)
            .collect::<SchemaResult<Vec<_>>>()?;
        Some((prepare_directory(&options.directory)?, file_names))
    };

    let mut written = Vec::new();
    for (index, table) in tables.iter().enumerate() {
        writeln!(out, "{}", table.name)?;
        let column_rows = table.columns.iter().map(column_row).collect::<Vec<_>>();
        render_table(out, &COLUMN_HEADERS, &column_rows)?;
        writeln!(out)?;

        if let Some((directory, file_names)) = &targets {
            let path = write_table_file(&directory.join(&file_names[index]), table)?;
            writeln!(out, "Writing {}", path.display())?;
            written.push(path);
        }
    }
    writeln!(out)?;

    info!(
        "event=dump_tables module=schema status=ok platform={} version={} tables={} written={} duration_ms={}",
        platform.name,
        platform.version,
        tables.len(),
        written.len(),
        started_at.elapsed().as_millis()
    );

    Ok(DumpReport {
        tables: tables.into_iter().map(|table| table.name).collect(),
        written,
    })
}

fn prepare_directory(directory: &Path) -> SchemaResult<PathBuf> {
    std::fs::create_dir_all(directory).map_err(|source| SchemaError::Write {
        path: directory.to_path_buf(),
        source,
    })?;
    Ok(directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf()))
}

/// `<table>.sql`, provided the name stays a single plain path component.
fn dump_file_name(table: &Table) -> SchemaResult<String> {
    let name = table.name.as_str();
    if name.is_empty() || name.contains("..") || name.contains(['/', '\\', '\0']) {
        return Err(SchemaError::UnsafeTableName(table.name.clone()));
    }
    Ok(format!("{name}.sql"))
}

fn write_table_file(path: &Path, table: &Table) -> SchemaResult<PathBuf> {
    std::fs::write(path, table.create_sql()).map_err(|source| SchemaError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "event=dump_table_written module=schema status=ok table={} path={}",
        table.name,
        path.display()
    );
    Ok(path.to_path_buf())
}

fn column_row(column: &Column) -> Vec<String> {
    vec![
        column.name.clone(),
        column.column_type.clone(),
        column.length.map(|len| len.to_string()).unwrap_or_default(),
        column.not_null.to_string(),
    ]
}

/// Renders a bordered plain-text table sized to its widest cells.
fn render_table(out: &mut dyn Write, headers: &[&str], rows: &[Vec<String>]) -> std::io::Result<()> {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{border}+");

    writeln!(out, "{border}")?;
    write_row(out, &widths, headers.iter().copied())?;
    writeln!(out, "{border}")?;
    for row in rows {
        write_row(out, &widths, row.iter().map(String::as_str))?;
    }
    writeln!(out, "{border}")
}

fn write_row<'a>(
    out: &mut dyn Write,
    widths: &[usize],
    mut cells: impl Iterator<Item = &'a str>,
) -> std::io::Result<()> {
    let mut line = String::from("|");
    for width in widths {
        let cell = cells.next().unwrap_or("");
        let padding = width - cell.chars().count().min(*width);
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(padding));
        line.push_str(" |");
    }
    writeln!(out, "{line}")
}
