//! Live schema introspection and table-structure export.
//!
//! # Responsibility
//! - Read table, column and index metadata from the connected database.
//! - Export each table's CREATE statements to `<table>.sql` files.
//!
//! # Invariants
//! - Only user tables are reported; `sqlite_*` internals are skipped.
//! - Tables are reported in name order.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod dump;

pub use dump::{dump_tables, DumpOptions, DumpReport, DEFAULT_DUMP_DIRECTORY};

static SIZED_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_ ]*?)\s*\(\s*(\d+)\s*\)\s*$")
        .expect("sized type pattern must compile")
});

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug)]
pub enum SchemaError {
    Db(DbError),
    /// Writing a dump file failed.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writing the human-readable report failed.
    Output(std::io::Error),
    /// The table name would place its dump file outside the target directory.
    UnsafeTableName(String),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Write { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
            Self::Output(err) => write!(f, "failed to write report: {err}"),
            Self::UnsafeTableName(name) => {
                write!(f, "table name {name:?} cannot be used as a dump file name")
            }
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Write { source, .. } => Some(source),
            Self::Output(err) => Some(err),
            Self::UnsafeTableName(_) => None,
        }
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

/// Database engine identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub name: &'static str,
    pub version: String,
}

/// One column as declared in the live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Declared type without its size suffix, e.g. `VARCHAR` for `VARCHAR(255)`.
    pub column_type: String,
    pub length: Option<u32>,
    pub not_null: bool,
    pub primary_key: bool,
}

/// One user table and the statements that recreate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    /// CREATE TABLE first, then explicit CREATE INDEX statements.
    pub create_statements: Vec<String>,
}

impl Table {
    /// Joins the create statements into one SQL script.
    pub fn create_sql(&self) -> String {
        let mut sql = self
            .create_statements
            .iter()
            .map(|stmt| format!("{};", stmt.trim().trim_end_matches(';')))
            .collect::<Vec<_>>()
            .join("\n\n");
        sql.push('\n');
        sql
    }
}

/// Reads schema metadata from a SQLite connection.
pub struct SchemaInspector<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SchemaInspector<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn platform(&self) -> SchemaResult<Platform> {
        let version: String = self
            .conn
            .query_row("SELECT sqlite_version();", [], |row| row.get(0))?;
        Ok(Platform {
            name: "sqlite",
            version,
        })
    }

    pub fn list_tables(&self) -> SchemaResult<Vec<Table>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, sql
             FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
             ORDER BY name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tables = Vec::new();

        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let create_table: String = row.get(1)?;

            let mut create_statements = vec![create_table];
            create_statements.extend(self.index_statements(&name)?);

            tables.push(Table {
                columns: self.columns(&name)?,
                name,
                create_statements,
            });
        }

        Ok(tables)
    }

    fn columns(&self, table: &str) -> SchemaResult<Vec<Column>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({});", quote_identifier(table)))?;
        let mut rows = stmt.query([])?;
        let mut columns = Vec::new();

        while let Some(row) = rows.next()? {
            let declared: String = row.get("type")?;
            let (column_type, length) = split_declared_type(&declared);
            columns.push(Column {
                name: row.get("name")?,
                column_type,
                length,
                not_null: row.get::<_, i64>("notnull")? != 0,
                primary_key: row.get::<_, i64>("pk")? != 0,
            });
        }

        Ok(columns)
    }

    fn index_statements(&self, table: &str) -> SchemaResult<Vec<String>> {
        // Automatic indexes (primary keys, UNIQUE) have NULL sql.
        let mut stmt = self.conn.prepare(
            "SELECT sql
             FROM sqlite_master
             WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL
             ORDER BY name ASC;",
        )?;
        let statements = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statements)
    }
}

fn split_declared_type(declared: &str) -> (String, Option<u32>) {
    if let Some(captures) = SIZED_TYPE.captures(declared) {
        let length = captures[2].parse::<u32>().ok();
        return (captures[1].to_ascii_uppercase(), length);
    }
    (declared.trim().to_ascii_uppercase(), None)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::{quote_identifier, split_declared_type, Table};

    #[test]
    fn split_declared_type_extracts_length() {
        assert_eq!(
            split_declared_type("varchar(255)"),
            ("VARCHAR".to_string(), Some(255))
        );
        assert_eq!(
            split_declared_type("CHARACTER VARYING ( 32 )"),
            ("CHARACTER VARYING".to_string(), Some(32))
        );
        assert_eq!(split_declared_type("INTEGER"), ("INTEGER".to_string(), None));
        assert_eq!(
            split_declared_type("DECIMAL(10,2)"),
            ("DECIMAL(10,2)".to_string(), None)
        );
        assert_eq!(split_declared_type(""), (String::new(), None));
    }

    #[test]
    fn quote_identifier_doubles_embedded_quotes() {
        assert_eq!(quote_identifier("members"), "\"members\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn create_sql_terminates_each_statement() {
        let table = Table {
            name: "t".to_string(),
            columns: Vec::new(),
            create_statements: vec![
                "CREATE TABLE t (a INTEGER)".to_string(),
                "CREATE INDEX idx_t_a ON t (a);".to_string(),
            ],
        };
        assert_eq!(
            table.create_sql(),
            "CREATE TABLE t (a INTEGER);\n\nCREATE INDEX idx_t_a ON t (a);\n"
        );
    }
}
