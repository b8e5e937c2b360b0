//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide add/update/remove/find/search/count APIs over `members` storage.
//! - Map between `Member` values and table rows.
//!
//! # Invariants
//! - Write paths call `Member::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is `username ASC` so offset pagination is stable.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::member::Member;
use crate::model::value::{Address, Email, Height, MemberValidationError, Weight};
use chrono::DateTime;
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MEMBERS_TABLE: &str = "members";

const MEMBER_COLUMNS: [&str; 13] = [
    "username",
    "password",
    "country",
    "province",
    "city",
    "postal_code",
    "date_of_birth",
    "limits",
    "height",
    "weight",
    "body_type",
    "ethnicity",
    "email",
];

const MEMBER_SELECT_SQL: &str = "SELECT
    username,
    password,
    country,
    province,
    city,
    postal_code,
    date_of_birth,
    limits,
    height,
    weight,
    body_type,
    ethnicity,
    email
FROM members";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for member persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(MemberValidationError),
    Db(DbError),
    NotFound(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(username) => write!(f, "member not found: {username}"),
            Self::InvalidData(message) => write!(f, "invalid persisted member data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MemberValidationError> for RepoError {
    fn from(value: MemberValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage port for member records.
///
/// Mutating calls return the number of affected rows.
pub trait MemberRepository {
    fn add(&self, member: &Member) -> RepoResult<usize>;
    /// Replaces every stored column of the member with the same username.
    fn update(&self, member: &Member) -> RepoResult<usize>;
    fn remove(&self, member: &Member) -> RepoResult<usize>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<Member>>;
    /// Members whose username contains `keyword`.
    fn search(&self, keyword: &str, offset: u32, limit: Option<u32>) -> RepoResult<Vec<Member>>;
    /// Number of members `search` would match without pagination.
    fn search_count(&self, keyword: &str) -> RepoResult<u64>;
    fn count(&self) -> RepoResult<u64>;
    fn find_all(&self, offset: u32, limit: Option<u32>) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `members`
    ///   shape does not match the row mapping.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_member_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn add(&self, member: &Member) -> RepoResult<usize> {
        member.validate()?;

        let changed = self.conn.execute(
            "INSERT INTO members (
                username,
                password,
                country,
                province,
                city,
                postal_code,
                date_of_birth,
                limits,
                height,
                weight,
                body_type,
                ethnicity,
                email
            ) VALUES (
                :username,
                :password,
                :country,
                :province,
                :city,
                :postal_code,
                :date_of_birth,
                :limits,
                :height,
                :weight,
                :body_type,
                :ethnicity,
                :email
            );",
            &MemberRow::new(member).named_params()[..],
        )?;

        info!("event=member_add module=repo status=ok rows={changed}");
        Ok(changed)
    }

    fn update(&self, member: &Member) -> RepoResult<usize> {
        member.validate()?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                password = :password,
                country = :country,
                province = :province,
                city = :city,
                postal_code = :postal_code,
                date_of_birth = :date_of_birth,
                limits = :limits,
                height = :height,
                weight = :weight,
                body_type = :body_type,
                ethnicity = :ethnicity,
                email = :email
             WHERE username = :username;",
            &MemberRow::new(member).named_params()[..],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(member.username().to_string()));
        }

        info!("event=member_update module=repo status=ok rows={changed}");
        Ok(changed)
    }

    fn remove(&self, member: &Member) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM members WHERE username = ?1;",
            [member.username()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(member.username().to_string()));
        }

        info!("event=member_remove module=repo status=ok rows={changed}");
        Ok(changed)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE username = ?1 LIMIT 1;"))?;

        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }

        Ok(None)
    }

    fn search(&self, keyword: &str, offset: u32, limit: Option<u32>) -> RepoResult<Vec<Member>> {
        let mut sql = format!("{MEMBER_SELECT_SQL} WHERE username LIKE ? ESCAPE '\\'");
        let mut bind_values = vec![Value::Text(contains_pattern(keyword))];
        push_order_and_page(&mut sql, &mut bind_values, offset, limit);
        self.query_members(&sql, bind_values)
    }

    fn search_count(&self, keyword: &str) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM members WHERE username LIKE ?1 ESCAPE '\\';",
            [contains_pattern(keyword)],
            |row| row.get(0),
        )?;
        to_count(count)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM members;", [], |row| row.get(0))?;
        to_count(count)
    }

    fn find_all(&self, offset: u32, limit: Option<u32>) -> RepoResult<Vec<Member>> {
        let mut sql = MEMBER_SELECT_SQL.to_string();
        let mut bind_values = Vec::new();
        push_order_and_page(&mut sql, &mut bind_values, offset, limit);
        self.query_members(&sql, bind_values)
    }
}

impl SqliteMemberRepository<'_> {
    fn query_members(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut members = Vec::new();

        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }

        Ok(members)
    }
}

/// Column values of one member, bound by name in write statements.
struct MemberRow<'a> {
    username: &'a str,
    password: &'a str,
    country: &'a str,
    province: &'a str,
    city: &'a str,
    postal_code: &'a str,
    date_of_birth: String,
    limits: &'a str,
    height: &'a str,
    weight: &'a str,
    body_type: &'a str,
    ethnicity: &'a str,
    email: &'a str,
}

impl<'a> MemberRow<'a> {
    fn new(member: &'a Member) -> Self {
        let address = member.address();
        Self {
            username: member.username(),
            password: member.password(),
            country: address.country(),
            province: address.province(),
            city: address.city(),
            postal_code: address.postal_code(),
            date_of_birth: member.date_of_birth().to_rfc3339(),
            limits: member.limits(),
            height: member.height().as_str(),
            weight: member.weight().as_str(),
            body_type: member.body_type(),
            ethnicity: member.ethnicity(),
            email: member.email().as_str(),
        }
    }

    fn named_params(&self) -> [(&'static str, &dyn ToSql); 13] {
        [
            (":username", &self.username),
            (":password", &self.password),
            (":country", &self.country),
            (":province", &self.province),
            (":city", &self.city),
            (":postal_code", &self.postal_code),
            (":date_of_birth", &self.date_of_birth),
            (":limits", &self.limits),
            (":height", &self.height),
            (":weight", &self.weight),
            (":body_type", &self.body_type),
            (":ethnicity", &self.ethnicity),
            (":email", &self.email),
        ]
    }
}

fn push_order_and_page(sql: &mut String, bind_values: &mut Vec<Value>, offset: u32, limit: Option<u32>) {
    sql.push_str(" ORDER BY username ASC");

    match limit {
        Some(limit) => {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }
        None if offset > 0 => {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(offset)));
        }
        None => {}
    }
}

/// Builds a `LIKE` pattern matching `keyword` anywhere, with `%`, `_` and the
/// escape character itself taken literally.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn to_count(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{value}`")))
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let username: String = row.get("username")?;
    let invalid = |err: MemberValidationError| {
        RepoError::InvalidData(format!("member `{username}`: {err}"))
    };

    let dob_text: String = row.get("date_of_birth")?;
    let date_of_birth = DateTime::parse_from_rfc3339(&dob_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid date_of_birth `{dob_text}` in members.date_of_birth: {err}"
        ))
    })?;

    let address = Address::new(
        row.get::<_, String>("country")?,
        row.get::<_, String>("province")?,
        row.get::<_, String>("city")?,
        row.get::<_, String>("postal_code")?,
    )
    .map_err(invalid)?;
    let height = Height::new(row.get::<_, String>("height")?).map_err(invalid)?;
    let weight = Weight::new(row.get::<_, String>("weight")?).map_err(invalid)?;
    let email = Email::new(row.get::<_, String>("email")?).map_err(invalid)?;

    Member::new(
        username.clone(),
        row.get::<_, String>("password")?,
        address,
        date_of_birth,
        row.get::<_, String>("limits")?,
        height,
        weight,
        row.get::<_, String>("body_type")?,
        row.get::<_, String>("ethnicity")?,
        email,
    )
    .map_err(invalid)
}

fn ensure_member_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, MEMBERS_TABLE)? {
        return Err(RepoError::MissingRequiredTable(MEMBERS_TABLE));
    }

    for column in MEMBER_COLUMNS {
        if !table_has_column(conn, MEMBERS_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: MEMBERS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
