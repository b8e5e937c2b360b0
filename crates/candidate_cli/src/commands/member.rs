//! `member:*` read-only commands

use crate::config::GlobalArgs;
use candidate_core::{Member, MemberRepository, SqliteMemberRepository};
use chrono::{DateTime, FixedOffset, Utc};
use clap::Args;
use std::error::Error;
use std::io::Write;

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub username: String,

    /// Compute the age as of this RFC 3339 instant instead of now
    #[arg(long, value_parser = parse_instant)]
    pub as_of: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only members whose username contains this text
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct CountArgs {
    /// Only members whose username contains this text
    #[arg(long)]
    pub search: Option<String>,
}

pub fn show(global: &GlobalArgs, args: ShowArgs) -> Result<(), Box<dyn Error>> {
    let conn = global.open_database()?;
    let repo = SqliteMemberRepository::try_new(&conn)?;

    let member = repo
        .find_by_username(&args.username)?
        .ok_or_else(|| format!("member not found: {}", args.username))?;

    let as_of = args
        .as_of
        .unwrap_or_else(|| Utc::now().with_timezone(&member.date_of_birth().timezone()));

    let mut out = std::io::stdout().lock();
    write_profile(&mut out, &member, &as_of)?;
    Ok(())
}

pub fn list(global: &GlobalArgs, args: ListArgs) -> Result<(), Box<dyn Error>> {
    let conn = global.open_database()?;
    let repo = SqliteMemberRepository::try_new(&conn)?;

    let members = match args.search.as_deref() {
        Some(keyword) => repo.search(keyword, args.offset, args.limit)?,
        None => repo.find_all(args.offset, args.limit)?,
    };

    let mut out = std::io::stdout().lock();
    for member in &members {
        writeln!(
            out,
            "{}\t{}\t{}",
            member.username(),
            member.age(),
            member.address().city()
        )?;
    }
    Ok(())
}

pub fn count(global: &GlobalArgs, args: CountArgs) -> Result<(), Box<dyn Error>> {
    let conn = global.open_database()?;
    let repo = SqliteMemberRepository::try_new(&conn)?;

    let total = match args.search.as_deref() {
        Some(keyword) => repo.search_count(keyword)?,
        None => repo.count()?,
    };
    println!("{total}");
    Ok(())
}

fn parse_instant(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value).map_err(|err| format!("expected an RFC 3339 instant: {err}"))
}

fn write_profile(
    out: &mut dyn Write,
    member: &Member,
    as_of: &DateTime<FixedOffset>,
) -> std::io::Result<()> {
    let address = member.address();
    writeln!(out, "username:      {}", member.username())?;
    writeln!(out, "email:         {}", member.email())?;
    writeln!(
        out,
        "address:       {}, {}, {} {}",
        address.city(),
        address.province(),
        address.country(),
        address.postal_code()
    )?;
    writeln!(out, "date of birth: {}", member.date_of_birth().to_rfc3339())?;
    writeln!(out, "age:           {} (as of {})", member.age_at(as_of), as_of.to_rfc3339())?;
    writeln!(out, "height:        {}", member.height())?;
    writeln!(out, "weight:        {}", member.weight())?;
    writeln!(out, "body type:     {}", member.body_type())?;
    writeln!(out, "ethnicity:     {}", member.ethnicity())?;
    writeln!(out, "limits:        {}", member.limits())
}
