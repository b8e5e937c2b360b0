use candidate_core::db::migrations::latest_version;
use candidate_core::db::{open_db_in_memory, DbError};
use candidate_core::{
    Address, Email, Height, Member, MemberRepository, RepoError, SqliteMemberRepository, Weight,
};
use chrono::{DateTime, FixedOffset};
use rusqlite::Connection;

fn member(username: &str) -> Member {
    member_with(username, "user@domain.com", "1990-04-12T08:30:00-05:00")
}

fn member_with(username: &str, email: &str, date_of_birth: &str) -> Member {
    Member::new(
        username,
        "hunter2",
        Address::new("Canada", "Ontario", "Toronto", "M5V 2T6").unwrap(),
        DateTime::parse_from_rfc3339(date_of_birth).unwrap(),
        "none",
        Height::new("5' 11\"").unwrap(),
        Weight::new("180lb").unwrap(),
        "athletic",
        "unspecified",
        Email::new(email).unwrap(),
    )
    .unwrap()
}

fn usernames(members: &[Member]) -> Vec<&str> {
    members.iter().map(Member::username).collect()
}

#[test]
fn add_and_find_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let original = member("alice");
    assert_eq!(repo.add(&original).unwrap(), 1);

    let loaded = repo.find_by_username("alice").unwrap().unwrap();
    assert_eq!(loaded, original);
    assert_eq!(
        loaded.date_of_birth().offset(),
        &FixedOffset::west_opt(5 * 3600).unwrap()
    );
}

#[test]
fn find_unknown_username_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    repo.add(&member("alice")).unwrap();
    assert!(repo.find_by_username("bob").unwrap().is_none());
    assert!(repo.find_by_username("ALICE").unwrap().is_none());
}

#[test]
fn add_duplicate_username_surfaces_driver_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    repo.add(&member("alice")).unwrap();
    let err = repo.add(&member("alice")).unwrap_err();
    assert!(
        matches!(
            err,
            RepoError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(ref failure, _)))
                if failure.code == rusqlite::ErrorCode::ConstraintViolation
        ),
        "unexpected error: {err}"
    );
}

#[test]
fn update_replaces_every_column() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    repo.add(&member("alice")).unwrap();

    let replacement = Member::new(
        "alice",
        "correct horse",
        Address::new("USA", "NY", "New York", "10001").unwrap(),
        DateTime::parse_from_rfc3339("1985-12-01T23:15:00+09:00").unwrap(),
        "weekends",
        Height::new("170cm").unwrap(),
        Weight::new("65kg").unwrap(),
        "slim",
        "other",
        Email::new("alice@example.org").unwrap(),
    )
    .unwrap();
    assert_eq!(repo.update(&replacement).unwrap(), 1);

    let loaded = repo.find_by_username("alice").unwrap().unwrap();
    assert_eq!(loaded, replacement);
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_unknown_member_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let err = repo.update(&member("ghost")).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ref name) if name == "ghost"));
}

#[test]
fn remove_deletes_by_username() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let alice = member("alice");
    repo.add(&alice).unwrap();
    repo.add(&member("bob")).unwrap();

    assert_eq!(repo.remove(&alice).unwrap(), 1);
    assert!(repo.find_by_username("alice").unwrap().is_none());
    assert_eq!(repo.count().unwrap(), 1);

    let err = repo.remove(&alice).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ref name) if name == "alice"));
}

#[test]
fn search_matches_substrings_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    for name in ["zoe_smith", "anna", "joanna", "bob", "hannah"] {
        repo.add(&member(name)).unwrap();
    }

    let all = repo.search("ann", 0, None).unwrap();
    assert_eq!(usernames(&all), ["anna", "hannah", "joanna"]);

    let page = repo.search("ann", 1, Some(1)).unwrap();
    assert_eq!(usernames(&page), ["hannah"]);

    let tail = repo.search("ann", 1, None).unwrap();
    assert_eq!(usernames(&tail), ["hannah", "joanna"]);

    assert_eq!(repo.search_count("ann").unwrap(), 3);
    assert_eq!(repo.search_count("").unwrap(), 5);
    assert!(repo.search("nobody", 0, None).unwrap().is_empty());
}

#[test]
fn search_treats_like_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    repo.add(&member("zoe_smith")).unwrap();
    repo.add(&member("zoexsmith")).unwrap();
    repo.add(&member("100%real")).unwrap();

    assert_eq!(usernames(&repo.search("_", 0, None).unwrap()), ["zoe_smith"]);
    assert_eq!(usernames(&repo.search("%", 0, None).unwrap()), ["100%real"]);
    assert_eq!(repo.search_count("e_s").unwrap(), 1);
}

#[test]
fn count_and_find_all_pagination_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    assert_eq!(repo.count().unwrap(), 0);
    for name in ["carol", "alice", "dave", "bob"] {
        repo.add(&member(name)).unwrap();
    }
    assert_eq!(repo.count().unwrap(), 4);

    let all = repo.find_all(0, None).unwrap();
    assert_eq!(usernames(&all), ["alice", "bob", "carol", "dave"]);

    let page = repo.find_all(1, Some(2)).unwrap();
    assert_eq!(usernames(&page), ["bob", "carol"]);

    let offset_only = repo.find_all(3, None).unwrap();
    assert_eq!(usernames(&offset_only), ["dave"]);

    assert!(repo.find_all(10, Some(5)).unwrap().is_empty());
}

#[test]
fn read_path_rejects_invalid_persisted_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    repo.add(&member("alice")).unwrap();
    conn.execute(
        "UPDATE members SET date_of_birth = 'yesterday' WHERE username = 'alice';",
        [],
    )
    .unwrap();

    let err = repo.find_by_username("alice").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("date_of_birth")));

    conn.execute(
        "UPDATE members
         SET date_of_birth = '1990-01-01T00:00:00+00:00', email = 'broken'
         WHERE username = 'alice';",
        [],
    )
    .unwrap();
    let err = repo.find_all(0, None).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("broken")));
}

#[test]
fn age_survives_storage_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    repo.add(&member_with(
        "leapling",
        "leap@domain.com",
        "2016-02-29T00:00:00+00:00",
    ))
    .unwrap();

    let loaded = repo.find_by_username("leapling").unwrap().unwrap();
    let as_of = DateTime::parse_from_rfc3339("2017-03-01T00:00:00+00:00").unwrap();
    assert_eq!(loaded.age_at(&as_of), 1);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteMemberRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_members_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteMemberRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("members"))));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE members (
            username TEXT PRIMARY KEY NOT NULL,
            password TEXT NOT NULL,
            country TEXT NOT NULL,
            province TEXT NOT NULL,
            city TEXT NOT NULL,
            postal_code TEXT NOT NULL,
            date_of_birth TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteMemberRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "members",
            column: "limits"
        })
    ));
}
