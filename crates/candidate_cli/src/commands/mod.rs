pub mod dump_tables;
pub mod member;
