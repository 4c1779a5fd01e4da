pub mod finding_db;
