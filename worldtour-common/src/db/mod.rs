//! Database access: initialization, migrations, and tour queries

pub mod init;
pub mod migrations;
pub mod tours;

pub use init::{apply_schema, init_database};
pub use tours::{Tour, TourFilter, TourPayload};
