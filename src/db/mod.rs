//! Diesel integration for PostgreSQL.

pub mod distance;
pub mod introspect;

pub use introspect::load_table_definition;
