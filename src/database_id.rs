//! Database ID type definition.

/// The ID SQLite assigns to a transaction row.
pub type TransactionId = i64;
