//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money went into or out of the user's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money paid in.
    Deposit,
    /// Money paid out.
    Withdrawal,
}

impl TransactionType {
    /// The wire and database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a transaction is in its lifecycle.
///
/// Every transaction starts as [TransactionStatus::Pending] and may then be
/// set to [TransactionStatus::Completed] or [TransactionStatus::Failed].
/// Setting a final status again is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// The transaction has been recorded but not yet settled.
    Pending,
    /// The transaction went through.
    Completed,
    /// The transaction did not go through.
    Failed,
}

impl TransactionStatus {
    /// The wire and database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }

    /// Whether a transaction may be updated to this status.
    pub fn is_final(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "COMPLETED" => Ok(TransactionStatus::Completed),
            "FAILED" => Ok(TransactionStatus::Failed),
            other => Err(Error::InvalidStatus(other.to_owned())),
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An amount of money, kept exactly as the client sent it.
///
/// No validation is done: zero, negative and non-numeric amounts are all
/// stored. SQLite's `NUMERIC` affinity turns numeric text such as `"100.50"`
/// into a number, so reading a transaction back may give a [Amount::Number]
/// where a [Amount::Text] was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// A JSON number.
    Number(serde_json::Number),
    /// A JSON string, which may or may not hold a number.
    Text(String),
}

impl Amount {
    /// The amount as a float, if it is a number or numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(number) => number.as_f64(),
            Amount::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Number(value.into())
    }
}

/// NaN and infinite values have no JSON number form and are kept as text.
impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map_or_else(|| Amount::Text(value.to_string()), Amount::Number)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_owned())
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Amount::Number(number) => write!(f, "{number}"),
            Amount::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A deposit or withdrawal as it is stored.
///
/// The owning user is not included; it is only echoed back when the
/// transaction is created, see [CreatedTransaction].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID the database assigned to the transaction.
    pub transaction_id: TransactionId,
    /// How much money moved.
    pub amount: Amount,
    /// Whether the money went in or out.
    pub transaction_type: TransactionType,
    /// Where the transaction is in its lifecycle.
    pub status: TransactionStatus,
    /// When the transaction was recorded.
    ///
    /// Read back as the stored text, which SQLite writes as
    /// `YYYY-MM-DD HH:MM:SS` in UTC. A newly created transaction carries the
    /// creation time in ISO 8601 with milliseconds instead. `None` only for
    /// rows written without a timestamp by other tools.
    pub timestamp: Option<String>,
}

/// The result of creating a transaction: the new transaction and its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedTransaction {
    /// The stored transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The user that owns the transaction.
    pub user: String,
}

/// The validated fields needed to create a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// How much money moved.
    pub amount: Amount,
    /// Whether the money went in or out.
    pub transaction_type: TransactionType,
    /// The user that owns the transaction. May be empty.
    pub user: String,
}

// ============================================================================
// SQL CONVERSIONS
// ============================================================================

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Amount::Number(number) => match (number.as_i64(), number.as_f64()) {
                (Some(integer), _) => Ok(ToSqlOutput::from(integer)),
                (None, Some(real)) => Ok(ToSqlOutput::from(real)),
                (None, None) => Ok(ToSqlOutput::from(number.to_string())),
            },
            Amount::Text(text) => Ok(ToSqlOutput::from(text.as_str())),
        }
    }
}

// The column has NUMERIC affinity, so SQLite may hand back an integer, a real
// or, for values it could not convert, the original text.
impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(integer) => Ok(Amount::from(integer)),
            ValueRef::Real(real) => Ok(Amount::from(real)),
            ValueRef::Text(_) => Ok(Amount::Text(value.as_str()?.to_owned())),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// ISO 8601 in UTC with millisecond precision.
const ISO_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Format a UTC timestamp like `2024-03-01T09:30:15.250Z`.
fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, Error> {
    timestamp
        .format(ISO_TIMESTAMP_FORMAT)
        .map_err(|error| Error::TimestampFormat(error.to_string()))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION_COLUMNS: &str =
    "SELECT transaction_id, amount, transaction_type, status, timestamp FROM transactions";

/// Create a new transaction in the database with the status `PENDING`.
///
/// The amount is stored as given. The returned timestamp is the time of the
/// call, the stored row gets the database's own `CURRENT_TIMESTAMP`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<CreatedTransaction, Error> {
    let status = TransactionStatus::Pending;
    let timestamp = format_timestamp(OffsetDateTime::now_utc())?;

    let transaction_id: TransactionId = connection
        .prepare(
            "INSERT INTO transactions (amount, transaction_type, user, status)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING transaction_id",
        )?
        .query_row(
            (
                &new_transaction.amount,
                new_transaction.transaction_type,
                &new_transaction.user,
                status,
            ),
            |row| row.get(0),
        )?;

    Ok(CreatedTransaction {
        transaction: Transaction {
            transaction_id,
            amount: new_transaction.amount,
            transaction_type: new_transaction.transaction_type,
            status,
            timestamp: Some(timestamp),
        },
        user: new_transaction.user,
    })
}

/// Retrieve all transactions owned by `user`, in the order they were created.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingUserId] if `user` is empty,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_user(
    user: &str,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    if user.is_empty() {
        return Err(Error::MissingUserId);
    }

    let transactions = connection
        .prepare(&format!(
            "{SELECT_TRANSACTION_COLUMNS} WHERE user = :user ORDER BY transaction_id"
        ))?
        .query_map(&[(":user", &user)], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "{SELECT_TRANSACTION_COLUMNS} WHERE transaction_id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Set the status of the transaction `id` and return the updated transaction.
///
/// Only the status column is written. Updating a transaction that already
/// has a final status is allowed.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidStatus] if `status` is `PENDING`, nothing is written,
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction_status(
    id: TransactionId,
    status: TransactionStatus,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !status.is_final() {
        return Err(Error::InvalidStatus(status.to_string()));
    }

    let rows_affected = connection.execute(
        "UPDATE transactions SET status = ?1 WHERE transaction_id = ?2",
        (status, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_transaction(id, connection)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(transaction_id) FROM transactions;", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// The column names and defaults match databases created by earlier versions
/// of the service and must not change.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                transaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount NUMERIC NOT NULL,
                transaction_type TEXT NOT NULL,
                user TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'PENDING',
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of `SELECT_TRANSACTION_COLUMNS`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let transaction_id = row.get(0)?;
    let amount = row.get(1)?;
    let transaction_type = row.get(2)?;
    let status = row.get(3)?;
    // Other tools may have written anything into this column, so whatever is
    // there is passed through as text.
    let timestamp = match row.get_ref(4)? {
        ValueRef::Null => None,
        ValueRef::Integer(integer) => Some(integer.to_string()),
        ValueRef::Real(real) => Some(real.to_string()),
        ValueRef::Text(text) | ValueRef::Blob(text) => {
            Some(String::from_utf8_lossy(text).into_owned())
        }
    };

    Ok(Transaction {
        transaction_id,
        amount,
        transaction_type,
        status,
        timestamp,
    })
}

// ============================================================================
// TESTS
// ============================================================================
