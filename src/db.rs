//! Sets up the application database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, transaction::create_transaction_table};

/// Create the application tables if they do not already exist.
///
/// Existing tables and their data are left untouched, so this is safe to run
/// against a database created by an earlier deployment.
///
/// # Errors
/// Returns an [Error::SqlError] if the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("first initialization failed");
        initialize(&connection).expect("second initialization failed");
    }

    #[test]
    fn creates_transactions_table_with_expected_columns() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let columns: Vec<String> = connection
            .prepare("SELECT name FROM pragma_table_info('transactions') ORDER BY cid")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            columns,
            [
                "transaction_id",
                "amount",
                "transaction_type",
                "user",
                "status",
                "timestamp"
            ]
        );
    }

    #[test]
    fn new_rows_default_to_pending_with_timestamp() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        connection
            .execute(
                "INSERT INTO transactions (amount, transaction_type, user) VALUES (1, 'DEPOSIT', 'alice')",
                (),
            )
            .unwrap();

        let (status, timestamp): (String, Option<String>) = connection
            .query_row("SELECT status, timestamp FROM transactions", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();

        assert_eq!(status, "PENDING");
        assert!(timestamp.is_some());
    }
}
