//! Defines the transaction store trait and its SQLite implementation.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::Connection;

use crate::{
    Error,
    database_id::TransactionId,
    db::initialize,
    transaction::core::{
        CreatedTransaction, NewTransaction, Transaction, TransactionStatus, create_transaction,
        get_transaction, get_transactions_by_user, update_transaction_status,
    },
};

/// Handles the creation, retrieval and status updates of transactions.
pub trait TransactionStore {
    /// Create a new `PENDING` transaction.
    fn create(&self, transaction: NewTransaction) -> Result<CreatedTransaction, Error>;

    /// Retrieve every transaction owned by `user` in the order they were created.
    ///
    /// Returns [Error::MissingUserId] if `user` is empty.
    fn list_by_user(&self, user: &str) -> Result<Vec<Transaction>, Error>;

    /// Set the status of a transaction to `COMPLETED` or `FAILED`.
    ///
    /// Returns [Error::InvalidStatus] for any other status and
    /// [Error::NotFound] if there is no transaction with the ID `id`.
    fn update_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<Transaction, Error>;

    /// Retrieve a transaction by its ID.
    ///
    /// Returns [Error::NotFound] if there is no transaction with the ID `id`.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;
}

/// Stores transactions in a SQLite database.
///
/// The store owns the one database connection of the process. Clones share
/// that connection.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a store for the SQLite `connection`, creating the transaction
    /// table if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Open (or create) the SQLite database at `path` and create a store for it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened as a SQLite database or
    /// the database cannot be initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let connection = Connection::open(path)?;

        Self::new(connection)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> Result<u32, Error> {
        crate::transaction::core::count_transactions(&*self.lock()?)
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn create(&self, transaction: NewTransaction) -> Result<CreatedTransaction, Error> {
        create_transaction(transaction, &*self.lock()?)
    }

    fn list_by_user(&self, user: &str) -> Result<Vec<Transaction>, Error> {
        get_transactions_by_user(user, &*self.lock()?)
    }

    /// The write and the re-read happen while holding the connection lock,
    /// so the returned transaction reflects this update.
    fn update_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<Transaction, Error> {
        update_transaction_status(id, status, &*self.lock()?)
    }

    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        get_transaction(id, &*self.lock()?)
    }
}
