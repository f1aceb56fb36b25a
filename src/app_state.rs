//! Implements a struct that holds the state of the REST server.

use crate::transaction::TransactionStore;

/// The state of the REST server.
///
/// `T` is the store the request handlers read and write transactions with.
/// The server uses a [SQLiteTransactionStore](crate::SQLiteTransactionStore).
#[derive(Debug, Clone)]
pub struct AppState<T> {
    /// The store holding the transactions.
    pub transaction_store: T,
}

impl<T> AppState<T>
where
    T: TransactionStore,
{
    /// Create a new [AppState] around an already constructed store.
    pub fn new(transaction_store: T) -> Self {
        Self { transaction_store }
    }
}
