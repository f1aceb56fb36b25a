#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, Error, TransactionId, build_router,
    transaction::{
        Amount, CreatedTransaction, NewTransaction, SQLiteTransactionStore, Transaction,
        TransactionStatus, TransactionStore, TransactionType,
    },
};

/// A test server backed by an in-memory database, and a handle to its store.
pub(crate) fn get_test_server() -> (TestServer, SQLiteTransactionStore) {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let store = SQLiteTransactionStore::new(connection).expect("Could not initialize database.");
    let server = TestServer::try_new(build_router(AppState::new(store.clone())))
        .expect("Could not create test server.");

    (server, store)
}

/// A test server whose store fails every operation with a storage error.
pub(crate) fn get_failing_test_server() -> TestServer {
    TestServer::try_new(build_router(AppState::new(FailingTransactionStore)))
        .expect("Could not create test server.")
}

#[track_caller]
pub(crate) fn create_test_transaction(
    store: &SQLiteTransactionStore,
    amount: f64,
    transaction_type: TransactionType,
    user: &str,
) -> CreatedTransaction {
    store
        .create(NewTransaction {
            amount: Amount::from(amount),
            transaction_type,
            user: user.to_owned(),
        })
        .expect("could not create test transaction")
}

/// A store whose database is always broken.
#[derive(Debug, Clone)]
pub(crate) struct FailingTransactionStore;

impl FailingTransactionStore {
    fn error() -> Error {
        Error::SqlError(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
            Some("disk I/O error".to_owned()),
        ))
    }
}

impl TransactionStore for FailingTransactionStore {
    fn create(&self, _transaction: NewTransaction) -> Result<CreatedTransaction, Error> {
        Err(Self::error())
    }

    fn list_by_user(&self, _user: &str) -> Result<Vec<Transaction>, Error> {
        Err(Self::error())
    }

    fn update_status(
        &self,
        _id: TransactionId,
        _status: TransactionStatus,
    ) -> Result<Transaction, Error> {
        Err(Self::error())
    }

    fn get(&self, _id: TransactionId) -> Result<Transaction, Error> {
        Err(Self::error())
    }
}
