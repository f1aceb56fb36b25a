//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the closed type and status enums
//! - Database functions and the `TransactionStore` for persisting transactions
//! - Route handlers for the JSON API

mod core;
mod create_endpoint;
mod get_endpoint;
mod list_endpoint;
mod store;
mod update_status_endpoint;

pub use self::core::{
    Amount, CreatedTransaction, NewTransaction, Transaction, TransactionStatus, TransactionType,
    create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use store::{SQLiteTransactionStore, TransactionStore};
pub use update_status_endpoint::update_transaction_status_endpoint;
