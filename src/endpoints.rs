//! The API endpoint URIs.
//!
//! Every route is served with and without its trailing slash. For endpoints
//! that take a transaction ID, use [format_endpoint] to build a concrete path.

use crate::database_id::TransactionId;

/// The route to create and list transactions.
pub const TRANSACTIONS: &str = "/api/transactions/";
/// [TRANSACTIONS] without the trailing slash.
pub const TRANSACTIONS_NO_SLASH: &str = "/api/transactions";
/// The route to get and update a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}/";
/// [TRANSACTION] without the trailing slash.
pub const TRANSACTION_NO_SLASH: &str = "/api/transactions/{transaction_id}";

/// Replace the first `{parameter}` in `endpoint_path` with `id`.
///
/// If `endpoint_path` has no parameter, it is returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: TransactionId) -> String {
    let Some((head, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };

    let tail = rest.split_once('}').map_or("", |(_, tail)| tail);

    format!("{head}{id}{tail}")
}
