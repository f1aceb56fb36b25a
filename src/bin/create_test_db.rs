use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;

use transaction_ledger::{
    Amount, NewTransaction, SQLiteTransactionStore, TransactionStatus, TransactionStore,
    TransactionType,
};

/// A utility for creating a test database for the transaction ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (amount, type, user, final status)
const SAMPLE_TRANSACTIONS: [(f64, TransactionType, &str, Option<TransactionStatus>); 6] = [
    (1500.0, TransactionType::Deposit, "alice", Some(TransactionStatus::Completed)),
    (42.5, TransactionType::Withdrawal, "alice", Some(TransactionStatus::Completed)),
    (300.0, TransactionType::Withdrawal, "alice", Some(TransactionStatus::Failed)),
    (99.99, TransactionType::Deposit, "alice", None),
    (250.0, TransactionType::Deposit, "bob", Some(TransactionStatus::Completed)),
    (80.0, TransactionType::Withdrawal, "bob", None),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let store = SQLiteTransactionStore::open(output_path)?;

    println!("Creating sample transactions...");

    for (amount, transaction_type, user, final_status) in SAMPLE_TRANSACTIONS {
        let created = store.create(NewTransaction {
            amount: Amount::from(amount),
            transaction_type,
            user: user.to_owned(),
        })?;

        if let Some(status) = final_status {
            store.update_status(created.transaction.transaction_id, status)?;
        }
    }

    println!("Success!");

    Ok(())
}
