use crate::error::Result;
use duckdb::{Connection, Transaction};

/// Run `f` inside one transaction: commit when it returns `Ok`, roll back
/// (by dropping the transaction) when it returns `Err`.
pub fn with_transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
