use crate::connection::{Session, quote_identifier};
use crate::errors::QueryError;
use tracing::{debug, info};

/// Token `drop` insists on before destroying anything
pub const DROP_CONFIRMATION: &str = "yes";

/// Whether a database named exactly `name` exists
pub fn exists<S: Session + ?Sized>(session: &mut S, name: &str) -> Result<bool, QueryError> {
    let found = session.find_schema(name)?;
    debug!(database = name, found = found.is_some(), "checked database existence");
    Ok(found.as_deref() == Some(name))
}

/// Selects `name`, then reports whether it has no tables.
/// The selection stays in effect afterwards.
pub fn is_blank<S: Session + ?Sized>(session: &mut S, name: &str) -> Result<bool, QueryError> {
    session.use_database(name)?;
    let tables = session.list_tables()?;
    debug!(database = name, tables = tables.len(), "listed tables");
    Ok(tables.is_empty())
}

pub fn create<S: Session + ?Sized>(session: &mut S, name: &str) -> Result<(), QueryError> {
    info!(database = name, "creating database");
    session.execute(&format!(
        "CREATE DATABASE {} CHARACTER SET utf8 COLLATE utf8_general_ci",
        quote_identifier(name)
    ))
}

/// Drop `name`, but only when `confirmation` is exactly `"yes"`.
/// Anything else does nothing.
pub fn drop<S: Session + ?Sized>(session: &mut S, name: &str, confirmation: &str) -> Result<(), QueryError> {
    if confirmation != DROP_CONFIRMATION {
        return Ok(());
    }
    info!(database = name, "dropping database");
    session.execute(&format!("DROP DATABASE {}", quote_identifier(name)))
}
