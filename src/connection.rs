use crate::cli::ConnectionTarget;
use crate::errors::{
    CR_CONN_HOST_ERROR, CR_UNKNOWN_ERROR, CR_UNKNOWN_HOST, ConnectError, ConnectErrorKind,
    QueryError,
};
use mysql::prelude::*;
use mysql::{Conn, OptsBuilder, Row};
use std::time::Duration;

/// Server error codes that mean the credentials were refused
const AUTH_ERROR_CODES: &[u16] = &[
    1044, // ER_DBACCESS_DENIED_ERROR
    1045, // ER_ACCESS_DENIED_ERROR
    1251, // ER_NOT_SUPPORTED_AUTH_MODE
    1698, // ER_ACCESS_DENIED_NO_PASSWORD_ERROR
];

/// A live session with no implicit database. The handful of operations the
/// importer needs from the server.
pub trait Session {
    /// `USE <name>`
    fn use_database(&mut self, name: &str) -> Result<(), QueryError>;

    /// Run a statement and discard any rows
    fn execute(&mut self, sql: &str) -> Result<(), QueryError>;

    /// Schema whose name equals `name` exactly, if one exists
    fn find_schema(&mut self, name: &str) -> Result<Option<String>, QueryError>;

    /// Tables of the currently selected database
    fn list_tables(&mut self) -> Result<Vec<String>, QueryError>;
}

/// Opens sessions. Failures come back as classified values, never panics.
pub trait Connector {
    type Session: Session;

    fn connect(
        &self,
        target: &ConnectionTarget,
        user: &str,
        password: Option<&str>,
    ) -> Result<Self::Session, ConnectError>;
}

/// Quote an identifier with backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Connects over the MySQL wire protocol
#[derive(Debug, Clone)]
pub struct MysqlConnector {
    connect_timeout: Duration,
}

impl MysqlConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Connector for MysqlConnector {
    type Session = MysqlSession;

    fn connect(
        &self,
        target: &ConnectionTarget,
        user: &str,
        password: Option<&str>,
    ) -> Result<MysqlSession, ConnectError> {
        let builder = OptsBuilder::new()
            .ip_or_hostname(Some(target.host.as_str()))
            .tcp_port(target.port)
            .user(Some(user))
            .pass(password)
            .prefer_socket(false)
            .tcp_connect_timeout(Some(self.connect_timeout));

        Conn::new(builder).map(MysqlSession).map_err(classify_connect_error)
    }
}

/// Sort a driver error into the connect taxonomy
pub fn classify_connect_error(err: mysql::Error) -> ConnectError {
    match err {
        mysql::Error::MySqlError(e) => {
            let kind = if AUTH_ERROR_CODES.contains(&e.code) {
                ConnectErrorKind::Authentication
            } else {
                ConnectErrorKind::Protocol
            };
            ConnectError::new(kind, e.code, e.message)
        }
        mysql::Error::IoError(e) => {
            let message = e.to_string();
            let code = if message.contains("lookup") || message.contains("resolve") {
                CR_UNKNOWN_HOST
            } else {
                CR_CONN_HOST_ERROR
            };
            ConnectError::new(ConnectErrorKind::Unreachable, code, message)
        }
        other => ConnectError::new(ConnectErrorKind::Protocol, CR_UNKNOWN_ERROR, other.to_string()),
    }
}

/// A single, exclusively owned server connection
pub struct MysqlSession(Conn);

impl Session for MysqlSession {
    fn use_database(&mut self, name: &str) -> Result<(), QueryError> {
        self.0.query_drop(format!("USE {}", quote_identifier(name)))?;
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<(), QueryError> {
        self.0.query_drop(sql)?;
        Ok(())
    }

    fn find_schema(&mut self, name: &str) -> Result<Option<String>, QueryError> {
        let query = "SELECT SCHEMA_NAME FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = ?";
        let result: Option<String> = self.0.exec_first(query, (name,))?;
        Ok(result)
    }

    fn list_tables(&mut self) -> Result<Vec<String>, QueryError> {
        let rows: Vec<Row> = self.0.query("SHOW TABLES")?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.get::<String, _>(0))
            .collect())
    }
}
