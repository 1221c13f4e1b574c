#![allow(dead_code)]

//! In-memory stand-in for a MySQL server, enough to drive the importer.

use mysql_import::errors::CR_CONN_HOST_ERROR;
use mysql_import::{
    ConnectError, ConnectErrorKind, ConnectionTarget, Connector, QueryError, RetryConfig,
    RunOptions, Session, Spinner,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct Database {
    pub tables: BTreeSet<String>,
    /// (table, primary key)
    pub rows: BTreeSet<(String, String)>,
}

#[derive(Debug, Default)]
pub struct ServerState {
    /// user -> password
    pub users: HashMap<String, String>,
    /// Non-root users allowed to create databases
    pub can_create: HashSet<String>,
    pub databases: BTreeMap<String, Database>,
    /// The next this many connection attempts are refused
    pub refuse_connections: usize,
    /// User of every connection attempt, in order
    pub connect_attempts: Vec<String>,
    /// Every statement sent through `execute`, in order
    pub executed: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeServer(pub Rc<RefCell<ServerState>>);

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: &str, password: &str) -> Self {
        self.0.borrow_mut().users.insert(user.to_string(), password.to_string());
        self
    }

    pub fn with_root(self, password: &str) -> Self {
        self.with_user("root", password)
    }

    pub fn grant_create(self, user: &str) -> Self {
        self.0.borrow_mut().can_create.insert(user.to_string());
        self
    }

    pub fn refusing(self, attempts: usize) -> Self {
        self.0.borrow_mut().refuse_connections = attempts;
        self
    }

    pub fn with_table(self, database: &str, table: &str) -> Self {
        self.0
            .borrow_mut()
            .databases
            .entry(database.to_string())
            .or_default()
            .tables
            .insert(table.to_string());
        self
    }

    pub fn with_database(self, database: &str) -> Self {
        self.0.borrow_mut().databases.entry(database.to_string()).or_default();
        self
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.0.borrow().databases.contains_key(name)
    }

    pub fn database(&self, name: &str) -> Option<Database> {
        self.0.borrow().databases.get(name).cloned()
    }

    pub fn attempts(&self) -> Vec<String> {
        self.0.borrow().connect_attempts.clone()
    }

    pub fn executed(&self) -> Vec<String> {
        self.0.borrow().executed.clone()
    }

    pub fn clear_log(&self) {
        let mut state = self.0.borrow_mut();
        state.executed.clear();
        state.connect_attempts.clear();
    }
}

impl Connector for FakeServer {
    type Session = FakeSession;

    fn connect(
        &self,
        target: &ConnectionTarget,
        user: &str,
        password: Option<&str>,
    ) -> Result<FakeSession, ConnectError> {
        let mut state = self.0.borrow_mut();
        state.connect_attempts.push(user.to_string());

        if state.refuse_connections > 0 {
            state.refuse_connections -= 1;
            return Err(ConnectError::new(
                ConnectErrorKind::Unreachable,
                CR_CONN_HOST_ERROR,
                format!("Can't connect to MySQL server on '{}' (111)", target.host),
            ));
        }

        let accepted = state
            .users
            .get(user)
            .is_some_and(|expected| expected == password.unwrap_or(""));
        if !accepted {
            return Err(ConnectError::new(
                ConnectErrorKind::Authentication,
                1045,
                format!("Access denied for user '{user}'@'%' (using password: YES)"),
            ));
        }

        Ok(FakeSession {
            server: self.clone(),
            user: user.to_string(),
            current: None,
        })
    }
}

pub struct FakeSession {
    server: FakeServer,
    user: String,
    current: Option<String>,
}

fn backticked(sql: &str) -> String {
    sql.split('`').nth(1).unwrap_or_default().to_string()
}

/// First word after `prefix`, stripped of quoting
fn name_after(sql: &str, prefix: &str) -> String {
    sql[prefix.len()..]
        .split(|c: char| c.is_whitespace() || c == '(')
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .trim_matches('`')
        .to_string()
}

/// Text between the first `(` after VALUES and the next `,` or `)`
fn primary_key(sql: &str) -> String {
    let values = sql.find("VALUES").map(|i| &sql[i..]).unwrap_or(sql);
    let start = values.find('(').map(|i| i + 1).unwrap_or(0);
    values[start..]
        .split([',', ')'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('\'')
        .to_string()
}

impl Session for FakeSession {
    fn use_database(&mut self, name: &str) -> Result<(), QueryError> {
        if !self.server.has_database(name) {
            return Err(QueryError::with_code(1049, format!("Unknown database '{name}'")));
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<(), QueryError> {
        let mut state = self.server.0.borrow_mut();
        state.executed.push(sql.to_string());
        let statement = sql.trim().trim_end_matches(';').trim();

        if statement.starts_with("CREATE DATABASE") {
            let name = backticked(statement);
            if self.user != "root" && !state.can_create.contains(&self.user) {
                return Err(QueryError::with_code(
                    1044,
                    format!("Access denied for user '{}'@'%' to database '{name}'", self.user),
                ));
            }
            if state.databases.contains_key(&name) {
                return Err(QueryError::with_code(
                    1007,
                    format!("Can't create database '{name}'; database exists"),
                ));
            }
            state.databases.insert(name, Database::default());
            return Ok(());
        }

        if statement.starts_with("DROP DATABASE") {
            let name = backticked(statement);
            if state.databases.remove(&name).is_none() {
                return Err(QueryError::with_code(
                    1008,
                    format!("Can't drop database '{name}'; database doesn't exist"),
                ));
            }
            return Ok(());
        }

        if statement.starts_with("BOGUS") {
            return Err(QueryError::with_code(
                1064,
                "You have an error in your SQL syntax; check the manual".to_string(),
            ));
        }

        let Some(current) = self.current.clone() else {
            return Err(QueryError::with_code(1046, "No database selected"));
        };
        let Some(database) = state.databases.get_mut(&current) else {
            return Err(QueryError::with_code(1049, format!("Unknown database '{current}'")));
        };

        if statement.starts_with("CREATE TABLE") {
            let table = name_after(statement, "CREATE TABLE");
            if !database.tables.insert(table.clone()) {
                return Err(QueryError::with_code(1050, format!("Table '{table}' already exists")));
            }
        } else if statement.starts_with("INSERT INTO") {
            let table = name_after(statement, "INSERT INTO");
            if !database.tables.contains(&table) {
                return Err(QueryError::with_code(
                    1146,
                    format!("Table '{current}.{table}' doesn't exist"),
                ));
            }
            let key = primary_key(statement);
            if !database.rows.insert((table, key.clone())) {
                return Err(QueryError::with_code(
                    1062,
                    format!("Duplicate entry '{key}' for key 'PRIMARY'"),
                ));
            }
        }
        Ok(())
    }

    fn find_schema(&mut self, name: &str) -> Result<Option<String>, QueryError> {
        Ok(self.server.has_database(name).then(|| name.to_string()))
    }

    fn list_tables(&mut self) -> Result<Vec<String>, QueryError> {
        let Some(ref current) = self.current else {
            return Err(QueryError::with_code(1046, "No database selected"));
        };
        Ok(self
            .server
            .database(current)
            .map(|db| db.tables.into_iter().collect())
            .unwrap_or_default())
    }
}

/// Retry timing small enough for tests
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 2,
        backoff: Duration::from_millis(1),
        wait_interval: Duration::from_millis(1),
        wait_timeout: Duration::from_millis(200),
    }
}

pub fn hidden_spinner() -> Spinner {
    Spinner::hidden()
}

pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn options(pairs: &[(&str, &str)], args: &[&str]) -> RunOptions {
    RunOptions::resolve(&env(pairs), args.iter().copied())
}

pub fn write_sql(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write sql file");
    path.to_string_lossy().into_owned()
}

pub const USERS_DUMP: &str = "\
-- users table
CREATE TABLE users (
  id INT PRIMARY KEY,
  name VARCHAR(32)
);

-- seed rows
INSERT INTO users VALUES (1, 'ada');
INSERT INTO users VALUES (2, 'linus');
";
