//! # Connection Manager
//!
//! Owns the one live session of a run. Every connect replaces the previous
//! session; a failed attempt leaves no session behind.

use crate::cli::ConnectionTarget;
use crate::connection::Connector;
use crate::errors::ConnectError;
use crate::progress::Spinner;
use crate::retry::{RetryConfig, retry_until_ready, retry_with_backoff};
use tracing::{info, warn};

/// Account used for the fallback path and the wait loop
pub const ADMIN_USER: &str = "root";

pub struct ConnectionManager<C: Connector> {
    connector: C,
    target: ConnectionTarget,
    retry: RetryConfig,
    spinner: Spinner,
    session: Option<C::Session>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, target: ConnectionTarget, retry: RetryConfig, spinner: Spinner) -> Self {
        Self {
            connector,
            target,
            retry,
            spinner,
            session: None,
        }
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    /// Single attempt
    pub fn connect(&mut self, user: &str, password: Option<&str>) -> Result<&mut C::Session, ConnectError> {
        self.session = None;
        let session = self.connector.connect(&self.target, user, password)?;
        Ok(self.session.insert(session))
    }

    /// Attempt, pause, attempt once more. The pause covers servers that are
    /// still accepting their first connections.
    pub fn connect_with_retry(
        &mut self,
        user: &str,
        password: Option<&str>,
    ) -> Result<&mut C::Session, ConnectError> {
        self.session = None;
        let connector = &self.connector;
        let target = &self.target;
        let session = retry_with_backoff(&self.retry, &mut self.spinner, |attempt| {
            info!(user, host = %target.host, port = target.port, attempt, "connecting");
            connector.connect(target, user, password)
        })?;
        Ok(self.session.insert(session))
    }

    /// Wait loop for `--do-while`: poll as the admin user until the server
    /// accepts connections, refuses definitively, or time runs out.
    pub fn wait_until_ready(&mut self, admin_password: Option<&str>) -> Result<(), ConnectError> {
        self.session = None;
        let connector = &self.connector;
        let target = &self.target;
        info!(host = %target.host, port = target.port, "waiting for database server");
        let result = retry_until_ready(&self.retry, &mut self.spinner, || {
            connector.connect(target, ADMIN_USER, admin_password)
        });
        match result {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                warn!(code = e.code, "database server did not become ready: {e}");
                Err(e)
            }
        }
    }

    pub fn session(&mut self) -> Option<&mut C::Session> {
        self.session.as_mut()
    }

    pub fn disconnect(&mut self) {
        self.session = None;
    }
}
