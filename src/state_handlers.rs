use crate::cli::SqlFile;
use crate::connection::{Connector, Session};
use crate::connection_manager::ADMIN_USER;
use crate::errors::QueryError;
use crate::executor;
use crate::lock_file::LockFile;
use crate::outcome::ImportResult;
use crate::prober;
use crate::state_machine::{State, StateContext, StateHandler};
use tracing::{info, warn};

/// Import into `database` and turn the outcome into a result.
/// Query failures keep exit code 0.
fn import_into<S: Session + ?Sized>(session: &mut S, database: &str, sql_file: &SqlFile) -> ImportResult {
    match executor::import(session, database, sql_file) {
        Ok(message) => ImportResult::ok(message),
        Err(e) => {
            warn!(database, "import failed: {e}");
            ImportResult::ok(e.to_string())
        }
    }
}

/// Usage checks, then either the wait loop or the file checks
pub struct InitialHandler;

impl<C: Connector> StateHandler<C> for InitialHandler {
    fn execute(&self, context: &mut StateContext<C>) -> State {
        if let Some(argument) = context.options.unrecognized_argument.clone() {
            return context.finish(ImportResult::unknown_option(&argument));
        }
        if let Some(port) = context.options.invalid_port.clone() {
            return context.finish(ImportResult::invalid_port(&port));
        }
        if context.options.retry_until_ready {
            State::WaitingForServer
        } else {
            State::CheckingFile
        }
    }
}

/// `--do-while`: block until the server answers. The outcome only decides
/// how long we wait; the attempts afterwards report any real problem.
pub struct WaitingForServerHandler;

impl<C: Connector> StateHandler<C> for WaitingForServerHandler {
    fn execute(&self, context: &mut StateContext<C>) -> State {
        let admin_password = context.options.credentials.admin_password.as_deref();
        if context.connections.wait_until_ready(admin_password).is_ok() {
            info!("database server is ready");
        }
        context.connections.disconnect();
        State::CheckingFile
    }
}

/// The dump must exist unless `--no-file` was given; clears a stale lock
pub struct CheckingFileHandler;

impl<C: Connector> StateHandler<C> for CheckingFileHandler {
    fn execute(&self, context: &mut StateContext<C>) -> State {
        match &context.options.sql_file {
            SqlFile::Missing => return context.finish(ImportResult::missing_sql_file()),
            SqlFile::Path(path) if !path.exists() => {
                let result = ImportResult::sql_file_not_found(path);
                return context.finish(result);
            }
            _ => {}
        }

        if let Some(lock_path) = context.options.sql_file.lock_path() {
            match LockFile::remove_stale(&lock_path) {
                Ok(true) => info!(path = %lock_path.display(), "removed stale lock file"),
                Ok(false) => {}
                Err(e) => warn!(path = %lock_path.display(), "could not remove lock file: {e}"),
            }
        }

        State::UserAttempt
    }
}

/// Make sure the database exists, then report whether it is blank
fn prepare_user_database<S: Session + ?Sized>(session: &mut S, database: &str) -> Result<bool, QueryError> {
    if !prober::exists(session, database)? {
        prober::create(session, database)?;
    }
    prober::is_blank(session, database)
}

/// Application credentials. Any connection or privilege problem falls
/// through to the root attempt rather than ending the run.
pub struct UserAttemptHandler;

impl<C: Connector> StateHandler<C> for UserAttemptHandler {
    fn execute(&self, context: &mut StateContext<C>) -> State {
        let options = &context.options;
        let (Some(user), Some(password)) = (
            options.credentials.user.as_deref(),
            options.credentials.password.as_deref(),
        ) else {
            info!("no application user configured, trying root");
            return State::AdminAttempt;
        };

        let session = match context.connections.connect_with_retry(user, Some(password)) {
            Ok(session) => session,
            Err(e) => {
                warn!(user, code = e.code, "user connection failed, trying root: {e}");
                return State::AdminAttempt;
            }
        };

        let database = options.target.database.as_str();
        let result = match prepare_user_database(session, database) {
            Ok(blank) if !blank && !options.force => ImportResult::database_not_blank(),
            Ok(_) => import_into(session, database, &options.sql_file),
            Err(e) => {
                warn!(user, database, "user cannot prepare database, trying root: {e}");
                return State::AdminAttempt;
            }
        };
        context.finish(result)
    }
}

/// Root with the admin password: last resort, reports connection failures
pub struct AdminAttemptHandler;

impl<C: Connector> StateHandler<C> for AdminAttemptHandler {
    fn execute(&self, context: &mut StateContext<C>) -> State {
        let options = &context.options;
        let Some(admin_password) = options.credentials.admin_password.as_deref() else {
            return context.finish(ImportResult::missing_root_password());
        };

        let session = match context.connections.connect_with_retry(ADMIN_USER, Some(admin_password)) {
            Ok(session) => session,
            Err(e) => {
                let result = ImportResult::connection_problem(ADMIN_USER, &options.target.host, &e);
                return context.finish(result);
            }
        };

        let database = options.target.database.as_str();
        let result = match prober::exists(session, database) {
            Ok(true) => match prober::is_blank(session, database) {
                Ok(blank) if blank || options.force => import_into(session, database, &options.sql_file),
                Ok(_) => ImportResult::database_not_blank(),
                Err(e) => ImportResult::ok(e.to_string()),
            },
            Ok(false) => match prober::create(session, database) {
                Ok(()) => import_into(session, database, &options.sql_file),
                Err(e) => ImportResult::ok(e.to_string()),
            },
            Err(e) => ImportResult::ok(e.to_string()),
        };
        context.finish(result)
    }
}
