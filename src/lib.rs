pub mod cli;
pub mod config;
pub mod connection;
pub mod connection_manager;
pub mod errors;
pub mod executor;
pub mod lib_utils;
pub mod lock_file;
pub mod logging;
pub mod outcome;
pub mod prober;
pub mod progress;
pub mod retry;
pub mod state_handlers;
pub mod state_machine;

pub use cli::{Cli, ConnectionTarget, Credentials, RunOptions, SqlFile};
pub use config::{AppConfig, ConfigBuilder, ImportConfig, LoggingConfig};
pub use connection::{Connector, MysqlConnector, MysqlSession, Session};
pub use connection_manager::{ADMIN_USER, ConnectionManager};
pub use errors::{
    ConfigError, ConnectError, ConnectErrorKind, ImportError, QueryError, Result,
    StateMachineError,
};
pub use lib_utils::{
    env_map, print_error_and_exit, print_result_and_exit, run_import, run_import_with_config,
};
pub use lock_file::LockFile;
pub use logging::{LogConfig, init_logging};
pub use outcome::{EXIT_CONNECTION, EXIT_OK, EXIT_USAGE, ImportResult};
pub use progress::Spinner;
pub use retry::{RetryConfig, retry_until_ready, retry_with_backoff};
pub use state_handlers::{
    AdminAttemptHandler, CheckingFileHandler, InitialHandler, UserAttemptHandler,
    WaitingForServerHandler,
};
pub use state_machine::{State, StateContext, StateHandler, StateMachine};
