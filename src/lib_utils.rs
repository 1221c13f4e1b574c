use crate::cli::RunOptions;
use crate::config::AppConfig;
use crate::connection::Connector;
use crate::connection_manager::ConnectionManager;
use crate::errors::StateMachineError;
use crate::outcome::ImportResult;
use crate::progress::Spinner;
use crate::retry::RetryConfig;
use crate::state_machine::{StateContext, StateMachine};
use std::collections::HashMap;
use std::process;

/// Snapshot of the process environment
pub fn env_map() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Build the standard machine for `options` and run it to completion
pub fn run_import<C: Connector + 'static>(
    options: RunOptions,
    connector: C,
    retry: RetryConfig,
    spinner: Spinner,
) -> Result<ImportResult, StateMachineError> {
    let connections = ConnectionManager::new(connector, options.target.clone(), retry, spinner);
    let mut machine = StateMachine::with_standard_handlers(StateContext::new(options, connections));
    machine.run()
}

/// Same as [`run_import`] with timing taken from the tuning config
pub fn run_import_with_config<C: Connector + 'static>(
    options: RunOptions,
    connector: C,
    config: &AppConfig,
) -> Result<ImportResult, StateMachineError> {
    run_import(
        options,
        connector,
        RetryConfig::from(&config.import),
        Spinner::new(config.import.progress),
    )
}

/// Print the final message on stdout and exit with its code
pub fn print_result_and_exit(result: &ImportResult) -> ! {
    println!("{result}");
    process::exit(result.exit_code);
}

/// Print an error on stderr and exit
pub fn print_error_and_exit(context: &str, error: &dyn std::error::Error) -> ! {
    eprintln!("{context}: {error}");
    process::exit(1);
}
