use clap::Parser;
use mysql_import::{
    AppConfig, Cli, LogConfig, MysqlConnector, env_map, init_logging, print_error_and_exit,
    print_result_and_exit, run_import_with_config,
};
use tracing::debug;

fn main() {
    let cli = Cli::parse();
    let env = env_map();

    let config = match AppConfig::from_env(&env) {
        Ok(config) => config,
        Err(e) => print_error_and_exit("Invalid configuration", &e),
    };
    if let Err(e) = init_logging(LogConfig::from_config(&config.logging)) {
        print_error_and_exit("Failed to initialize logging", &e);
    }

    let options = cli.resolve(&env);
    debug!(
        host = %options.target.host,
        port = options.target.port,
        database = %options.target.database,
        "resolved options"
    );

    let connector = MysqlConnector::new(config.import.connect_timeout());
    match run_import_with_config(options, connector, &config) {
        Ok(result) => print_result_and_exit(&result),
        Err(e) => print_error_and_exit("Import failed", &e),
    }
}
