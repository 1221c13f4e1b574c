use std::fmt;
use std::path::Path;
use crate::errors::ConnectError;

/// Success, or a refusal the caller should not treat as a crash.
/// Query failures share this code.
pub const EXIT_OK: i32 = 0;
/// The admin connection could not be established
pub const EXIT_CONNECTION: i32 = 1;
/// Bad command line
pub const EXIT_USAGE: i32 = 2;

/// Final message and process exit code of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub message: String,
    pub exit_code: i32,
}

impl ImportResult {
    /// The first letter of `message` is upper-cased
    pub fn new(message: impl AsRef<str>, exit_code: i32) -> Self {
        Self {
            message: capitalize(message.as_ref()),
            exit_code,
        }
    }

    pub fn ok(message: impl AsRef<str>) -> Self {
        Self::new(message, EXIT_OK)
    }

    pub fn unknown_option(argument: &str) -> Self {
        Self::new(format!("unknown option '{argument}'."), EXIT_USAGE)
    }

    pub fn invalid_port(port: &str) -> Self {
        Self::new(format!("invalid port '{port}'."), EXIT_USAGE)
    }

    pub fn missing_sql_file() -> Self {
        Self::ok("required sql file to import.")
    }

    pub fn sql_file_not_found(path: &Path) -> Self {
        Self::ok(format!("sql file '{}' not found.", path.display()))
    }

    pub fn database_not_blank() -> Self {
        Self::ok("required blank database for import.")
    }

    pub fn missing_root_password() -> Self {
        Self::ok("required at least root password.")
    }

    pub fn connection_problem(user: &str, host: &str, error: &ConnectError) -> Self {
        Self::new(
            format!(
                "connection problem for '{user}' on '{host}' with error: {} ({}).",
                error.message, error.code
            ),
            EXIT_CONNECTION,
        )
    }
}

impl fmt::Display for ImportResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CR_CONN_HOST_ERROR, ConnectErrorKind};

    #[test]
    fn test_messages_are_capitalized() {
        assert_eq!(ImportResult::ok("blank database is ready.").message, "Blank database is ready.");
        assert_eq!(ImportResult::ok("").message, "");
        assert_eq!(ImportResult::ok("émigré").message, "Émigré");
    }

    #[test]
    fn test_unknown_option_is_usage_error() {
        let result = ImportResult::unknown_option("-kWrong");
        assert_eq!(result.message, "Unknown option '-kWrong'.");
        assert_eq!(result.exit_code, EXIT_USAGE);
    }

    #[test]
    fn test_connection_problem_carries_code() {
        let error = ConnectError::new(ConnectErrorKind::Unreachable, CR_CONN_HOST_ERROR, "Connection refused");
        let result = ImportResult::connection_problem("root", "mysql", &error);
        assert_eq!(
            result.message,
            "Connection problem for 'root' on 'mysql' with error: Connection refused (2003)."
        );
        assert_eq!(result.exit_code, EXIT_CONNECTION);
    }
}
