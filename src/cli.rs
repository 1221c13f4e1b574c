//! # Command line and environment resolution
//!
//! Turns the raw argument list and environment map into an immutable
//! [`RunOptions`]. Each connection field is resolved as
//! default < environment aliases (in order) < `-<code><value>` flag.

use clap::Parser;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "mysql";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_DATABASE: &str = "database";
pub const WORDPRESS_DATABASE: &str = "wordpress";

const FORCE_FLAG: &str = "--force";
const NO_FILE_FLAG: &str = "--no-file";
const DO_WHILE_FLAG: &str = "--do-while";

/// Raw argument capture. Interpretation happens in [`RunOptions::resolve`]
/// because flags take their value glued on (`-hdb`, `-uadmin`) and `-h`
/// means host, not help.
#[derive(Parser, Debug, Clone)]
#[command(name = "mysql-import")]
#[command(about = "Import a SQL dump into a MySQL database, creating it when absent")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// SQL file, -h<host> -P<port> -d<database> -u<user> -p<password>,
    /// --force, --no-file, --do-while
    #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
    pub args: Vec<String>,
}

/// Where the server lives and which database to fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<String>,
    pub admin_password: Option<String>,
}

/// The dump to import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlFile {
    /// No positional argument was given
    Missing,
    Path(PathBuf),
    /// `--no-file`: only make sure a blank database exists
    NoFile,
}

impl SqlFile {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SqlFile::Path(path) => Some(path),
            _ => None,
        }
    }

    /// `<file>.lock`, next to the dump
    pub fn lock_path(&self) -> Option<PathBuf> {
        self.path().map(|path| {
            let mut lock = path.as_os_str().to_owned();
            lock.push(".lock");
            PathBuf::from(lock)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub target: ConnectionTarget,
    pub credentials: Credentials,
    pub sql_file: SqlFile,
    pub force: bool,
    pub retry_until_ready: bool,
    /// First argument nothing claimed
    pub unrecognized_argument: Option<String>,
    /// Port value that is not a number in 1..=65535
    pub invalid_port: Option<String>,
}

/// One settable field: built-in default, env aliases in ascending priority,
/// and an optional CLI prefix.
struct FieldSource {
    default: Option<&'static str>,
    flag: Option<&'static str>,
    env: &'static [&'static str],
}

const HOST: FieldSource = FieldSource {
    default: Some(DEFAULT_HOST),
    flag: Some("-h"),
    env: &["MYSQL_HOST", "DB_HOST", "WORDPRESS_DB_HOST"],
};
const PORT: FieldSource = FieldSource {
    default: Some("3306"),
    flag: Some("-P"),
    env: &["MYSQL_PORT", "DB_PORT"],
};
const DATABASE: FieldSource = FieldSource {
    default: None,
    flag: Some("-d"),
    env: &["MYSQL_DATABASE", "DB_NAME", "WORDPRESS_DB_NAME"],
};
const USER: FieldSource = FieldSource {
    default: None,
    flag: Some("-u"),
    env: &["MYSQL_USER", "DB_USER", "WORDPRESS_DB_USER"],
};
const PASSWORD: FieldSource = FieldSource {
    default: None,
    flag: Some("-p"),
    env: &["MYSQL_PASSWORD", "DB_PASSWORD", "WORDPRESS_DB_PASSWORD"],
};
const ADMIN_PASSWORD: FieldSource = FieldSource {
    default: None,
    flag: None,
    env: &["MYSQL_ROOT_PASSWORD", "DB_ROOT_PASSWORD"],
};

impl FieldSource {
    fn resolve(&self, env: &HashMap<String, String>, args: &mut Vec<String>) -> Option<String> {
        let mut value = self.default.map(str::to_string);

        for name in self.env {
            if let Some(found) = env.get(*name).filter(|v| !v.is_empty()) {
                value = Some(found.clone());
            }
        }

        if let Some(flag) = self.flag {
            let mut from_cli = None;
            args.retain(|arg| match arg.strip_prefix(flag) {
                Some(rest) if !arg.starts_with("--") => {
                    from_cli = Some(rest.to_string());
                    false
                }
                _ => true,
            });
            if let Some(cli) = from_cli.filter(|v| !v.is_empty()) {
                value = Some(cli);
            }
        }

        value
    }
}

/// Remove every occurrence of a boolean flag, reporting whether it was there
fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|arg| arg != flag);
    args.len() != before
}

/// Split a trailing `:<digits>` off the host
fn split_host_port(host: &str) -> Option<(&str, &str)> {
    let (name, port) = host.rsplit_once(':')?;
    if name.is_empty()
        || name.contains(':')
        || port.is_empty()
        || !port.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((name, port))
}

fn parse_port(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

impl RunOptions {
    /// Resolve options from an environment map and the arguments after the
    /// program name. Pure: no I/O, same inputs give the same result.
    pub fn resolve<I, S>(env: &HashMap<String, String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();

        let retry_until_ready = take_flag(&mut args, DO_WHILE_FLAG);
        let force = take_flag(&mut args, FORCE_FLAG);
        let no_file = take_flag(&mut args, NO_FILE_FLAG);

        let default_database = if env.contains_key("WORDPRESS_DB_PASSWORD") {
            WORDPRESS_DATABASE
        } else {
            DEFAULT_DATABASE
        };

        let host = HOST.resolve(env, &mut args).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = PORT.resolve(env, &mut args).unwrap_or_else(|| DEFAULT_PORT.to_string());
        let database = DATABASE
            .resolve(env, &mut args)
            .unwrap_or_else(|| default_database.to_string());
        let user = USER.resolve(env, &mut args);
        let password = PASSWORD.resolve(env, &mut args);
        let admin_password = ADMIN_PASSWORD.resolve(env, &mut args).or_else(|| password.clone());

        let sql_file = if no_file {
            SqlFile::NoFile
        } else {
            match args.iter().position(|arg| !arg.starts_with('-')) {
                Some(index) => SqlFile::Path(PathBuf::from(args.remove(index).trim())),
                None => SqlFile::Missing,
            }
        };

        let (host, port) = match split_host_port(&host) {
            Some((name, port)) => (name.to_string(), port.to_string()),
            None => (host, port),
        };
        let (port, invalid_port) = match parse_port(&port) {
            Some(port) => (port, None),
            None => (DEFAULT_PORT, Some(port)),
        };

        Self {
            target: ConnectionTarget { host, port, database },
            credentials: Credentials {
                user,
                password,
                admin_password,
            },
            sql_file,
            force,
            retry_until_ready,
            unrecognized_argument: args.into_iter().next(),
            invalid_port,
        }
    }
}

impl Cli {
    /// Parse the process arguments and resolve them against `env`
    pub fn resolve(self, env: &HashMap<String, String>) -> RunOptions {
        RunOptions::resolve(env, self.args)
    }
}
