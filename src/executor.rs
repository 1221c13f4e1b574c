//! # Statement execution
//!
//! Streams a dump line by line and runs each `;`-terminated statement.
//! No transaction wraps the import; statements that ran before a failure stay.

use crate::cli::SqlFile;
use crate::connection::Session;
use crate::errors::ImportError;
use crate::lock_file::LockFile;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

const COMMENT_MARKER: &[u8] = b"--";

/// Yields complete statements from a line-oriented SQL stream.
///
/// Lines that are empty or start with `--` are dropped. A statement ends at a
/// line whose right-trimmed text ends in `;`. Whatever is left at the end of
/// the stream comes out as a final statement.
pub struct StatementSplitter<R> {
    reader: R,
    line: Vec<u8>,
    done: bool,
}

impl<R: BufRead> StatementSplitter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            done: false,
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl<R: BufRead> Iterator for StatementSplitter<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut statement = String::new();
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.done = true;
                    return (!statement.trim().is_empty()).then_some(Ok(statement));
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }

            let line = strip_line_ending(&self.line);
            if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }

            let text = String::from_utf8_lossy(line);
            statement.push_str(&text);
            statement.push('\n');

            if text.trim_end().ends_with(';') {
                return Some(Ok(statement));
            }
        }
    }
}

/// Import `sql_file` into `database`, returning the success message.
///
/// Selects the database once, runs every statement in order and stops at the
/// first failure. Writes the lock file once everything ran.
pub fn import<S: Session + ?Sized>(
    session: &mut S,
    database: &str,
    sql_file: &SqlFile,
) -> Result<String, ImportError> {
    let path = match sql_file {
        SqlFile::Path(path) => path,
        SqlFile::NoFile | SqlFile::Missing => return Ok("blank database is ready.".to_string()),
    };

    session.use_database(database)?;

    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.clone(),
        source,
    })?;
    let executed = execute_statements(session, BufReader::new(file), path)?;
    info!(database, statements = executed, "import finished");

    if let Some(lock_path) = sql_file.lock_path() {
        write_lock(&lock_path, database);
    }

    Ok(format!("database named '{database}' successfully imported."))
}

/// Run every statement from `reader`; returns how many were executed
pub fn execute_statements<S: Session + ?Sized, R: BufRead>(
    session: &mut S,
    reader: R,
    path: &Path,
) -> Result<usize, ImportError> {
    let mut executed = 0;
    for statement in StatementSplitter::new(reader) {
        let statement = statement.map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(index = executed, "executing statement");
        session.execute(&statement)?;
        executed += 1;
    }
    Ok(executed)
}

fn write_lock(lock_path: &Path, database: &str) {
    if let Err(e) = LockFile::new(database).write(lock_path) {
        warn!(path = %lock_path.display(), "failed to write lock file: {e}");
    }
}
