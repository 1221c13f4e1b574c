use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io;
use std::path::Path;

/// Marker left next to a dump after it was imported in full
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    pub database: String,
}

impl LockFile {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }

    /// Pretty JSON with four-space indentation
    pub fn to_json(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer).map_err(io::Error::other)?;
        Ok(buf)
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_json()?)
    }

    pub fn read(path: &Path) -> io::Result<Self> {
        let content = std::fs::read(path)?;
        serde_json::from_slice(&content).map_err(io::Error::other)
    }

    /// Delete a lock left by an earlier run. Returns whether one existed.
    pub fn remove_stale(path: &Path) -> io::Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
