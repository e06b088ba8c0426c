//! Common test utilities and mock implementations

#![allow(dead_code)]

pub mod mock_bus;

pub use mock_bus::{MockBus, Operation};

use std::io::Write;
use std::path::PathBuf;

/// Write `contents` to a fresh file inside `dir`
pub fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}
