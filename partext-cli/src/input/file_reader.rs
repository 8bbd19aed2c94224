//! Byte sources for the pipeline

use crate::error::CliError;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Where the input stream comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input
    Stdin,
    /// A file on disk
    File(PathBuf),
}

impl InputSource {
    /// Standard input for `None` or `-`, otherwise the named file
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            None => InputSource::Stdin,
            Some(p) if p.as_os_str() == "-" => InputSource::Stdin,
            Some(p) => InputSource::File(p.to_path_buf()),
        }
    }

    /// Open the source for streaming reads
    pub fn open(&self) -> Result<Box<dyn Read + Send>> {
        match self {
            InputSource::Stdin => Ok(Box::new(io::stdin())),
            InputSource::File(path) => {
                if !path.exists() {
                    return Err(CliError::FileNotFound(path.display().to_string()).into());
                }
                let file = File::open(path)
                    .with_context(|| format!("Failed to open input: {}", path.display()))?;
                Ok(Box::new(file))
            }
        }
    }

    /// Display name for log messages
    pub fn name(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_arg() {
        assert_eq!(InputSource::from_arg(None), InputSource::Stdin);
        assert_eq!(InputSource::from_arg(Some(Path::new("-"))), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg(Some(Path::new("in.txt"))),
            InputSource::File(PathBuf::from("in.txt"))
        );
    }

    #[test]
    fn test_open_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("records.txt");
        fs::write(&file_path, "A>one\n").unwrap();

        let mut content = String::new();
        InputSource::File(file_path)
            .open()
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "A>one\n");
    }

    #[test]
    fn test_open_nonexistent_file() {
        let source = InputSource::File(PathBuf::from("/nonexistent/records.txt"));
        let err = source.open().err().unwrap();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_name() {
        assert_eq!(InputSource::Stdin.name(), "<stdin>");
        assert_eq!(InputSource::File(PathBuf::from("a.txt")).name(), "a.txt");
    }
}
