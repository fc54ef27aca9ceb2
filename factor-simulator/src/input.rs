//! Input data handling for factorizer simulation
//!
//! Reads a workload file with one raw request parameter per line. Lines are
//! taken verbatim apart from the line terminator, so malformed parameters
//! reach the factorizer exactly as written.
//!
//! - an empty line is a request without a parameter
//! - a line starting with `#` is a comment

use crate::models::Request;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Error types for workload parsing
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("failed to read workload {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("workload {0} contains no requests")]
    Empty(PathBuf),
}

/// Reader for workload files
pub struct WorkloadReader {
    path: PathBuf,
}

impl WorkloadReader {
    /// Create a new reader for the given file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parse a single line into a request
    fn parse_line(line: &str) -> Option<Request> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.starts_with('#') {
            None
        } else if line.is_empty() {
            Some(Request::absent())
        } else {
            Some(Request::new(line))
        }
    }

    /// Read every request from the file
    pub fn read(&self) -> Result<Vec<Request>, WorkloadError> {
        let io_err = |source| WorkloadError::Io {
            path: self.path.clone(),
            source,
        };

        let file = File::open(&self.path).map_err(io_err)?;
        let reader = BufReader::new(file);

        let mut requests = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(io_err)?;
            if let Some(request) = Self::parse_line(&line) {
                requests.push(request);
            }
        }

        if requests.is_empty() {
            return Err(WorkloadError::Empty(self.path.clone()));
        }

        debug!(path = %self.path.display(), requests = requests.len(), "workload loaded");
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "factor-simulator-{}-{name}",
            std::process::id()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(WorkloadReader::parse_line("12"), Some(Request::new("12")));
        assert_eq!(WorkloadReader::parse_line("12\r"), Some(Request::new("12")));
        assert_eq!(WorkloadReader::parse_line(" 12"), Some(Request::new(" 12")));
        assert_eq!(WorkloadReader::parse_line(""), Some(Request::absent()));
        assert_eq!(WorkloadReader::parse_line("# comment"), None);
    }

    #[test]
    fn test_read_file() {
        let path = write_temp("read", "# header\n12\n\nabc\n97\n");
        let requests = WorkloadReader::new(&path).read().unwrap();
        assert_eq!(
            requests,
            vec![
                Request::new("12"),
                Request::absent(),
                Request::new("abc"),
                Request::new("97"),
            ]
        );
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_errors() {
        let path = write_temp("empty", "# only a comment\n");
        assert!(matches!(
            WorkloadReader::new(&path).read(),
            Err(WorkloadError::Empty(_))
        ));
        std::fs::remove_file(path).unwrap();

        let missing = std::env::temp_dir().join("factor-simulator-does-not-exist");
        assert!(matches!(
            WorkloadReader::new(missing).read(),
            Err(WorkloadError::Io { .. })
        ));
    }
}
