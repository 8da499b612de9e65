//! Input data handling for cache simulation
//!
//! Reads cache request logs (`timestamp,key,size` CSV with a header row)
//! from every `.csv` and `.log` file of a directory. Requests are streamed
//! one at a time, so memory stays proportional to a single row.

use crate::models::Request;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Error types for log parsing
#[derive(Debug)]
pub enum LogParseError {
    Io(io::Error),
    Glob(glob::PatternError),
    Csv { path: PathBuf, source: csv::Error },
}

impl fmt::Display for LogParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogParseError::Io(e) => write!(f, "I/O error: {e}"),
            LogParseError::Glob(e) => write!(f, "invalid input pattern: {e}"),
            LogParseError::Csv { path, source } => {
                write!(f, "malformed log {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LogParseError {}

impl From<io::Error> for LogParseError {
    fn from(err: io::Error) -> Self {
        LogParseError::Io(err)
    }
}

impl From<glob::PatternError> for LogParseError {
    fn from(err: glob::PatternError) -> Self {
        LogParseError::Glob(err)
    }
}

/// Reader for cache request logs
pub struct LogReader {
    input_dir: PathBuf,
}

impl LogReader {
    /// Create a new reader for the given input directory
    pub fn new<P: AsRef<Path>>(input_dir: P) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
        }
    }

    /// Get all log files in the input directory, sorted by name
    pub fn get_log_files(&self) -> Result<Vec<PathBuf>, LogParseError> {
        let mut log_files = Vec::new();
        for ext in ["csv", "log"] {
            let pattern = self.input_dir.join(format!("*.{ext}"));
            for entry in glob::glob(&pattern.to_string_lossy())? {
                match entry {
                    Ok(path) if path.is_file() => log_files.push(path),
                    Ok(_) => {}
                    Err(e) => return Err(LogParseError::Io(e.into_error())),
                }
            }
        }

        // Sort files by name for consistent ordering
        log_files.sort();
        Ok(log_files)
    }

    /// Parse every log file into memory
    pub fn parse_all_files(&self) -> Result<Vec<Request>, LogParseError> {
        self.stream_requests()?.collect()
    }

    /// Create a streaming iterator over all requests in all log files.
    pub fn stream_requests(&self) -> Result<RequestIterator, LogParseError> {
        let log_files = self.get_log_files()?;
        Ok(RequestIterator::new(log_files))
    }
}

/// Iterator that streams requests from multiple log files
pub struct RequestIterator {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<(PathBuf, csv::DeserializeRecordsIntoIter<File, Request>)>,
}

impl RequestIterator {
    fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
        }
    }

    fn open(path: PathBuf) -> Result<(PathBuf, csv::DeserializeRecordsIntoIter<File, Request>), LogParseError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_path(&path)
            .map_err(|source| LogParseError::Csv {
                path: path.clone(),
                source,
            })?;
        Ok((path, reader.into_deserialize()))
    }
}

impl Iterator for RequestIterator {
    type Item = Result<Request, LogParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let path = self.files.next()?;
                match Self::open(path) {
                    Ok(current) => self.current = Some(current),
                    Err(e) => return Some(Err(e)),
                }
            }

            if let Some((path, records)) = &mut self.current {
                match records.next() {
                    Some(Ok(request)) => return Some(Ok(request)),
                    Some(Err(source)) => {
                        return Some(Err(LogParseError::Csv {
                            path: path.clone(),
                            source,
                        }))
                    }
                    // EOF on current file, move to next
                    None => self.current = None,
                }
            }
        }
    }
}
