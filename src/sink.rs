//! Delivery of scan outcomes to caller-owned consumers.
//!
//! [`dispatch`] routes a decode result to a [`ResultSink`]. [`AppendLog`] is a
//! sink that appends payloads to a text file, suppressing repeats according to
//! its [`DedupPolicy`]; the memory of what was written lives in the value, not
//! in process globals.

use crate::error::{DecodeError, ErrorKind};
use crate::models::DecodedSymbol;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Consumer of scan outcomes
pub trait ResultSink {
    /// Called once per decoded symbol, in reading order
    fn on_result(&mut self, symbol: &DecodedSymbol);

    /// Called when a frame decoded cleanly but held no symbol
    fn on_no_result(&mut self) {
        log::debug!("No barcode has been detected");
    }

    /// Called when the whole call failed
    fn on_error(&mut self, kind: ErrorKind, error: &DecodeError) {
        log::debug!("scan failed ({kind:?}): {error}");
    }
}

/// Route `outcome` to the matching sink callbacks
pub fn dispatch<S: ResultSink + ?Sized>(
    outcome: &Result<Vec<DecodedSymbol>, DecodeError>,
    sink: &mut S,
) {
    match outcome {
        Ok(symbols) if symbols.is_empty() => sink.on_no_result(),
        Ok(symbols) => symbols.iter().for_each(|s| sink.on_result(s)),
        Err(e) => sink.on_error(e.kind(), e),
    }
}

/// Which repeated payloads an [`AppendLog`] skips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Skip a payload equal to the one written just before it
    #[default]
    Consecutive,
    /// Skip any payload already written since the log was opened or cleared
    Distinct,
}

impl std::str::FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "consecutive" => Ok(DedupPolicy::Consecutive),
            "distinct" => Ok(DedupPolicy::Distinct),
            other => Err(format!("unknown dedup policy '{other}'")),
        }
    }
}

/// Payload log appended one line per new result
#[derive(Debug)]
pub struct AppendLog {
    path: PathBuf,
    policy: DedupPolicy,
    last: Option<Vec<u8>>,
    seen: HashSet<Vec<u8>>,
}

impl AppendLog {
    /// Log writing to `path` (created on first write)
    pub fn new(path: impl Into<PathBuf>, policy: DedupPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            last: None,
            seen: HashSet::new(),
        }
    }

    /// File backing this log
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `payload` unless the policy marks it as a repeat; returns whether it was written
    pub fn record(&mut self, payload: &[u8]) -> io::Result<bool> {
        let repeat = match self.policy {
            DedupPolicy::Consecutive => self.last.as_deref() == Some(payload),
            DedupPolicy::Distinct => self.seen.contains(payload),
        };
        if repeat {
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(payload)?;
        file.write_all(b"\n")?;

        self.last = Some(payload.to_vec());
        if self.policy == DedupPolicy::Distinct {
            self.seen.insert(payload.to_vec());
        }
        Ok(true)
    }

    /// Truncate the file and forget what was written
    pub fn clear(&mut self) -> io::Result<()> {
        fs::write(&self.path, b"")?;
        self.last = None;
        self.seen.clear();
        Ok(())
    }

    /// Lines currently in the file; a missing file reads as empty
    pub fn read_lines(&self) -> io::Result<Vec<String>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_owned)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

impl ResultSink for AppendLog {
    fn on_result(&mut self, symbol: &DecodedSymbol) {
        if let Err(e) = self.record(&symbol.payload) {
            log::error!("File write failed: {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BarcodeFormat, Point, SymbolKind};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_path() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("rust_barcode_log_{nanos}_{sequence}.txt"))
    }

    fn symbol(payload: &[u8]) -> DecodedSymbol {
        DecodedSymbol {
            kind: SymbolKind::Linear,
            format: BarcodeFormat::Ean13,
            payload: payload.to_vec(),
            error_correction: None,
            corrected_bytes: 0,
            polygon: [Point::default(); 4],
            confidence: 1.0,
            version: None,
            eci: None,
        }
    }

    #[derive(Default)]
    struct Recorder {
        results: Vec<Vec<u8>>,
        empty: usize,
        errors: Vec<ErrorKind>,
    }

    impl ResultSink for Recorder {
        fn on_result(&mut self, symbol: &DecodedSymbol) {
            self.results.push(symbol.payload.clone());
        }
        fn on_no_result(&mut self) {
            self.empty += 1;
        }
        fn on_error(&mut self, kind: ErrorKind, _error: &DecodeError) {
            self.errors.push(kind);
        }
    }

    #[test]
    fn test_dispatch_routes_outcomes() {
        let mut sink = Recorder::default();
        dispatch(&Ok(vec![symbol(b"1"), symbol(b"2")]), &mut sink);
        dispatch(&Ok(Vec::new()), &mut sink);
        dispatch(&Err(DecodeError::InvalidInput("bad".into())), &mut sink);
        assert_eq!(sink.results, vec![b"1".to_vec(), b"2".to_vec()]);
        assert_eq!(sink.empty, 1);
        assert_eq!(sink.errors, vec![ErrorKind::InvalidInput]);
    }

    #[test]
    fn test_consecutive_policy() {
        let path = temp_path();
        let mut log = AppendLog::new(&path, DedupPolicy::Consecutive);
        for payload in [b"A", b"A", b"B", b"A"] {
            dispatch(&Ok(vec![symbol(payload)]), &mut log);
        }
        assert_eq!(log.read_lines().unwrap(), vec!["A", "B", "A"]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_distinct_policy_and_clear() {
        let path = temp_path();
        let mut log = AppendLog::new(&path, DedupPolicy::Distinct);
        for payload in [b"A", b"B", b"A"] {
            log.record(payload).unwrap();
        }
        assert_eq!(log.read_lines().unwrap(), vec!["A", "B"]);

        log.clear().unwrap();
        assert!(log.read_lines().unwrap().is_empty());
        assert!(log.record(b"A").unwrap());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let log = AppendLog::new(temp_path(), DedupPolicy::default());
        assert!(log.read_lines().unwrap().is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Distinct".parse::<DedupPolicy>(), Ok(DedupPolicy::Distinct));
        assert!("sometimes".parse::<DedupPolicy>().is_err());
    }
}
