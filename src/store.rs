// Gastos Bot - Ledger Store
// Append-only persistence for financial records

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::FinancialRecord;

// ============================================================================
// ERRORS
// ============================================================================

/// LedgerError - what went wrong while touching the backing store
///
/// Callers branch on the variant; the webhook handler collapses both into a
/// single "save failed" outcome.
#[derive(Debug)]
pub enum LedgerError {
    /// The existing table could not be read (store left untouched)
    Read(anyhow::Error),
    /// The new table or row could not be written
    Write(anyhow::Error),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Read(e) => write!(f, "ledger read failed: {:#}", e),
            LedgerError::Write(e) => write!(f, "ledger write failed: {:#}", e),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Read(e) | LedgerError::Write(e) => Some(e.as_ref()),
        }
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// LedgerStore - the two operations the rest of the system needs
///
/// The ledger is an ordered append-only sequence; no field is unique and no
/// row is ever edited. Implementations: CsvLedger (local file) and
/// SheetLedger (remote row-append service).
pub trait LedgerStore: Send + Sync {
    /// Durably append one record as the last row
    fn append(&self, record: &FinancialRecord) -> Result<(), LedgerError>;

    /// Read the whole ledger in append order. A store that does not exist
    /// yet reads as empty.
    fn read_all(&self) -> Result<Vec<FinancialRecord>, LedgerError>;
}

// ============================================================================
// CSV LEDGER (file-backed)
// ============================================================================

/// File-backed ledger: one CSV file, header row plus one row per record.
///
/// Append is read-modify-write without locking: two concurrent appends can
/// both read the same table and the second write wins, discarding the first
/// row. Accepted limitation of the file backend; the remote backend
/// delegates ordering to the service and does not have the race.
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvLedger { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<FinancialRecord>> {
        let mut rdr = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open ledger file: {}", self.path.display()))?;

        let mut records = Vec::new();
        for (line_num, result) in rdr.deserialize().enumerate() {
            let record: FinancialRecord = result
                .with_context(|| format!("Failed to parse ledger row {}", line_num + 2))?;
            records.push(record);
        }

        Ok(records)
    }

    /// Write the full table to a sibling temp file, then rename it over the
    /// original, so a failed write never leaves a truncated table behind.
    pub(crate) fn write_table(&self, records: &[FinancialRecord]) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");

        let mut wtr = csv::Writer::from_path(&tmp_path)
            .with_context(|| format!("Failed to create ledger file: {}", tmp_path.display()))?;
        for record in records {
            wtr.serialize(record).context("Failed to write ledger row")?;
        }
        wtr.flush().context("Failed to flush ledger file")?;
        drop(wtr);

        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace ledger file: {}", self.path.display()))
    }
}

impl LedgerStore for CsvLedger {
    fn append(&self, record: &FinancialRecord) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create ledger dir: {}", parent.display()))
                    .map_err(LedgerError::Write)?;
            }
        }

        // Read BEFORE any destructive write: if the existing table cannot be
        // parsed, the append aborts with the previous file untouched.
        let mut records = if self.path.exists() {
            self.load().map_err(LedgerError::Read)?
        } else {
            Vec::new()
        };

        records.push(record.clone());
        self.write_table(&records).map_err(LedgerError::Write)
    }

    fn read_all(&self) -> Result<Vec<FinancialRecord>, LedgerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        self.load().map_err(LedgerError::Read)
    }
}
