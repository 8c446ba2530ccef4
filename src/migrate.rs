// Gastos Bot - Legacy Schema Migration
// One-time conversion of old spreadsheet exports to the canonical layout

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::path::Path;

use crate::record::{FinancialRecord, RecordKind, LEDGER_COLUMNS, LEGACY_COLUMNS};
use crate::store::CsvLedger;

/// What the migration found at the given path
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationOutcome {
    /// File already carries the canonical header; nothing written
    AlreadyCanonical,
    /// File was rewritten; number of data rows converted
    Migrated(usize),
}

/// Convert a legacy ledger file to the canonical schema, in place.
///
/// Legacy exports used the Data/Tipo/Valor/Categoria header (one batch in
/// upper case), localized kind values and space-separated timestamps. The
/// whole file must parse before anything is written; a bad row aborts the
/// migration with the original untouched.
pub fn migrate_file(path: &Path) -> Result<MigrationOutcome> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open ledger file: {}", path.display()))?;

    let headers = rdr
        .headers()
        .context("Failed to read ledger header row")?
        .clone();

    if is_canonical_header(&headers) {
        return Ok(MigrationOutcome::AlreadyCanonical);
    }
    if !is_legacy_header(&headers) {
        bail!(
            "Unrecognized ledger header: {:?} (expected {:?} or a legacy {:?})",
            headers,
            LEDGER_COLUMNS,
            LEGACY_COLUMNS
        );
    }

    let mut records = Vec::new();
    for (line_num, result) in rdr.records().enumerate() {
        let row = result
            .with_context(|| format!("Failed to read legacy row {}", line_num + 2))?;
        let record = parse_legacy_row(&row)
            .with_context(|| format!("Failed to convert legacy row {}", line_num + 2))?;
        records.push(record);
    }

    CsvLedger::new(path).write_table(&records)?;
    Ok(MigrationOutcome::Migrated(records.len()))
}

fn is_canonical_header(headers: &csv::StringRecord) -> bool {
    headers.len() == LEDGER_COLUMNS.len()
        && headers.iter().zip(LEDGER_COLUMNS.iter()).all(|(h, want)| h == *want)
}

fn is_legacy_header(headers: &csv::StringRecord) -> bool {
    headers.len() == LEGACY_COLUMNS.len()
        && headers
            .iter()
            .zip(LEGACY_COLUMNS.iter())
            .all(|(h, want)| h.eq_ignore_ascii_case(want))
}

fn parse_legacy_row(row: &csv::StringRecord) -> Result<FinancialRecord> {
    if row.len() < 4 {
        bail!("Row has {} columns, expected 4", row.len());
    }

    let timestamp = parse_legacy_timestamp(row[0].trim())?;
    let kind = RecordKind::from_keyword(row[1].trim().to_lowercase().as_str())
        .ok_or_else(|| anyhow!("Unknown kind value: {}", &row[1]))?;
    let amount: f64 = row[2]
        .trim()
        .replace(',', ".")
        .parse()
        .with_context(|| format!("Bad amount value: {}", &row[2]))?;
    let category = row[3].trim().to_string();

    Ok(FinancialRecord::new(timestamp, kind, amount, category))
}

/// Legacy files carry pandas-style timestamps ("2025-03-14 12:00:00.123456");
/// RFC 3339 is accepted too so a half-migrated row does not wedge the file.
fn parse_legacy_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    bail!("Unrecognized timestamp: {}", raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LedgerStore;
    use chrono::Timelike;

    #[test]
    fn test_migrate_legacy_mixed_case_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gastos.csv");
        std::fs::write(
            &path,
            "Data,Tipo,Valor,Categoria\n\
             2025-03-14 12:00:00,gasto,45.9,mercado\n\
             2025-03-15 08:30:00.500000,receita,2000,salario\n",
        )
        .unwrap();

        let outcome = migrate_file(&path).unwrap();
        assert_eq!(outcome, MigrationOutcome::Migrated(2));

        let records = CsvLedger::new(&path).read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, RecordKind::Expense);
        assert_eq!(records[0].amount, 45.9);
        assert_eq!(records[0].category, "mercado");
        assert_eq!(records[0].timestamp.hour(), 12);
        assert_eq!(records[1].kind, RecordKind::Income);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("timestamp,kind,amount,category\n"));
    }

    #[test]
    fn test_migrate_legacy_uppercase_header_and_comma_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gastos.csv");
        std::fs::write(
            &path,
            "DATA,TIPO,VALOR,CATEGORIA\n2025-03-14 12:00:00,GASTO,\"45,9\",mercado\n",
        )
        .unwrap();

        let outcome = migrate_file(&path).unwrap();
        assert_eq!(outcome, MigrationOutcome::Migrated(1));

        let records = CsvLedger::new(&path).read_all().unwrap();
        assert_eq!(records[0].amount, 45.9);
    }

    #[test]
    fn test_migrate_canonical_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gastos.csv");
        let contents = "timestamp,kind,amount,category\n2025-03-14T12:00:00Z,expense,45.9,mercado\n";
        std::fs::write(&path, contents).unwrap();

        let outcome = migrate_file(&path).unwrap();
        assert_eq!(outcome, MigrationOutcome::AlreadyCanonical);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_migrate_unknown_header_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gastos.csv");
        std::fs::write(&path, "when,what,how much,why\n").unwrap();

        assert!(migrate_file(&path).is_err());
    }

    #[test]
    fn test_bad_row_aborts_with_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gastos.csv");
        let contents = "Data,Tipo,Valor,Categoria\n\
                        2025-03-14 12:00:00,gasto,45.9,mercado\n\
                        2025-03-15 08:30:00,emprestimo,10,banco\n";
        std::fs::write(&path, contents).unwrap();

        assert!(migrate_file(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }
}
