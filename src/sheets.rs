// Gastos Bot - Remote Sheet Ledger
// Row-append client for a hosted spreadsheet service

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::record::{FinancialRecord, RecordKind};
use crate::store::{LedgerError, LedgerStore};

/// Bounded timeout for remote calls; a hung service reads as a save failure
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// WIRE TYPES
// ============================================================================

/// One row on the wire: all four cells as strings, the way sheet services
/// take them
#[derive(Debug, Serialize)]
struct AppendRequest {
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<Vec<String>>,
}

// ============================================================================
// SHEET LEDGER
// ============================================================================

/// SheetLedger - remote-service-backed ledger
///
/// The service owns row ordering, so append is a single POST with the record
/// serialized as (timestamp, kind, amount, category). No local
/// read-modify-write, and no two-writer race.
pub struct SheetLedger {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl SheetLedger {
    pub fn new(base_url: String, token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(SheetLedger {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn rows_url(&self) -> String {
        format!("{}/rows", self.base_url)
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Serialize a record as the four sheet cells
fn record_to_row(record: &FinancialRecord) -> Vec<String> {
    vec![
        record.timestamp.to_rfc3339(),
        record.kind.name().to_string(),
        record.amount.to_string(),
        record.category.clone(),
    ]
}

/// Parse one sheet row back into a record
fn row_to_record(row: &[String]) -> Result<FinancialRecord> {
    if row.len() < 4 {
        bail!("Row has {} cells, expected 4", row.len());
    }

    let timestamp = DateTime::parse_from_rfc3339(&row[0])
        .with_context(|| format!("Bad timestamp cell: {}", row[0]))?
        .with_timezone(&Utc);
    let kind = RecordKind::from_keyword(&row[1].to_lowercase())
        .ok_or_else(|| anyhow!("Bad kind cell: {}", row[1]))?;
    let amount: f64 = row[2]
        .parse()
        .with_context(|| format!("Bad amount cell: {}", row[2]))?;

    Ok(FinancialRecord::new(timestamp, kind, amount, row[3].clone()))
}

impl LedgerStore for SheetLedger {
    fn append(&self, record: &FinancialRecord) -> Result<(), LedgerError> {
        let body = AppendRequest {
            values: record_to_row(record),
        };

        let result = (|| -> Result<()> {
            let response = self
                .authorize(self.client.post(self.rows_url()))
                .json(&body)
                .send()
                .context("Append-row request failed")?;

            if !response.status().is_success() {
                bail!("Append-row request returned {}", response.status());
            }
            Ok(())
        })();

        result.map_err(LedgerError::Write)
    }

    fn read_all(&self) -> Result<Vec<FinancialRecord>, LedgerError> {
        let result = (|| -> Result<Vec<FinancialRecord>> {
            let response = self
                .authorize(self.client.get(self.rows_url()))
                .send()
                .context("Read-rows request failed")?;

            if !response.status().is_success() {
                bail!("Read-rows request returned {}", response.status());
            }

            let rows: RowsResponse = response
                .json()
                .context("Read-rows response was not valid JSON")?;

            rows.rows
                .iter()
                .map(|row| row_to_record(row))
                .collect::<Result<Vec<_>>>()
        })();

        result.map_err(LedgerError::Read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_to_row_cell_order() {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        let record = FinancialRecord::new(timestamp, RecordKind::Expense, 45.9, "mercado");

        let row = record_to_row(&record);
        assert_eq!(row.len(), 4);
        assert!(row[0].starts_with("2025-03-14T12:00:00"));
        assert_eq!(row[1], "expense");
        assert_eq!(row[2], "45.9");
        assert_eq!(row[3], "mercado");
    }

    #[test]
    fn test_row_round_trip() {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        let record = FinancialRecord::new(timestamp, RecordKind::Income, 2000.0, "salario");

        let parsed = row_to_record(&record_to_row(&record)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_row_too_short_is_rejected() {
        let row = vec!["2025-03-14T12:00:00Z".to_string(), "expense".to_string()];
        assert!(row_to_record(&row).is_err());
    }

    #[test]
    fn test_row_with_bad_cells_is_rejected() {
        let good = |i: usize, value: &str| {
            let mut row = vec![
                "2025-03-14T12:00:00Z".to_string(),
                "expense".to_string(),
                "45.9".to_string(),
                "mercado".to_string(),
            ];
            row[i] = value.to_string();
            row
        };

        assert!(row_to_record(&good(0, "yesterday")).is_err());
        assert!(row_to_record(&good(1, "transfer")).is_err());
        assert!(row_to_record(&good(2, "many")).is_err());
    }
}
