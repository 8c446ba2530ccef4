// Gastos Bot - Record Model
// Canonical ledger schema and the financial record type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SCHEMA
// ============================================================================

/// Canonical ledger column order: every backend stores rows as
/// (timestamp, kind, amount, category).
pub const LEDGER_COLUMNS: [&str; 4] = ["timestamp", "kind", "amount", "category"];

/// Header written by the first spreadsheet exports. Only the migration
/// command understands this layout; nothing branches on it at runtime.
pub const LEGACY_COLUMNS: [&str; 4] = ["Data", "Tipo", "Valor", "Categoria"];

// ============================================================================
// CORE TYPES
// ============================================================================

/// RecordKind - whether money left or entered the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Expense,
    Income,
}

impl RecordKind {
    /// Map a lower-cased command keyword to a kind.
    ///
    /// The localized keywords ("gasto", "receita") are the command language
    /// users actually type; the English names are accepted as well.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "gasto" | "expense" => Some(RecordKind::Expense),
            "receita" | "income" => Some(RecordKind::Income),
            _ => None,
        }
    }

    /// Canonical name as stored in the ledger
    pub fn name(&self) -> &str {
        match self {
            RecordKind::Expense => "expense",
            RecordKind::Income => "income",
        }
    }
}

/// FinancialRecord - one ledger row
///
/// Field order mirrors the ledger columns. Records are immutable once
/// created: the writer appends each one exactly once and nothing in the
/// system edits or deletes rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: RecordKind,
    pub amount: f64,
    pub category: String,
}

impl FinancialRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        kind: RecordKind,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        FinancialRecord {
            timestamp,
            kind,
            amount,
            category: category.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_from_localized_keywords() {
        assert_eq!(RecordKind::from_keyword("gasto"), Some(RecordKind::Expense));
        assert_eq!(RecordKind::from_keyword("receita"), Some(RecordKind::Income));
    }

    #[test]
    fn test_kind_from_english_keywords() {
        assert_eq!(RecordKind::from_keyword("expense"), Some(RecordKind::Expense));
        assert_eq!(RecordKind::from_keyword("income"), Some(RecordKind::Income));
    }

    #[test]
    fn test_kind_rejects_unknown_keyword() {
        assert_eq!(RecordKind::from_keyword("transfer"), None);
        assert_eq!(RecordKind::from_keyword(""), None);
        assert_eq!(RecordKind::from_keyword("GASTO"), None); // caller lower-cases
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RecordKind::Expense.name(), "expense");
        assert_eq!(RecordKind::Income.name(), "income");
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&RecordKind::Expense).unwrap();
        assert_eq!(json, "\"expense\"");

        let kind: RecordKind = serde_json::from_str("\"income\"").unwrap();
        assert_eq!(kind, RecordKind::Income);
    }

    #[test]
    fn test_record_new() {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        let record = FinancialRecord::new(timestamp, RecordKind::Expense, 45.9, "mercado");

        assert_eq!(record.timestamp, timestamp);
        assert_eq!(record.kind, RecordKind::Expense);
        assert_eq!(record.amount, 45.9);
        assert_eq!(record.category, "mercado");
    }
}
