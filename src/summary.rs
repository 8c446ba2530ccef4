// Gastos Bot - Summary Aggregator
// Read-only totals behind the dashboard

use serde::Serialize;
use std::collections::HashMap;

use crate::record::{FinancialRecord, RecordKind};

/// Per-category expense total (one chart row, largest first)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Summary - the numbers the dashboard renders
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub expenses_by_category: Vec<CategoryTotal>,
}

/// Aggregate a ledger into dashboard numbers.
///
/// Pure over already-validated records; owns no write access. An empty
/// ledger yields all zeros and no chart rows.
pub fn summarize(records: &[FinancialRecord]) -> Summary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut by_category: HashMap<String, f64> = HashMap::new();

    for record in records {
        match record.kind {
            RecordKind::Income => total_income += record.amount,
            RecordKind::Expense => {
                total_expenses += record.amount;
                *by_category.entry(record.category.clone()).or_insert(0.0) += record.amount;
            }
        }
    }

    let mut expenses_by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();

    // Largest spend first; ties broken by name so the order is stable
    expenses_by_category.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    Summary {
        record_count: records.len(),
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        expenses_by_category,
    }
}
