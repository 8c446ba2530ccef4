// Gastos Bot - CLI
// Offline operations over the ledger: report and legacy migration

use anyhow::Result;
use std::env;
use std::path::Path;

use gastos_bot::{migrate_file, summarize, AppConfig, LedgerStore, MigrationOutcome};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("report") | None => run_report()?,
        Some("migrate") => match args.get(2) {
            Some(path) => run_migrate(Path::new(path))?,
            None => {
                eprintln!("Usage: gastos migrate <ledger-file>");
                std::process::exit(2);
            }
        },
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: gastos [report | migrate <ledger-file>]");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn run_report() -> Result<()> {
    println!("📊 Gastos Bot - Ledger Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = AppConfig::from_env()?;
    let store = config.open_store()?;

    let records = match store.read_all() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("❌ Could not read the ledger: {}", e);
            std::process::exit(1);
        }
    };

    let summary = summarize(&records);

    println!("\n✓ {} records in the ledger", summary.record_count);
    println!("\n  Income:   {:>12.2}", summary.total_income);
    println!("  Expenses: {:>12.2}", summary.total_expenses);
    println!("  Balance:  {:>12.2}", summary.balance);

    if !summary.expenses_by_category.is_empty() {
        println!("\n  Expenses by category:");
        for row in &summary.expenses_by_category {
            println!("    {:<24} {:>12.2}", row.category, row.total);
        }
    }

    Ok(())
}

fn run_migrate(path: &Path) -> Result<()> {
    println!("🗄️  Migrating legacy ledger: {}", path.display());

    match migrate_file(path)? {
        MigrationOutcome::AlreadyCanonical => {
            println!("✓ Ledger already uses the canonical schema");
        }
        MigrationOutcome::Migrated(count) => {
            println!("✓ Rewrote {} rows in the canonical schema", count);
        }
    }

    Ok(())
}
