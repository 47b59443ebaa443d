//! Seed data used to build the ledger at startup.
//!
//! The built-in sample set is compiled into the binary. A JSON seed file with the same shape, an
//! array of `{ "description", "amount", "category", "date" }` objects, can replace it.

use crate::model::{Amount, SeedExpense};
use crate::{utils, Result};
use anyhow::{bail, Context};
use std::path::Path;
use tracing::debug;

const BUILTIN_SEED: &str = include_str!("seed.json");

/// The built-in sample expenses.
pub fn builtin() -> Result<Vec<SeedExpense>> {
    serde_json::from_str(BUILTIN_SEED).context("The built-in seed data is malformed")
}

/// Loads seed expenses from the JSON file at `path`.
pub async fn load(path: &Path) -> Result<Vec<SeedExpense>> {
    let records: Vec<SeedExpense> = utils::deserialize(path)
        .await
        .context("Unable to load the seed file")?;
    check(&records).with_context(|| format!("Invalid seed file {}", path.display()))?;
    debug!(
        "Loaded {} from {}",
        utils::plural(records.len(), "seed expense"),
        path.display()
    );
    Ok(records)
}

/// Seed records must satisfy the same invariants as records added through the dashboard.
fn check(records: &[SeedExpense]) -> Result<()> {
    for (ix, record) in records.iter().enumerate() {
        if record.description.trim().is_empty() {
            bail!("Seed expense {ix} has a blank description");
        }
        if !record.amount.is_valid_entry() {
            bail!(
                "Seed expense {ix} ('{}') has an amount {} outside of $0.01 to {}",
                record.description,
                record.amount,
                Amount::MAX_ENTRY
            );
        }
    }
    Ok(())
}

/// Loads the seed file at `path` when one is given, otherwise the built-in sample set.
pub async fn resolve(path: Option<&Path>) -> Result<Vec<SeedExpense>> {
    match path {
        Some(path) => load(path).await,
        None => builtin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_seed() {
        let seed = builtin().unwrap();
        assert_eq!(seed.len(), 7);
        assert_eq!(seed[0].description, "Groceries");
        assert_eq!(seed[0].amount, Amount::from_str("75.40").unwrap());
        assert_eq!(seed[2].category, Category::Bills);
        assert_eq!(seed[6].description, "Electricity Bill");
    }

    #[tokio::test]
    async fn test_load_seed_file_with_legacy_category() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"[
                {"description": "Rent", "amount": "$1,200.00", "category": "housing", "date": "2024-01-01T00:00:00Z"},
                {"description": "Bus", "amount": "2.75", "category": "transport", "date": "2024-01-02T08:30:00Z"}
            ]"#,
        )
        .unwrap();

        let seed = resolve(Some(&path)).await.unwrap();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].category, Category::Other);
        assert_eq!(seed[0].amount, Amount::from_str("1200").unwrap());
        assert_eq!(seed[1].category, Category::Transport);
    }

    #[tokio::test]
    async fn test_load_missing_seed_file() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read file"));
    }

    #[tokio::test]
    async fn test_load_rejects_non_positive_amount() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"[{"description": "Refund", "amount": "-5", "category": "other", "date": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let err = load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("outside of $0.01"), "{err:#}");
    }

    #[tokio::test]
    async fn test_load_rejects_amount_above_entry_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"[{"description": "Yacht", "amount": "79228162514264337593543950335", "category": "other", "date": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let err = load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("$1,000,000,000.00"), "{err:#}");
    }

    #[tokio::test]
    async fn test_resolve_without_path_is_builtin() {
        assert_eq!(resolve(None).await.unwrap().len(), 7);
    }
}
