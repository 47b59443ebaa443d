use crate::commands::Out;
use crate::summary::{CategoryShare, Summary};
use crate::{render, Config, Dashboard, Result};
use serde::Serialize;

/// The totals and the category breakdown of the whole ledger.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub summary: Summary,
    pub breakdown: Vec<CategoryShare>,
}

pub async fn summary(config: Config) -> Result<Out<SummaryReport>> {
    let dashboard = Dashboard::load(&config).await?;
    let report = SummaryReport {
        summary: dashboard.summary(),
        breakdown: dashboard.breakdown(),
    };
    let message = render::summary(&report.summary, &report.breakdown);
    Ok(Out::new(message, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[tokio::test]
    async fn test_summary_of_builtin_seed() {
        let out = summary(Config::default()).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.summary.count, 7);
        assert_eq!(report.summary.total.to_string(), "$364.08");
        assert_eq!(report.breakdown.len(), Category::ALL.len());
        assert!(out.message().contains("Spending by Category"));
    }
}
