//! Overhead, marketing and R&D spend per period

use crate::assumptions::{MarketingConfig, OverheadItem, ResearchConfig};

/// Sum of all overhead lines for one period
pub fn overhead_cost(items: &[OverheadItem], years: u32, months_per_period: u32) -> f64 {
    items
        .iter()
        .map(|item| item.monthly_cost_at(years) * months_per_period as f64)
        .sum()
}

/// Marketing spend for one period.
///
/// Must be called after revenue is known: the percent-of-revenue mode uses the
/// same period's total revenue.
pub fn marketing_cost(config: &MarketingConfig, total_revenue: f64, years: u32, months_per_period: u32) -> f64 {
    match *config {
        MarketingConfig::Fixed { monthly_amount, annual_escalation } => {
            monthly_amount * (1.0 + annual_escalation).powi(years as i32) * months_per_period as f64
        }
        MarketingConfig::PercentOfRevenue { fraction } => fraction * total_revenue.max(0.0),
    }
}

/// R&D spend: a share of revenue plus a share of funding received this period
pub fn research_cost(config: &ResearchConfig, total_revenue: f64, funding_received: f64) -> f64 {
    config.revenue_fraction * total_revenue.max(0.0) + config.funding_fraction * funding_received.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_overheads_flat_within_year() {
        let items = vec![
            OverheadItem::new("Office Rental", 10_000.0, 0.05),
            OverheadItem::new("Legal", 5_000.0, 0.0),
        ];
        assert_eq!(overhead_cost(&items, 0, 1), 15_000.0);
        assert_relative_eq!(overhead_cost(&items, 1, 1), 15_500.0, epsilon = 1e-9);
        assert_relative_eq!(overhead_cost(&items, 1, 3), 46_500.0, epsilon = 1e-9);
        assert_eq!(overhead_cost(&[], 3, 12), 0.0);
    }

    #[test]
    fn test_fixed_marketing_ignores_revenue() {
        let config = MarketingConfig::Fixed { monthly_amount: 10_000.0, annual_escalation: 0.1 };
        assert_eq!(marketing_cost(&config, 1e9, 0, 1), 10_000.0);
        assert_relative_eq!(marketing_cost(&config, 0.0, 1, 12), 132_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_percent_of_revenue_marketing() {
        let config = MarketingConfig::PercentOfRevenue { fraction: 0.1 };
        assert_relative_eq!(marketing_cost(&config, 250_000.0, 0, 1), 25_000.0, epsilon = 1e-9);
        // Independent of period length: revenue already covers the whole period
        assert_relative_eq!(marketing_cost(&config, 250_000.0, 2, 3), 25_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_research_from_revenue_and_funding() {
        let config = ResearchConfig { revenue_fraction: 0.02, funding_fraction: 0.05 };
        assert_relative_eq!(research_cost(&config, 100_000.0, 0.0), 2_000.0, epsilon = 1e-9);
        assert_relative_eq!(research_cost(&config, 100_000.0, 1_000_000.0), 52_000.0, epsilon = 1e-9);
        assert_eq!(research_cost(&ResearchConfig::default(), 100_000.0, 1e6), 0.0);
    }
}
