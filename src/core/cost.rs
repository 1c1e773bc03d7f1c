use super::types::{CostBreakdown, CostCategory, CostShare};

/// Sums the categories and attaches each one's rounded share of the total.
///
/// Input order is preserved. A zero total yields 0% for every category.
pub fn aggregate_costs(categories: &[CostCategory]) -> CostBreakdown {
    let total: f64 = categories.iter().map(|c| c.amount).sum();
    let items = categories
        .iter()
        .map(|c| CostShare {
            label: c.label.clone(),
            amount: c.amount,
            percentage: share_percentage(c.amount, total),
            color: c.color.clone(),
        })
        .collect();

    CostBreakdown { total, items }
}

fn share_percentage(amount: f64, total: f64) -> u32 {
    if total == 0.0 || !total.is_finite() {
        return 0;
    }
    let pct = (amount / total * 100.0).round();
    if pct.is_nan() {
        return 0;
    }
    pct.clamp(0.0, 100.0) as u32
}
