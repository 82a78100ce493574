use crate::workflows::factoring::domain::CreditTier;

/// Map a 0-1000 score onto its tier. Bands are contiguous and non-overlapping.
pub fn tier_for_score(score: u16) -> CreditTier {
    if score >= 800 {
        CreditTier::Excellent
    } else if score >= 700 {
        CreditTier::VeryGood
    } else if score >= 600 {
        CreditTier::Good
    } else if score >= 500 {
        CreditTier::Medium
    } else {
        CreditTier::Risky
    }
}

pub(crate) fn payment_history_reason(on_time_rate: f64) -> &'static str {
    if on_time_rate >= 0.95 {
        "excellent payment history (>=95% on-time)"
    } else if on_time_rate >= 0.90 {
        "very good payment history (>=90% on-time)"
    } else if on_time_rate >= 0.80 {
        "good payment history (>=80% on-time)"
    } else {
        "payment history needs improvement"
    }
}

pub(crate) fn payment_speed_reason(avg_payment_days: u32) -> &'static str {
    if avg_payment_days <= 15 {
        "fast payment (avg <=15 days)"
    } else if avg_payment_days <= 30 {
        "prompt payment (avg <=30 days)"
    } else if avg_payment_days <= 45 {
        "reasonable payment cycle"
    } else {
        "slow payment cycle detected"
    }
}

pub(crate) fn amount_reason(amount: f64) -> Option<&'static str> {
    if amount < 100_000.0 {
        Some("conservative invoice amount")
    } else if amount > 200_000.0 {
        Some("high invoice amount increases risk")
    } else {
        None
    }
}

/// Explainable reasons derived from the buyer's history and the invoice size.
pub(crate) fn rule_rationale(
    on_time_rate: f64,
    avg_payment_days: u32,
    invoice_amount: f64,
) -> Vec<String> {
    let mut reasons = vec![
        payment_history_reason(on_time_rate).to_string(),
        payment_speed_reason(avg_payment_days).to_string(),
    ];
    if let Some(reason) = amount_reason(invoice_amount) {
        reasons.push(reason.to_string());
    }
    reasons
}
