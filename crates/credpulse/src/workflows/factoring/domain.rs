use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an uploaded invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub u64);

/// Identifier of the buyer who owes the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuyerId(pub u64);

/// Identifier of the merchant requesting financing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantId(pub u64);

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BuyerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invoice snapshot taken at the start of a run. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceFacts {
    pub invoice_id: InvoiceId,
    pub merchant_id: MerchantId,
    pub buyer_id: BuyerId,
    pub invoice_number: String,
    pub amount: f64,
    pub verified: bool,
    /// Reference number issued by the e-invoice registration authority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irn: Option<String>,
}

impl InvoiceFacts {
    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(format!(
                "invoice {} amount must be positive, found {}",
                self.invoice_id, self.amount
            ));
        }
        Ok(())
    }
}

/// Payment history aggregated for a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub buyer_id: BuyerId,
    pub name: String,
    pub avg_payment_days: u32,
    /// Fraction of invoices settled on time, in `[0, 1]`.
    pub on_time_rate: f64,
    pub total_invoices: u32,
    /// Aggregate risk score on the 0-1000 scale.
    pub risk_score: u16,
}

impl BuyerProfile {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.on_time_rate) {
            return Err(format!(
                "buyer {} on-time rate must be within [0, 1], found {}",
                self.buyer_id, self.on_time_rate
            ));
        }
        if self.risk_score > 1000 {
            return Err(format!(
                "buyer {} risk score must be within 0-1000, found {}",
                self.buyer_id, self.risk_score
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

/// Financeability judgment for one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDecision {
    pub financeable: bool,
    /// Annual percentage rate recommended by the judge.
    pub recommended_rate: f64,
    pub risk_tier: RiskTier,
    pub rationale: String,
}

/// Score bands, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditTier {
    Excellent,
    VeryGood,
    Good,
    Medium,
    Risky,
}

impl CreditTier {
    pub const fn label(self) -> &'static str {
        match self {
            CreditTier::Excellent => "excellent",
            CreditTier::VeryGood => "very_good",
            CreditTier::Good => "good",
            CreditTier::Medium => "medium",
            CreditTier::Risky => "risky",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScoreResult {
    pub score: u16,
    pub tier: CreditTier,
    pub rationale: Vec<String>,
    pub confidence: f64,
}

/// Bank-statement derived cash position of a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowSummary {
    pub monthly_inflow: f64,
    pub monthly_outflow: f64,
    pub average_balance: f64,
    /// Month-over-month regularity of inflows, in `[0, 1]`.
    pub consistency_score: f64,
}

/// Tax filing record of a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub filed_on_time: bool,
    pub consecutive_months: u32,
    pub average_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityTrend {
    Growing,
    Stable,
    Declining,
}

/// Digital payment activity of a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocitySummary {
    pub monthly_transactions: u32,
    pub average_transaction_value: f64,
    pub trend: VelocityTrend,
}

/// Everything the credit scorer consumes for one merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantSignals {
    pub merchant_id: MerchantId,
    pub cashflow: CashflowSummary,
    pub compliance: ComplianceSummary,
    pub velocity: VelocitySummary,
}

impl MerchantSignals {
    pub fn validate(&self) -> Result<(), String> {
        let cashflow = &self.cashflow;
        if !(0.0..=1.0).contains(&cashflow.consistency_score) {
            return Err(format!(
                "merchant {} cashflow consistency must be within [0, 1], found {}",
                self.merchant_id, cashflow.consistency_score
            ));
        }

        let amounts = [
            cashflow.monthly_inflow,
            cashflow.monthly_outflow,
            self.compliance.average_revenue,
            self.velocity.average_transaction_value,
        ];
        if amounts.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(format!(
                "merchant {} signals contain a negative or non-finite amount",
                self.merchant_id
            ));
        }

        if !cashflow.average_balance.is_finite() {
            return Err(format!(
                "merchant {} average balance is not a finite number",
                self.merchant_id
            ));
        }
        Ok(())
    }
}
