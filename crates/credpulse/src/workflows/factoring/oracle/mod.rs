//! Contracts for the external judgment services consulted by the workflow.
//!
//! Oracles are untrusted: their answers are schema-checked and bounded before the
//! orchestrator acts on them, and any failure ends the run instead of being guessed
//! around.

mod heuristic;
mod judgment;
mod prompted;

pub use heuristic::{HeuristicRiskOracle, HeuristicScoringOracle};
pub use judgment::{parse_risk_judgment, parse_score_judgment};
pub use prompted::{CompletionTransport, PromptedRiskOracle, PromptedScoringOracle};

use async_trait::async_trait;

use super::domain::{
    BuyerProfile, CashflowSummary, ComplianceSummary, CreditScoreResult, InvoiceFacts,
    RiskDecision, VelocitySummary,
};

pub const MIN_RECOMMENDED_RATE: f64 = 2.0;
pub const MAX_RECOMMENDED_RATE: f64 = 5.0;

/// Judges whether an invoice is financeable given the buyer's payment history.
#[async_trait]
pub trait RiskOracleClient: Send + Sync {
    async fn judge(
        &self,
        buyer: &BuyerProfile,
        invoice: &InvoiceFacts,
    ) -> Result<RiskDecision, OracleError>;
}

/// Scores a merchant from alternative cashflow, compliance, and velocity data.
#[async_trait]
pub trait ScoringOracleClient: Send + Sync {
    async fn score(
        &self,
        cashflow: &CashflowSummary,
        compliance: &ComplianceSummary,
        velocity: &VelocitySummary,
    ) -> Result<CreditScoreResult, OracleError>;
}

/// Failure of an oracle call. All variants are treated as non-retryable within a run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    #[error("{oracle} oracle did not answer within {after_ms} ms")]
    Timeout { oracle: &'static str, after_ms: u64 },
    #[error("oracle returned a malformed judgment: {0}")]
    Malformed(String),
    #[error("oracle transport failed: {0}")]
    Transport(String),
}

/// Bound an oracle-recommended annual rate to the lending policy range.
///
/// Returns `None` for values that are not numbers at all; out-of-range numbers are
/// clamped rather than rejected.
pub fn clamp_recommended_rate(rate: f64) -> Option<f64> {
    if rate.is_nan() {
        return None;
    }
    Some(rate.clamp(MIN_RECOMMENDED_RATE, MAX_RECOMMENDED_RATE))
}
