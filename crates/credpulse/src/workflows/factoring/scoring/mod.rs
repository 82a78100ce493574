mod rules;

pub use rules::tier_for_score;
use rules::rule_rationale;

use std::sync::Arc;

use super::domain::{BuyerProfile, CreditScoreResult, InvoiceFacts, MerchantSignals};
use super::oracle::{OracleError, ScoringOracleClient};

/// Wraps the scoring oracle and normalises what it returns.
///
/// The oracle supplies the score, confidence, and its own reasons. The tier is always
/// recomputed from the score band and the rationale leads with the rule-based lines
/// for the buyer's payment behaviour and the invoice size.
pub struct CreditScorer<S> {
    oracle: Arc<S>,
}

impl<S> CreditScorer<S>
where
    S: ScoringOracleClient + 'static,
{
    pub fn new(oracle: Arc<S>) -> Self {
        Self { oracle }
    }

    pub async fn score(
        &self,
        signals: &MerchantSignals,
        buyer: &BuyerProfile,
        invoice: &InvoiceFacts,
    ) -> Result<CreditScoreResult, OracleError> {
        let judged = self
            .oracle
            .score(&signals.cashflow, &signals.compliance, &signals.velocity)
            .await?;

        normalise(judged, buyer, invoice)
    }
}

fn normalise(
    judged: CreditScoreResult,
    buyer: &BuyerProfile,
    invoice: &InvoiceFacts,
) -> Result<CreditScoreResult, OracleError> {
    if judged.score > 1000 {
        return Err(OracleError::Malformed(format!(
            "credit score {} is outside 0-1000",
            judged.score
        )));
    }
    if judged.confidence.is_nan() {
        return Err(OracleError::Malformed(
            "credit score confidence is not a number".to_string(),
        ));
    }

    let mut rationale = rule_rationale(buyer.on_time_rate, buyer.avg_payment_days, invoice.amount);
    rationale.extend(
        judged
            .rationale
            .into_iter()
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty()),
    );

    Ok(CreditScoreResult {
        score: judged.score,
        tier: tier_for_score(judged.score),
        rationale,
        confidence: judged.confidence.clamp(0.0, 1.0),
    })
}
