//! Deterministic rule-based oracles used by the demo service and local runs.

use async_trait::async_trait;

use super::{OracleError, RiskOracleClient, ScoringOracleClient, MIN_RECOMMENDED_RATE};
use crate::workflows::factoring::domain::{
    BuyerProfile, CashflowSummary, ComplianceSummary, CreditScoreResult, InvoiceFacts,
    RiskDecision, RiskTier, VelocitySummary, VelocityTrend,
};
use crate::workflows::factoring::pricing::round_cents;
use crate::workflows::factoring::scoring::tier_for_score;

/// Thresholds the heuristic judge applies to buyer history.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicRiskOracle {
    pub minimum_on_time_rate: f64,
    pub minimum_risk_score: u16,
    pub slow_payment_days: u32,
}

impl Default for HeuristicRiskOracle {
    fn default() -> Self {
        Self {
            minimum_on_time_rate: 0.70,
            minimum_risk_score: 500,
            slow_payment_days: 45,
        }
    }
}

impl HeuristicRiskOracle {
    fn assess(&self, buyer: &BuyerProfile, invoice: &InvoiceFacts) -> RiskDecision {
        let history = format!(
            "on-time rate {:.0}%, average payment in {} days, risk score {}/1000",
            buyer.on_time_rate * 100.0,
            buyer.avg_payment_days,
            buyer.risk_score
        );

        if !invoice.verified {
            return RiskDecision {
                financeable: false,
                recommended_rate: MIN_RECOMMENDED_RATE,
                risk_tier: RiskTier::High,
                rationale: format!(
                    "invoice {} is not verified with the registration authority",
                    invoice.invoice_id
                ),
            };
        }

        if buyer.on_time_rate < self.minimum_on_time_rate
            || buyer.risk_score < self.minimum_risk_score
        {
            return RiskDecision {
                financeable: false,
                recommended_rate: MIN_RECOMMENDED_RATE,
                risk_tier: RiskTier::High,
                rationale: format!("buyer history below financing threshold: {history}"),
            };
        }

        let risk_tier = if buyer.risk_score >= 750 && buyer.on_time_rate >= 0.90 {
            RiskTier::Low
        } else if buyer.risk_score >= 600 {
            RiskTier::Medium
        } else {
            RiskTier::High
        };

        let headroom = f64::from(1000u16.saturating_sub(buyer.risk_score)) / 1000.0;
        let mut rate = MIN_RECOMMENDED_RATE + headroom * 3.0;
        if buyer.avg_payment_days > self.slow_payment_days {
            rate += 0.5;
        }

        RiskDecision {
            financeable: true,
            recommended_rate: round_cents(rate),
            risk_tier,
            rationale: format!("financeable with {} risk: {history}", risk_tier.label()),
        }
    }
}

#[async_trait]
impl RiskOracleClient for HeuristicRiskOracle {
    async fn judge(
        &self,
        buyer: &BuyerProfile,
        invoice: &InvoiceFacts,
    ) -> Result<RiskDecision, OracleError> {
        Ok(self.assess(buyer, invoice))
    }
}

/// Weighted-signal scorer over merchant alternative data.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScoringOracle;

const SCORE_FLOOR: f64 = 300.0;

impl HeuristicScoringOracle {
    fn assess(
        &self,
        cashflow: &CashflowSummary,
        compliance: &ComplianceSummary,
        velocity: &VelocitySummary,
    ) -> CreditScoreResult {
        let mut points = SCORE_FLOOR;
        let mut reasons = Vec::new();

        if cashflow.monthly_inflow > 0.0 {
            let margin = (cashflow.monthly_inflow - cashflow.monthly_outflow)
                / cashflow.monthly_inflow;
            points += margin.clamp(-0.5, 0.5) * 400.0;
            reasons.push(format!("monthly cash margin of {:.0}%", margin * 100.0));
        } else {
            points -= 100.0;
            reasons.push("no recorded monthly inflow".to_string());
        }

        if cashflow.monthly_outflow > 0.0 {
            let cover = cashflow.average_balance / cashflow.monthly_outflow;
            points += cover.clamp(0.0, 1.0) * 100.0;
        }

        points += cashflow.consistency_score * 200.0;

        if compliance.filed_on_time {
            points += 100.0;
            reasons.push(format!(
                "tax returns filed on time for {} consecutive months",
                compliance.consecutive_months
            ));
        } else {
            reasons.push("late tax filings on record".to_string());
        }
        points += f64::from(compliance.consecutive_months.min(12)) * 10.0;

        points += match velocity.trend {
            VelocityTrend::Growing => 60.0,
            VelocityTrend::Stable => 30.0,
            VelocityTrend::Declining => -40.0,
        };
        if velocity.monthly_transactions >= 100 {
            points += 30.0;
        }

        let score = points.round().clamp(0.0, 1000.0) as u16;
        let confidence = round_cents(0.6 + 0.4 * cashflow.consistency_score);

        CreditScoreResult {
            score,
            tier: tier_for_score(score),
            rationale: reasons,
            confidence,
        }
    }
}

#[async_trait]
impl ScoringOracleClient for HeuristicScoringOracle {
    async fn score(
        &self,
        cashflow: &CashflowSummary,
        compliance: &ComplianceSummary,
        velocity: &VelocitySummary,
    ) -> Result<CreditScoreResult, OracleError> {
        Ok(self.assess(cashflow, compliance, velocity))
    }
}
