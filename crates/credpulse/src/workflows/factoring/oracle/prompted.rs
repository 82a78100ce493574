use std::sync::Arc;

use async_trait::async_trait;

use super::judgment::{parse_risk_judgment, parse_score_judgment};
use super::{
    OracleError, RiskOracleClient, ScoringOracleClient, MAX_RECOMMENDED_RATE,
    MIN_RECOMMENDED_RATE,
};
use crate::workflows::factoring::domain::{
    BuyerProfile, CashflowSummary, ComplianceSummary, CreditScoreResult, InvoiceFacts,
    RiskDecision, VelocitySummary,
};

/// Text-completion backend answering in JSON mode (LLM provider, sidecar, etc).
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, OracleError>;
}

const RISK_SYSTEM_PROMPT: &str =
    "You are a credit risk analyst for invoice factoring. Answer with a single JSON object.";
const SCORING_SYSTEM_PROMPT: &str =
    "You are a credit analyst scoring merchants from alternative data. Answer with a single JSON object.";

/// Risk judge backed by a prompted completion model.
pub struct PromptedRiskOracle<T> {
    transport: Arc<T>,
}

impl<T> PromptedRiskOracle<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T> RiskOracleClient for PromptedRiskOracle<T>
where
    T: CompletionTransport + 'static,
{
    async fn judge(
        &self,
        buyer: &BuyerProfile,
        invoice: &InvoiceFacts,
    ) -> Result<RiskDecision, OracleError> {
        let prompt = risk_prompt(buyer, invoice);
        let raw = self.transport.complete(RISK_SYSTEM_PROMPT, &prompt).await?;
        parse_risk_judgment(&raw)
    }
}

/// Credit scorer backed by a prompted completion model.
pub struct PromptedScoringOracle<T> {
    transport: Arc<T>,
}

impl<T> PromptedScoringOracle<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T> ScoringOracleClient for PromptedScoringOracle<T>
where
    T: CompletionTransport + 'static,
{
    async fn score(
        &self,
        cashflow: &CashflowSummary,
        compliance: &ComplianceSummary,
        velocity: &VelocitySummary,
    ) -> Result<CreditScoreResult, OracleError> {
        let prompt = scoring_prompt(cashflow, compliance, velocity);
        let raw = self.transport.complete(SCORING_SYSTEM_PROMPT, &prompt).await?;
        parse_score_judgment(&raw)
    }
}

fn risk_prompt(buyer: &BuyerProfile, invoice: &InvoiceFacts) -> String {
    let irn = invoice.irn.as_deref().unwrap_or("not registered");
    format!(
        "Decide whether invoice {invoice_id} owed by buyer {buyer_id} can be financed.\n\
         \n\
         Buyer payment history:\n\
         - average payment delay: {delay} days\n\
         - on-time rate: {on_time:.1}%\n\
         - invoices on record: {total}\n\
         - risk score: {risk}/1000\n\
         \n\
         Invoice:\n\
         - number: {number}\n\
         - IRN: {irn}\n\
         - verified: {verified}\n\
         - amount: {amount:.2}\n\
         \n\
         Reply with {{\"decision\": \"YES\" or \"NO\", \"recommended_rate\": annual percent between \
         {min:.1} and {max:.1}, \"reasoning\": short explanation, \"risk_level\": \"low\", \
         \"medium\" or \"high\"}}.",
        invoice_id = invoice.invoice_id,
        buyer_id = buyer.buyer_id,
        delay = buyer.avg_payment_days,
        on_time = buyer.on_time_rate * 100.0,
        total = buyer.total_invoices,
        risk = buyer.risk_score,
        number = invoice.invoice_number,
        verified = invoice.verified,
        amount = invoice.amount,
        min = MIN_RECOMMENDED_RATE,
        max = MAX_RECOMMENDED_RATE,
    )
}

fn scoring_prompt(
    cashflow: &CashflowSummary,
    compliance: &ComplianceSummary,
    velocity: &VelocitySummary,
) -> String {
    format!(
        "Score this merchant on a 0-1000 scale.\n\
         \n\
         Cashflow: inflow {inflow:.2}/month, outflow {outflow:.2}/month, average balance \
         {balance:.2}, consistency {consistency:.0}%\n\
         Tax compliance: filed on time {filed}, {months} consecutive months, average revenue \
         {revenue:.2}\n\
         Payments: {transactions} transactions/month averaging {ticket:.2}, trend {trend:?}\n\
         \n\
         Reply with {{\"credit_score\": integer, \"tier\": \"excellent\" | \"very_good\" | \
         \"good\" | \"medium\" | \"risky\", \"reasoning\": [strings], \"confidence\": 0-1}}.",
        inflow = cashflow.monthly_inflow,
        outflow = cashflow.monthly_outflow,
        balance = cashflow.average_balance,
        consistency = cashflow.consistency_score * 100.0,
        filed = compliance.filed_on_time,
        months = compliance.consecutive_months,
        revenue = compliance.average_revenue,
        transactions = velocity.monthly_transactions,
        ticket = velocity.average_transaction_value,
        trend = velocity.trend,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::factoring::domain::{BuyerId, InvoiceId, MerchantId, RiskTier};
    use std::sync::Mutex;

    struct CannedTransport {
        reply: Result<String, OracleError>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedTransport {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionTransport for CannedTransport {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, OracleError> {
            self.prompts
                .lock()
                .expect("prompt mutex poisoned")
                .push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn buyer() -> BuyerProfile {
        BuyerProfile {
            buyer_id: BuyerId(101),
            name: "Excellent Corp".to_string(),
            avg_payment_days: 18,
            on_time_rate: 0.95,
            total_invoices: 25,
            risk_score: 850,
        }
    }

    fn invoice() -> InvoiceFacts {
        InvoiceFacts {
            invoice_id: InvoiceId(1),
            merchant_id: MerchantId(1),
            buyer_id: BuyerId(101),
            invoice_number: "INV-0001".to_string(),
            amount: 75_000.0,
            verified: true,
            irn: Some("IRN000001ABC123".to_string()),
        }
    }

    #[tokio::test]
    async fn risk_oracle_sends_facts_and_parses_reply() {
        let transport = Arc::new(CannedTransport::replying(
            r#"{"decision": "YES", "recommended_rate": 2.4, "reasoning": "pays early", "risk_level": "low"}"#,
        ));
        let oracle = PromptedRiskOracle::new(transport.clone());

        let decision = oracle.judge(&buyer(), &invoice()).await.expect("judged");
        assert!(decision.financeable);
        assert_eq!(decision.risk_tier, RiskTier::Low);

        let prompts = transport.prompts.lock().expect("prompt mutex poisoned");
        assert!(prompts[0].contains("IRN000001ABC123"));
        assert!(prompts[0].contains("on-time rate: 95.0%"));
    }

    #[tokio::test]
    async fn scoring_oracle_parses_reply() {
        use crate::workflows::factoring::domain::{CreditTier, VelocityTrend};

        let transport = Arc::new(CannedTransport::replying(
            r#"{"credit_score": 780, "tier": "very_good", "reasoning": ["stable UPI volume"], "confidence": 0.8}"#,
        ));
        let oracle = PromptedScoringOracle::new(transport.clone());

        let result = oracle
            .score(
                &CashflowSummary {
                    monthly_inflow: 250_000.0,
                    monthly_outflow: 200_000.0,
                    average_balance: 80_000.0,
                    consistency_score: 0.88,
                },
                &ComplianceSummary {
                    filed_on_time: true,
                    consecutive_months: 6,
                    average_revenue: 300_000.0,
                },
                &VelocitySummary {
                    monthly_transactions: 120,
                    average_transaction_value: 8_500.0,
                    trend: VelocityTrend::Stable,
                },
            )
            .await
            .expect("scored");

        assert_eq!(result.score, 780);
        assert_eq!(result.tier, CreditTier::VeryGood);
        let prompts = transport.prompts.lock().expect("prompt mutex poisoned");
        assert!(prompts[0].contains("consistency 88%"));
        assert!(prompts[0].contains("trend Stable"));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let transport = Arc::new(CannedTransport {
            reply: Err(OracleError::Transport("connection reset".to_string())),
            prompts: Mutex::new(Vec::new()),
        });
        let oracle = PromptedRiskOracle::new(transport);

        let err = oracle
            .judge(&buyer(), &invoice())
            .await
            .expect_err("transport fails");
        assert_eq!(err, OracleError::Transport("connection reset".to_string()));
    }
}
