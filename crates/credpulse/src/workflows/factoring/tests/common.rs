use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::WorkflowConfig;
use crate::workflows::factoring::domain::{
    BuyerId, BuyerProfile, CashflowSummary, ComplianceSummary, CreditScoreResult, CreditTier,
    InvoiceFacts, InvoiceId, MerchantId, MerchantSignals, RiskDecision, RiskTier,
    VelocitySummary, VelocityTrend,
};
use crate::workflows::factoring::oracle::{OracleError, RiskOracleClient, ScoringOracleClient};
use crate::workflows::factoring::orchestrator::{WorkflowOrchestrator, WorkflowRequest};
use crate::workflows::factoring::repository::{FactsRepository, RepositoryError};

pub(super) type TestOrchestrator =
    WorkflowOrchestrator<MemoryFactsRepository, ScriptedRiskOracle, ScriptedScoringOracle>;

pub(super) fn invoice(id: u64, buyer: u64, amount: f64) -> InvoiceFacts {
    InvoiceFacts {
        invoice_id: InvoiceId(id),
        merchant_id: MerchantId(1),
        buyer_id: BuyerId(buyer),
        invoice_number: format!("INV-{id:04}"),
        amount,
        verified: true,
        irn: Some(format!("IRN{id:06}")),
    }
}

pub(super) fn buyer(id: u64, on_time_rate: f64, avg_payment_days: u32, risk_score: u16) -> BuyerProfile {
    BuyerProfile {
        buyer_id: BuyerId(id),
        name: format!("Buyer {id}"),
        avg_payment_days,
        on_time_rate,
        total_invoices: 20,
        risk_score,
    }
}

pub(super) fn merchant_signals() -> MerchantSignals {
    MerchantSignals {
        merchant_id: MerchantId(1),
        cashflow: CashflowSummary {
            monthly_inflow: 250_000.0,
            monthly_outflow: 200_000.0,
            average_balance: 80_000.0,
            consistency_score: 0.88,
        },
        compliance: ComplianceSummary {
            filed_on_time: true,
            consecutive_months: 6,
            average_revenue: 300_000.0,
        },
        velocity: VelocitySummary {
            monthly_transactions: 120,
            average_transaction_value: 8_500.0,
            trend: VelocityTrend::Stable,
        },
    }
}

pub(super) fn approve(rate: f64) -> RiskDecision {
    RiskDecision {
        financeable: true,
        recommended_rate: rate,
        risk_tier: RiskTier::Low,
        rationale: "reliable payer".to_string(),
    }
}

pub(super) fn decline() -> RiskDecision {
    RiskDecision {
        financeable: false,
        recommended_rate: 2.0,
        risk_tier: RiskTier::High,
        rationale: "chronic late payments".to_string(),
    }
}

pub(super) fn judged_score(score: u16) -> CreditScoreResult {
    CreditScoreResult {
        score,
        tier: CreditTier::Excellent,
        rationale: vec!["stable UPI volume".to_string()],
        confidence: 0.8,
    }
}

pub(super) fn workflow_config() -> WorkflowConfig {
    WorkflowConfig {
        oracle_timeout: Duration::from_millis(250),
        ..WorkflowConfig::default()
    }
}

pub(super) fn request(invoice_id: u64, buyer_id: u64) -> WorkflowRequest {
    WorkflowRequest::new(InvoiceId(invoice_id), BuyerId(buyer_id), MerchantId(1))
}

pub(super) fn build_orchestrator(
    risk: ScriptedRiskOracle,
    scoring: ScriptedScoringOracle,
    config: WorkflowConfig,
) -> (
    TestOrchestrator,
    Arc<MemoryFactsRepository>,
    Arc<ScriptedRiskOracle>,
    Arc<ScriptedScoringOracle>,
) {
    let facts = Arc::new(MemoryFactsRepository::seeded());
    let risk = Arc::new(risk);
    let scoring = Arc::new(scoring);
    let orchestrator =
        WorkflowOrchestrator::new(facts.clone(), risk.clone(), scoring.clone(), config);
    (orchestrator, facts, risk, scoring)
}

#[derive(Default)]
pub(super) struct MemoryFactsRepository {
    invoices: Mutex<HashMap<InvoiceId, InvoiceFacts>>,
    buyers: Mutex<HashMap<BuyerId, BuyerProfile>>,
    merchants: Mutex<HashMap<MerchantId, MerchantSignals>>,
    signal_reads: AtomicUsize,
}

impl MemoryFactsRepository {
    /// Invoice 1 is owed by a reliable buyer, 2 by an average one, 3 by a weak one.
    pub(super) fn seeded() -> Self {
        let repository = Self::default();
        repository.put_invoice(invoice(1, 101, 75_000.0));
        repository.put_invoice(invoice(2, 102, 150_000.0));
        repository.put_invoice(invoice(3, 103, 250_000.0));
        repository.put_buyer(buyer(101, 0.95, 18, 850));
        repository.put_buyer(buyer(102, 0.82, 35, 680));
        repository.put_buyer(buyer(103, 0.65, 60, 450));
        repository
            .merchants
            .lock()
            .expect("merchant mutex poisoned")
            .insert(MerchantId(1), merchant_signals());
        repository
    }

    pub(super) fn put_invoice(&self, facts: InvoiceFacts) {
        self.invoices
            .lock()
            .expect("invoice mutex poisoned")
            .insert(facts.invoice_id, facts);
    }

    pub(super) fn put_buyer(&self, profile: BuyerProfile) {
        self.buyers
            .lock()
            .expect("buyer mutex poisoned")
            .insert(profile.buyer_id, profile);
    }

    pub(super) fn remove_merchant(&self, id: MerchantId) {
        self.merchants
            .lock()
            .expect("merchant mutex poisoned")
            .remove(&id);
    }

    pub(super) fn signal_reads(&self) -> usize {
        self.signal_reads.load(Ordering::SeqCst)
    }
}

impl FactsRepository for MemoryFactsRepository {
    fn invoice_facts(&self, id: InvoiceId) -> Result<InvoiceFacts, RepositoryError> {
        let guard = self.invoices.lock().expect("invoice mutex poisoned");
        guard
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::invoice_not_found(id))
    }

    fn buyer_profile(&self, id: BuyerId) -> Result<BuyerProfile, RepositoryError> {
        let guard = self.buyers.lock().expect("buyer mutex poisoned");
        guard
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::buyer_not_found(id))
    }

    fn merchant_signals(&self, id: MerchantId) -> Result<MerchantSignals, RepositoryError> {
        self.signal_reads.fetch_add(1, Ordering::SeqCst);
        let guard = self.merchants.lock().expect("merchant mutex poisoned");
        guard
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::merchant_not_found(id))
    }
}

/// Risk oracle answering from a per-buyer script, with an optional delay.
pub(super) struct ScriptedRiskOracle {
    answers: HashMap<BuyerId, Result<RiskDecision, OracleError>>,
    fallback: Result<RiskDecision, OracleError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedRiskOracle {
    pub(super) fn answering(answer: Result<RiskDecision, OracleError>) -> Self {
        Self {
            answers: HashMap::new(),
            fallback: answer,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn for_buyer(mut self, buyer: u64, answer: Result<RiskDecision, OracleError>) -> Self {
        self.answers.insert(BuyerId(buyer), answer);
        self
    }

    pub(super) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskOracleClient for ScriptedRiskOracle {
    async fn judge(
        &self,
        buyer: &BuyerProfile,
        _invoice: &InvoiceFacts,
    ) -> Result<RiskDecision, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers
            .get(&buyer.buyer_id)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

pub(super) struct ScriptedScoringOracle {
    answer: Result<CreditScoreResult, OracleError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedScoringOracle {
    pub(super) fn answering(answer: Result<CreditScoreResult, OracleError>) -> Self {
        Self {
            answer,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringOracleClient for ScriptedScoringOracle {
    async fn score(
        &self,
        _cashflow: &CashflowSummary,
        _compliance: &ComplianceSummary,
        _velocity: &VelocitySummary,
    ) -> Result<CreditScoreResult, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
