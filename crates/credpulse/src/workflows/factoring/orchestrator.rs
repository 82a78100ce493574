//! Sequential factoring workflow.
//!
//! A run moves through `Started -> RiskAssessed -> {Rejected | Scored -> Priced ->
//! Completed}`. Pricing is only reachable from a financeable risk decision, and any
//! stage failure ends the run as `failed` with whatever outputs were already produced.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::domain::{
    BuyerId, BuyerProfile, CreditScoreResult, InvoiceFacts, InvoiceId, MerchantId, RiskDecision,
};
use super::oracle::{clamp_recommended_rate, OracleError, RiskOracleClient, ScoringOracleClient};
use super::pricing::{OfferBreakdown, OfferRequest, PricingEngine, PricingError};
use super::repository::{FactsRepository, RepositoryError};
use super::result::{StageOutputs, WorkflowResult};
use super::scoring::CreditScorer;
use crate::config::WorkflowConfig;

/// Reason reported for runs that stop on an oracle failure.
pub const MANUAL_REVIEW_REASON: &str = "manual review required";

/// Caller input for one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    pub invoice_id: InvoiceId,
    pub buyer_id: BuyerId,
    pub merchant_id: MerchantId,
    /// Overrides the configured default tenor.
    #[serde(default)]
    pub tenor_days: Option<u32>,
}

impl WorkflowRequest {
    pub fn new(invoice_id: InvoiceId, buyer_id: BuyerId, merchant_id: MerchantId) -> Self {
        Self {
            invoice_id,
            buyer_id,
            merchant_id,
            tenor_days: None,
        }
    }

    pub fn with_tenor(mut self, tenor_days: u32) -> Self {
        self.tenor_days = Some(tenor_days);
        self
    }
}

/// Observable position of a run in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Started,
    RiskAssessed,
    Scored,
    Priced,
    Completed,
    Rejected,
    Failed,
}

impl WorkflowStage {
    pub const fn label(self) -> &'static str {
        match self {
            WorkflowStage::Started => "started",
            WorkflowStage::RiskAssessed => "risk_assessed",
            WorkflowStage::Scored => "scored",
            WorkflowStage::Priced => "priced",
            WorkflowStage::Completed => "completed",
            WorkflowStage::Rejected => "rejected",
            WorkflowStage::Failed => "failed",
        }
    }

    /// Stages reported by the health endpoint, in execution order.
    pub const PIPELINE: [WorkflowStage; 4] = [
        WorkflowStage::Started,
        WorkflowStage::RiskAssessed,
        WorkflowStage::Scored,
        WorkflowStage::Priced,
    ];
}

/// Error that ends a run in the `failed` state.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    OracleUnavailable(#[from] OracleError),
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl WorkflowError {
    /// Caller-facing reason recorded on the failed result.
    pub fn reason(&self) -> String {
        match self {
            WorkflowError::OracleUnavailable(_) => MANUAL_REVIEW_REASON.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<PricingError> for WorkflowError {
    fn from(err: PricingError) -> Self {
        if err.is_invalid_input() {
            WorkflowError::InvalidInput(err.to_string())
        } else {
            WorkflowError::InvariantViolation(err.to_string())
        }
    }
}

/// Facts fetched at the start of a run and carried unchanged to later stages.
#[derive(Debug)]
struct RunFacts {
    invoice: InvoiceFacts,
    buyer: BuyerProfile,
}

#[derive(Debug)]
enum WorkflowState {
    Started,
    RiskAssessed {
        facts: RunFacts,
        risk: RiskDecision,
    },
    Scored {
        facts: RunFacts,
        risk: RiskDecision,
        score: CreditScoreResult,
    },
    Priced {
        risk: RiskDecision,
        score: CreditScoreResult,
        offer: OfferBreakdown,
    },
}

impl WorkflowState {
    fn stage(&self) -> WorkflowStage {
        match self {
            WorkflowState::Started => WorkflowStage::Started,
            WorkflowState::RiskAssessed { .. } => WorkflowStage::RiskAssessed,
            WorkflowState::Scored { .. } => WorkflowStage::Scored,
            WorkflowState::Priced { .. } => WorkflowStage::Priced,
        }
    }
}

/// Drives one invoice through risk judgment, credit scoring, and pricing.
///
/// Collaborators are shared read-only, so concurrent runs do not interact.
pub struct WorkflowOrchestrator<F, R, S> {
    facts: Arc<F>,
    risk_oracle: Arc<R>,
    scorer: CreditScorer<S>,
    pricing: PricingEngine,
    config: WorkflowConfig,
}

impl<F, R, S> WorkflowOrchestrator<F, R, S>
where
    F: FactsRepository + 'static,
    R: RiskOracleClient + 'static,
    S: ScoringOracleClient + 'static,
{
    pub fn new(
        facts: Arc<F>,
        risk_oracle: Arc<R>,
        scoring_oracle: Arc<S>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            facts,
            risk_oracle,
            scorer: CreditScorer::new(scoring_oracle),
            pricing: PricingEngine::new(),
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Execute the whole pipeline for one invoice. Never panics on stage failure;
    /// every outcome is reported through the returned result.
    pub async fn run_workflow(&self, request: WorkflowRequest) -> WorkflowResult {
        let invoice_id = request.invoice_id;
        info!(invoice_id = invoice_id.0, "factoring workflow started");

        let tenor_days = request.tenor_days.unwrap_or(self.config.default_tenor_days);
        if tenor_days == 0 {
            return self.fail(
                invoice_id,
                WorkflowStage::Started,
                WorkflowError::InvalidInput("tenor must be at least one day".to_string()),
                StageOutputs::default(),
            );
        }

        let mut state = WorkflowState::Started;
        loop {
            let from = state.stage();
            state = match state {
                WorkflowState::Started => match self.assess_risk(&request).await {
                    Ok((facts, risk)) => WorkflowState::RiskAssessed { facts, risk },
                    Err(err) => {
                        return self.fail(invoice_id, from, err, StageOutputs::default())
                    }
                },
                WorkflowState::RiskAssessed { risk, .. } if !risk.financeable => {
                    transition(invoice_id, from, WorkflowStage::Rejected);
                    return WorkflowResult::rejected(invoice_id, risk);
                }
                WorkflowState::RiskAssessed { facts, risk } => {
                    match self.score_credit(&request, &facts).await {
                        Ok(score) => WorkflowState::Scored { facts, risk, score },
                        Err(err) => {
                            let outputs = StageOutputs {
                                risk_decision: Some(risk),
                                ..StageOutputs::default()
                            };
                            return self.fail(invoice_id, from, err, outputs);
                        }
                    }
                }
                WorkflowState::Scored { facts, risk, score } => {
                    match self.price(&facts.invoice, &risk, &score, tenor_days) {
                        Ok(offer) => WorkflowState::Priced { risk, score, offer },
                        Err(err) => {
                            let outputs = StageOutputs {
                                risk_decision: Some(risk),
                                credit_score: Some(score),
                                offer: None,
                            };
                            return self.fail(invoice_id, from, err, outputs);
                        }
                    }
                }
                WorkflowState::Priced { risk, score, offer } => {
                    transition(invoice_id, from, WorkflowStage::Completed);
                    let result = WorkflowResult::completed(invoice_id, risk, score, offer);
                    info!(invoice_id = invoice_id.0, "{}", result.summary());
                    return result;
                }
            };
            transition(invoice_id, from, state.stage());
        }
    }

    async fn assess_risk(
        &self,
        request: &WorkflowRequest,
    ) -> Result<(RunFacts, RiskDecision), WorkflowError> {
        let invoice = self.facts.invoice_facts(request.invoice_id)?;
        invoice.validate().map_err(WorkflowError::InvalidInput)?;
        if invoice.buyer_id != request.buyer_id {
            return Err(WorkflowError::InvalidInput(format!(
                "invoice {} is owed by buyer {}, not {}",
                invoice.invoice_id, invoice.buyer_id, request.buyer_id
            )));
        }
        if invoice.merchant_id != request.merchant_id {
            return Err(WorkflowError::InvalidInput(format!(
                "invoice {} belongs to merchant {}, not {}",
                invoice.invoice_id, invoice.merchant_id, request.merchant_id
            )));
        }

        let buyer = self.facts.buyer_profile(request.buyer_id)?;
        buyer.validate().map_err(WorkflowError::InvalidInput)?;

        let mut risk = self
            .bounded("risk", self.risk_oracle.judge(&buyer, &invoice))
            .await?;

        let clamped = clamp_recommended_rate(risk.recommended_rate).ok_or_else(|| {
            OracleError::Malformed("recommended rate is not a number".to_string())
        })?;
        if clamped != risk.recommended_rate {
            warn!(
                invoice_id = invoice.invoice_id.0,
                recommended = risk.recommended_rate,
                clamped,
                "recommended rate outside policy range"
            );
            risk.recommended_rate = clamped;
        }

        info!(
            invoice_id = invoice.invoice_id.0,
            financeable = risk.financeable,
            risk_tier = risk.risk_tier.label(),
            recommended_rate = risk.recommended_rate,
            "buyer risk assessed"
        );

        Ok((RunFacts { invoice, buyer }, risk))
    }

    async fn score_credit(
        &self,
        request: &WorkflowRequest,
        facts: &RunFacts,
    ) -> Result<CreditScoreResult, WorkflowError> {
        let signals = self.facts.merchant_signals(request.merchant_id)?;
        signals.validate().map_err(WorkflowError::InvalidInput)?;

        let score = self
            .bounded(
                "scoring",
                self.scorer.score(&signals, &facts.buyer, &facts.invoice),
            )
            .await?;

        info!(
            invoice_id = request.invoice_id.0,
            merchant_id = request.merchant_id.0,
            score = score.score,
            tier = score.tier.label(),
            "merchant credit scored"
        );
        Ok(score)
    }

    fn price(
        &self,
        invoice: &InvoiceFacts,
        risk: &RiskDecision,
        score: &CreditScoreResult,
        tenor_days: u32,
    ) -> Result<OfferBreakdown, WorkflowError> {
        let base_rate = if self.config.use_oracle_rate {
            risk.recommended_rate
        } else {
            self.config.base_rate
        };

        let request = OfferRequest::new(invoice.amount, u32::from(score.score))
            .with_tenor(tenor_days)
            .with_base_rate(base_rate);
        self.pricing
            .calculate_offer(request)
            .map_err(WorkflowError::from)
    }

    /// Apply the per-call oracle deadline.
    async fn bounded<T>(
        &self,
        oracle: &'static str,
        call: impl Future<Output = Result<T, OracleError>>,
    ) -> Result<T, OracleError> {
        let limit = self.config.oracle_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(OracleError::Timeout {
                oracle,
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    fn fail(
        &self,
        invoice_id: InvoiceId,
        stage: WorkflowStage,
        err: WorkflowError,
        outputs: StageOutputs,
    ) -> WorkflowResult {
        match &err {
            WorkflowError::InvariantViolation(detail) => error!(
                invoice_id = invoice_id.0,
                stage = stage.label(),
                detail = %detail,
                "factoring workflow invariant violated"
            ),
            other => warn!(
                invoice_id = invoice_id.0,
                stage = stage.label(),
                error = %other,
                "factoring workflow failed"
            ),
        }
        WorkflowResult::failed(invoice_id, stage, err.reason(), outputs)
    }
}

fn transition(invoice_id: InvoiceId, from: WorkflowStage, to: WorkflowStage) {
    info!(
        invoice_id = invoice_id.0,
        from = from.label(),
        to = to.label(),
        "workflow transition"
    );
}
