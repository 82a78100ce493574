use serde::{Deserialize, Serialize};

use super::domain::{CreditScoreResult, InvoiceId, RiskDecision};
use super::orchestrator::WorkflowStage;
use super::pricing::OfferBreakdown;

const APPROVAL_CONFIDENCE: f64 = 0.95;
const APPROVAL_REASONING: &str = "All checks passed";
const APPROVAL_NEXT_ACTIONS: [&str; 2] = ["Trigger disbursement", "Schedule auto-reconciliation"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Completed,
    Rejected,
    Failed,
}

impl WorkflowStatus {
    pub const fn label(self) -> &'static str {
        match self {
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Rejected => "rejected",
            WorkflowStatus::Failed => "failed",
        }
    }
}

/// Aggregated outcome attached to completed runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDecision {
    pub approved: bool,
    pub confidence: f64,
    pub reasoning: String,
    pub next_actions: Vec<String>,
}

impl FinalDecision {
    fn approved() -> Self {
        Self {
            approved: true,
            confidence: APPROVAL_CONFIDENCE,
            reasoning: APPROVAL_REASONING.to_string(),
            next_actions: APPROVAL_NEXT_ACTIONS
                .iter()
                .map(|action| action.to_string())
                .collect(),
        }
    }
}

/// Outputs gathered by the stages that ran before a run ended.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StageOutputs {
    pub risk_decision: Option<RiskDecision>,
    pub credit_score: Option<CreditScoreResult>,
    pub offer: Option<OfferBreakdown>,
}

/// Record produced once per workflow run.
///
/// Stage outputs that were never produced serialise as `null` so every status
/// shares one JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub invoice_id: InvoiceId,
    pub status: WorkflowStatus,
    pub reason: Option<String>,
    /// Last stage a failed run reached before stopping.
    pub failed_stage: Option<WorkflowStage>,
    pub risk_decision: Option<RiskDecision>,
    pub credit_score: Option<CreditScoreResult>,
    pub offer: Option<OfferBreakdown>,
    pub final_decision: Option<FinalDecision>,
}

impl WorkflowResult {
    pub(crate) fn completed(
        invoice_id: InvoiceId,
        risk_decision: RiskDecision,
        credit_score: CreditScoreResult,
        offer: OfferBreakdown,
    ) -> Self {
        Self {
            invoice_id,
            status: WorkflowStatus::Completed,
            reason: None,
            failed_stage: None,
            risk_decision: Some(risk_decision),
            credit_score: Some(credit_score),
            offer: Some(offer),
            final_decision: Some(FinalDecision::approved()),
        }
    }

    pub(crate) fn rejected(invoice_id: InvoiceId, risk_decision: RiskDecision) -> Self {
        let reason = if risk_decision.rationale.is_empty() {
            "invoice not financeable".to_string()
        } else {
            format!("invoice not financeable: {}", risk_decision.rationale)
        };

        Self {
            invoice_id,
            status: WorkflowStatus::Rejected,
            reason: Some(reason),
            failed_stage: None,
            risk_decision: Some(risk_decision),
            credit_score: None,
            offer: None,
            final_decision: None,
        }
    }

    pub(crate) fn failed(
        invoice_id: InvoiceId,
        stage: WorkflowStage,
        reason: String,
        outputs: StageOutputs,
    ) -> Self {
        Self {
            invoice_id,
            status: WorkflowStatus::Failed,
            reason: Some(reason),
            failed_stage: Some(stage),
            risk_decision: outputs.risk_decision,
            credit_score: outputs.credit_score,
            offer: outputs.offer,
            final_decision: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.final_decision
            .as_ref()
            .map(|decision| decision.approved)
            .unwrap_or(false)
    }

    /// One-line description for logs and terminal output.
    pub fn summary(&self) -> String {
        match self.status {
            WorkflowStatus::Completed => match &self.offer {
                Some(offer) => format!(
                    "invoice {} approved: net {:.2} at {:.2}% over {} days",
                    self.invoice_id, offer.net_amount, offer.effective_rate, offer.tenor_days
                ),
                None => format!("invoice {} approved", self.invoice_id),
            },
            WorkflowStatus::Rejected | WorkflowStatus::Failed => format!(
                "invoice {} {}: {}",
                self.invoice_id,
                self.status.label(),
                self.reason.as_deref().unwrap_or("no reason recorded")
            ),
        }
    }
}
