//! Invoice factoring pipeline: buyer risk judgment, merchant credit scoring, and
//! offer pricing, sequenced by [`WorkflowOrchestrator`].

pub mod domain;
pub mod oracle;
pub mod orchestrator;
pub mod pricing;
pub mod repository;
pub mod result;
pub mod router;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use domain::{
    BuyerId, BuyerProfile, CashflowSummary, ComplianceSummary, CreditScoreResult, CreditTier,
    InvoiceFacts, InvoiceId, MerchantId, MerchantSignals, RiskDecision, RiskTier,
    VelocitySummary, VelocityTrend,
};
pub use oracle::{
    clamp_recommended_rate, HeuristicRiskOracle, HeuristicScoringOracle, OracleError,
    RiskOracleClient, ScoringOracleClient,
};
pub use orchestrator::{WorkflowError, WorkflowOrchestrator, WorkflowRequest, WorkflowStage};
pub use pricing::{OfferBreakdown, OfferRequest, PricingEngine, PricingError, RateBreakdown};
pub use repository::{FactsRepository, RepositoryError};
pub use result::{FinalDecision, WorkflowResult, WorkflowStatus};
pub use router::{factoring_router, QuoteRequest};
pub use scoring::{tier_for_score, CreditScorer};
