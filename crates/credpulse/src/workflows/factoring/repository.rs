use super::domain::{
    BuyerId, BuyerProfile, InvoiceFacts, InvoiceId, MerchantId, MerchantSignals,
};

/// Read-only source of the facts a workflow run consumes.
///
/// Implementations hand out owned snapshots; a run never observes later writes.
pub trait FactsRepository: Send + Sync {
    fn invoice_facts(&self, id: InvoiceId) -> Result<InvoiceFacts, RepositoryError>;
    fn buyer_profile(&self, id: BuyerId) -> Result<BuyerProfile, RepositoryError>;
    fn merchant_signals(&self, id: MerchantId) -> Result<MerchantSignals, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("facts repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn invoice_not_found(id: InvoiceId) -> Self {
        Self::NotFound {
            entity: "invoice",
            id: id.0,
        }
    }

    pub fn buyer_not_found(id: BuyerId) -> Self {
        Self::NotFound {
            entity: "buyer",
            id: id.0,
        }
    }

    pub fn merchant_not_found(id: MerchantId) -> Self {
        Self::NotFound {
            entity: "merchant",
            id: id.0,
        }
    }
}
