use credpulse::config::WorkflowConfig;
use credpulse::workflows::factoring::{
    BuyerId, BuyerProfile, CashflowSummary, ComplianceSummary, FactsRepository,
    HeuristicRiskOracle, HeuristicScoringOracle, InvoiceFacts, InvoiceId, MerchantId,
    MerchantSignals, RepositoryError, VelocitySummary, VelocityTrend, WorkflowOrchestrator,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

pub(crate) type DemoOrchestrator =
    WorkflowOrchestrator<InMemoryFactsRepository, HeuristicRiskOracle, HeuristicScoringOracle>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFactsRepository {
    invoices: Arc<Mutex<HashMap<InvoiceId, InvoiceFacts>>>,
    buyers: Arc<Mutex<HashMap<BuyerId, BuyerProfile>>>,
    merchants: Arc<Mutex<HashMap<MerchantId, MerchantSignals>>>,
}

impl InMemoryFactsRepository {
    /// One merchant with three invoices, each owed by a buyer with a different risk profile.
    pub(crate) fn seeded() -> Self {
        let repository = Self::default();

        let buyers = [
            seed_buyer(101, "Excellent Corp - Fast Payer", 18, 0.95, 25, 850),
            seed_buyer(102, "Good Business Ltd", 35, 0.82, 12, 680),
            seed_buyer(103, "High Risk Corp", 60, 0.65, 8, 450),
        ];
        let invoices = [
            seed_invoice(1, 101, 75_000.0),
            seed_invoice(2, 102, 150_000.0),
            seed_invoice(3, 103, 250_000.0),
        ];

        if let Ok(mut guard) = repository.buyers.lock() {
            guard.extend(buyers.into_iter().map(|buyer| (buyer.buyer_id, buyer)));
        }
        if let Ok(mut guard) = repository.invoices.lock() {
            guard.extend(
                invoices
                    .into_iter()
                    .map(|invoice| (invoice.invoice_id, invoice)),
            );
        }
        if let Ok(mut guard) = repository.merchants.lock() {
            let signals = seed_merchant(1);
            guard.insert(signals.merchant_id, signals);
        }

        repository
    }
}

impl FactsRepository for InMemoryFactsRepository {
    fn invoice_facts(&self, id: InvoiceId) -> Result<InvoiceFacts, RepositoryError> {
        let guard = self
            .invoices
            .lock()
            .map_err(|_| RepositoryError::Unavailable("invoice store poisoned".to_string()))?;
        guard
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::invoice_not_found(id))
    }

    fn buyer_profile(&self, id: BuyerId) -> Result<BuyerProfile, RepositoryError> {
        let guard = self
            .buyers
            .lock()
            .map_err(|_| RepositoryError::Unavailable("buyer store poisoned".to_string()))?;
        guard
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::buyer_not_found(id))
    }

    fn merchant_signals(&self, id: MerchantId) -> Result<MerchantSignals, RepositoryError> {
        let guard = self
            .merchants
            .lock()
            .map_err(|_| RepositoryError::Unavailable("merchant store poisoned".to_string()))?;
        guard
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::merchant_not_found(id))
    }
}

pub(crate) fn demo_orchestrator(config: WorkflowConfig) -> DemoOrchestrator {
    WorkflowOrchestrator::new(
        Arc::new(InMemoryFactsRepository::seeded()),
        Arc::new(HeuristicRiskOracle::default()),
        Arc::new(HeuristicScoringOracle),
        config,
    )
}

fn seed_buyer(
    id: u64,
    name: &str,
    avg_payment_days: u32,
    on_time_rate: f64,
    total_invoices: u32,
    risk_score: u16,
) -> BuyerProfile {
    BuyerProfile {
        buyer_id: BuyerId(id),
        name: name.to_string(),
        avg_payment_days,
        on_time_rate,
        total_invoices,
        risk_score,
    }
}

fn seed_invoice(id: u64, buyer: u64, amount: f64) -> InvoiceFacts {
    InvoiceFacts {
        invoice_id: InvoiceId(id),
        merchant_id: MerchantId(1),
        buyer_id: BuyerId(buyer),
        invoice_number: format!("INV-2025-{id:04}"),
        amount,
        verified: true,
        irn: Some(format!("IRN{id:06}ABC123")),
    }
}

fn seed_merchant(id: u64) -> MerchantSignals {
    MerchantSignals {
        merchant_id: MerchantId(id),
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

#[cfg(test)]
mod tests {
    use super::*;
    use credpulse::workflows::factoring::{WorkflowRequest, WorkflowStatus};

    fn request(invoice: u64, buyer: u64) -> WorkflowRequest {
        WorkflowRequest::new(InvoiceId(invoice), BuyerId(buyer), MerchantId(1))
    }

    #[tokio::test]
    async fn seeded_invoices_cover_each_outcome() {
        let orchestrator = demo_orchestrator(WorkflowConfig::default());

        let fast_payer = orchestrator.run_workflow(request(1, 101)).await;
        assert_eq!(fast_payer.status, WorkflowStatus::Completed);
        let offer = fast_payer.offer.expect("offer priced");
        assert_eq!(offer.effective_rate, 3.0);
        assert_eq!(offer.net_amount, 66_658.56);

        let average_payer = orchestrator.run_workflow(request(2, 102)).await;
        assert_eq!(average_payer.status, WorkflowStatus::Completed);

        let risky_payer = orchestrator.run_workflow(request(3, 103)).await;
        assert_eq!(risky_payer.status, WorkflowStatus::Rejected);
        assert!(risky_payer.credit_score.is_none());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let repository = InMemoryFactsRepository::seeded();
        assert_eq!(
            repository.buyer_profile(BuyerId(999)),
            Err(RepositoryError::buyer_not_found(BuyerId(999)))
        );
        assert!(repository.merchant_signals(MerchantId(1)).is_ok());
    }
}
