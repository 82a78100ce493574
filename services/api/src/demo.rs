use crate::infra::demo_orchestrator;
use clap::Args;
use credpulse::config::AppConfig;
use credpulse::error::AppError;
use credpulse::workflows::factoring::{
    BuyerId, InvoiceId, MerchantId, OfferBreakdown, OfferRequest, PricingEngine,
    WorkflowRequest, WorkflowResult,
};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Seeded invoice to analyze (1-3)
    #[arg(long)]
    pub(crate) invoice_id: u64,
    /// Buyer that owes the invoice (101-103)
    #[arg(long)]
    pub(crate) buyer_id: u64,
    /// Merchant requesting financing
    #[arg(long, default_value_t = 1)]
    pub(crate) merchant_id: u64,
    /// Override the configured tenor in days
    #[arg(long)]
    pub(crate) tenor_days: Option<u32>,
    /// Print the raw workflow result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Invoice amount to finance
    #[arg(long)]
    pub(crate) amount: f64,
    /// Merchant credit score (0-1000)
    #[arg(long)]
    pub(crate) score: u32,
    /// Financing tenor in days
    #[arg(long)]
    pub(crate) tenor_days: Option<u32>,
    /// Annual base rate in percent
    #[arg(long)]
    pub(crate) base_rate: Option<f64>,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let orchestrator = demo_orchestrator(config.workflow);

    let mut request = WorkflowRequest::new(
        InvoiceId(args.invoice_id),
        BuyerId(args.buyer_id),
        MerchantId(args.merchant_id),
    );
    request.tenor_days = args.tenor_days;

    let result = orchestrator.run_workflow(request).await;
    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => eprintln!("failed to render result as JSON: {err}"),
        }
    } else {
        render_workflow_result(&result);
    }
    Ok(())
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let request = OfferRequest::new(args.amount, args.score)
        .with_tenor(args.tenor_days.unwrap_or(config.workflow.default_tenor_days))
        .with_base_rate(args.base_rate.unwrap_or(config.workflow.base_rate));

    let offer = PricingEngine::new().calculate_offer(request)?;
    println!("Factoring offer quote");
    render_offer(&offer);
    Ok(())
}

fn render_workflow_result(result: &WorkflowResult) {
    println!("Factoring workflow for invoice {}", result.invoice_id);
    println!("Status: {}", result.status.label());
    if let Some(reason) = &result.reason {
        println!("Reason: {reason}");
    }
    if let Some(stage) = result.failed_stage {
        println!("Stopped after stage: {}", stage.label());
    }

    if let Some(risk) = &result.risk_decision {
        println!("\nBuyer risk");
        println!(
            "- financeable: {} | tier {} | recommended rate {:.2}%",
            if risk.financeable { "yes" } else { "no" },
            risk.risk_tier.label(),
            risk.recommended_rate
        );
        if !risk.rationale.is_empty() {
            println!("- {}", risk.rationale);
        }
    }

    if let Some(score) = &result.credit_score {
        println!("\nMerchant credit");
        println!(
            "- score {} ({}) | confidence {:.0}%",
            score.score,
            score.tier.label(),
            score.confidence * 100.0
        );
        for reason in &score.rationale {
            println!("  - {reason}");
        }
    }

    if let Some(offer) = &result.offer {
        println!("\nOffer");
        render_offer(offer);
    }

    if let Some(decision) = &result.final_decision {
        println!(
            "\nFinal decision: {} ({:.0}% confidence) - {}",
            if decision.approved { "approved" } else { "declined" },
            decision.confidence * 100.0,
            decision.reasoning
        );
        for action in &decision.next_actions {
            println!("  - {action}");
        }
    }
}

fn render_offer(offer: &OfferBreakdown) {
    println!("- invoice amount: {:.2}", offer.invoice_amount);
    println!("- advance (90%): {:.2}", offer.offer_amount);
    println!(
        "- discount: {:.2} over {} days at {:.2}% effective",
        offer.discount, offer.tenor_days, offer.effective_rate
    );
    println!(
        "  (base {:.2}% + risk {:.2}% + tenor {:.2}%)",
        offer.breakdown.base_rate, offer.breakdown.risk_adjustment, offer.breakdown.tenor_adjustment
    );
    println!("- processing fee: {:.2}", offer.processing_fee);
    println!("- net payout: {:.2}", offer.net_amount);
    println!("- monthly cost: {:.2}", offer.monthly_cost);
}
