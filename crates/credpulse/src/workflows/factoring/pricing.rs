//! Deterministic factoring offer calculation.
//!
//! Every intermediate value is kept at full precision; only the figures placed in
//! [`OfferBreakdown`] are rounded to cents.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_RATE: f64 = 2.5;
pub const DEFAULT_TENOR_DAYS: u32 = 30;
pub const MAX_CREDIT_SCORE: u32 = 1000;

/// Share of the invoice value advanced to the merchant.
const ADVANCE_RATIO: f64 = 0.90;
const PROCESSING_FEE_RATIO: f64 = 0.01;
/// Rate added per 30 days of tenor.
const TENOR_STEP_RATE: f64 = 0.5;
const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: f64 = 30.0;
/// Worst-case gap between the reconciled net and its full-precision value.
const ROUNDING_TOLERANCE: f64 = 0.02 + 1e-9;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PricingError {
    #[error("invoice amount must be a positive number, found {0}")]
    InvalidAmount(f64),
    #[error("credit score must be within 0-{MAX_CREDIT_SCORE}, found {0}")]
    InvalidCreditScore(u32),
    #[error("tenor must be at least one day")]
    InvalidTenor,
    #[error("base rate must be a finite, non-negative percentage, found {0}")]
    InvalidBaseRate(f64),
    #[error("net amount {net} drifted from the full-precision payout {expected}")]
    NetAmountMismatch { net: f64, expected: f64 },
}

impl PricingError {
    /// True for caller mistakes, false for internal invariant breaks.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, PricingError::NetAmountMismatch { .. })
    }
}

/// Components of the effective annual rate, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBreakdown {
    pub base_rate: f64,
    pub risk_adjustment: f64,
    pub tenor_adjustment: f64,
    pub effective_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferBreakdown {
    pub invoice_amount: f64,
    pub offer_amount: f64,
    pub discount: f64,
    pub processing_fee: f64,
    pub net_amount: f64,
    pub effective_rate: f64,
    pub tenor_days: u32,
    pub breakdown: RateBreakdown,
    /// Discount normalised to a 30-day month.
    pub monthly_cost: f64,
}

/// Caller-supplied pricing inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfferRequest {
    pub invoice_amount: f64,
    pub credit_score: u32,
    pub tenor_days: u32,
    pub base_rate: f64,
}

impl OfferRequest {
    pub fn new(invoice_amount: f64, credit_score: u32) -> Self {
        Self {
            invoice_amount,
            credit_score,
            tenor_days: DEFAULT_TENOR_DAYS,
            base_rate: DEFAULT_BASE_RATE,
        }
    }

    pub fn with_tenor(mut self, tenor_days: u32) -> Self {
        self.tenor_days = tenor_days;
        self
    }

    pub fn with_base_rate(mut self, base_rate: f64) -> Self {
        self.base_rate = base_rate;
        self
    }

    fn validate(&self) -> Result<(), PricingError> {
        if !self.invoice_amount.is_finite() || self.invoice_amount <= 0.0 {
            return Err(PricingError::InvalidAmount(self.invoice_amount));
        }
        if self.credit_score > MAX_CREDIT_SCORE {
            return Err(PricingError::InvalidCreditScore(self.credit_score));
        }
        if self.tenor_days == 0 {
            return Err(PricingError::InvalidTenor);
        }
        if !self.base_rate.is_finite() || self.base_rate < 0.0 {
            return Err(PricingError::InvalidBaseRate(self.base_rate));
        }
        Ok(())
    }
}

/// Stateless calculator turning an invoice, score, and tenor into an offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate_offer(&self, request: OfferRequest) -> Result<OfferBreakdown, PricingError> {
        request.validate()?;

        let OfferRequest {
            invoice_amount,
            credit_score,
            tenor_days,
            base_rate,
        } = request;
        let tenor = f64::from(tenor_days);

        let risk_adjustment = risk_adjustment(credit_score);
        let tenor_adjustment = (tenor / DAYS_PER_MONTH) * TENOR_STEP_RATE;
        let effective_rate = base_rate + risk_adjustment + tenor_adjustment;

        let offer_amount = invoice_amount * ADVANCE_RATIO;
        let daily_rate = effective_rate / DAYS_PER_YEAR / 100.0;
        let discount = offer_amount * daily_rate * tenor;
        // Fee is taken after the tenor discount.
        let processing_fee = offer_amount * PROCESSING_FEE_RATIO;
        let net_amount = offer_amount - discount - processing_fee;
        let monthly_cost = (discount / tenor) * DAYS_PER_MONTH;

        let offer_cents = round_cents(offer_amount);
        let discount_cents = round_cents(discount);
        let fee_cents = round_cents(processing_fee);
        // Net is reconciled from the published figures so the document always adds up.
        let net_cents = round_cents(offer_cents - discount_cents - fee_cents);
        check_net_amount(net_cents, net_amount)?;

        Ok(OfferBreakdown {
            invoice_amount: round_cents(invoice_amount),
            offer_amount: offer_cents,
            discount: discount_cents,
            processing_fee: fee_cents,
            net_amount: net_cents,
            effective_rate: round_cents(effective_rate),
            tenor_days,
            breakdown: RateBreakdown {
                base_rate,
                risk_adjustment: round_cents(risk_adjustment),
                tenor_adjustment: round_cents(tenor_adjustment),
                effective_rate: round_cents(effective_rate),
            },
            monthly_cost: round_cents(monthly_cost),
        })
    }
}

/// Rate premium for the credit score band.
pub fn risk_adjustment(credit_score: u32) -> f64 {
    if credit_score >= 800 {
        0.0
    } else if credit_score >= 700 {
        0.5
    } else if credit_score >= 600 {
        1.0
    } else {
        1.5
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_net_amount(net_cents: f64, full_precision: f64) -> Result<(), PricingError> {
    if !net_cents.is_finite() || (net_cents - full_precision).abs() > ROUNDING_TOLERANCE {
        return Err(PricingError::NetAmountMismatch {
            net: net_cents,
            expected: round_cents(full_precision),
        });
    }
    Ok(())
}
