use serde::Deserialize;

use super::{OracleError, MIN_RECOMMENDED_RATE};
use crate::workflows::factoring::domain::{CreditScoreResult, CreditTier, RiskDecision, RiskTier};
use crate::workflows::factoring::scoring::tier_for_score;

/// Wire shape of a risk judgment document.
#[derive(Debug, Deserialize)]
struct RawRiskJudgment {
    decision: String,
    #[serde(default)]
    recommended_rate: Option<f64>,
    #[serde(default)]
    reasoning: String,
    risk_level: String,
}

/// Wire shape of a credit scoring document.
#[derive(Debug, Deserialize)]
struct RawScoreJudgment {
    credit_score: i64,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    reasoning: Vec<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Parse `{"decision": "YES"|"NO", "recommended_rate", "reasoning", "risk_level"}`.
///
/// The rate is passed through unclamped; bounding it is the orchestrator's job.
pub fn parse_risk_judgment(raw: &str) -> Result<RiskDecision, OracleError> {
    let judgment: RawRiskJudgment = serde_json::from_str(raw.trim())
        .map_err(|err| OracleError::Malformed(format!("risk judgment: {err}")))?;

    let financeable = match judgment.decision.trim().to_ascii_uppercase().as_str() {
        "YES" => true,
        "NO" => false,
        other => {
            return Err(OracleError::Malformed(format!(
                "decision must be YES or NO, found '{other}'"
            )))
        }
    };

    let risk_tier = match judgment.risk_level.trim().to_ascii_lowercase().as_str() {
        "low" => RiskTier::Low,
        "medium" => RiskTier::Medium,
        "high" => RiskTier::High,
        other => {
            return Err(OracleError::Malformed(format!(
                "risk_level must be low, medium, or high, found '{other}'"
            )))
        }
    };

    let recommended_rate = match (judgment.recommended_rate, financeable) {
        (Some(rate), _) => rate,
        (None, false) => MIN_RECOMMENDED_RATE,
        (None, true) => {
            return Err(OracleError::Malformed(
                "financeable judgment is missing recommended_rate".to_string(),
            ))
        }
    };

    Ok(RiskDecision {
        financeable,
        recommended_rate,
        risk_tier,
        rationale: judgment.reasoning.trim().to_string(),
    })
}

/// Parse `{"credit_score", "tier", "reasoning": [..], "confidence"}`.
///
/// A tier label that disagrees with the score band is replaced by the band.
pub fn parse_score_judgment(raw: &str) -> Result<CreditScoreResult, OracleError> {
    let judgment: RawScoreJudgment = serde_json::from_str(raw.trim())
        .map_err(|err| OracleError::Malformed(format!("score judgment: {err}")))?;

    let score = u16::try_from(judgment.credit_score)
        .ok()
        .filter(|score| *score <= 1000)
        .ok_or_else(|| {
            OracleError::Malformed(format!(
                "credit_score must be within 0-1000, found {}",
                judgment.credit_score
            ))
        })?;

    if let Some(label) = judgment.tier.as_deref() {
        if tier_from_label(label).is_none() {
            return Err(OracleError::Malformed(format!("unknown credit tier '{label}'")));
        }
    }

    Ok(CreditScoreResult {
        score,
        tier: tier_for_score(score),
        rationale: judgment.reasoning,
        confidence: judgment.confidence.unwrap_or(0.0),
    })
}

fn tier_from_label(label: &str) -> Option<CreditTier> {
    match label.trim().to_ascii_lowercase().as_str() {
        "excellent" => Some(CreditTier::Excellent),
        "very_good" | "very good" => Some(CreditTier::VeryGood),
        "good" => Some(CreditTier::Good),
        "medium" => Some(CreditTier::Medium),
        "risky" => Some(CreditTier::Risky),
        _ => None,
    }
}
