use crate::checks::CheckKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_SCORE: u32 = 100;
pub const HEALTHY_THRESHOLD: u32 = 80;
pub const NEEDS_ATTENTION_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    NeedsAttention,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u32) -> Self {
        if score >= HEALTHY_THRESHOLD {
            Self::Healthy
        } else if score >= NEEDS_ATTENTION_THRESHOLD {
            Self::NeedsAttention
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "✓ Healthy",
            Self::NeedsAttention => "⚠ Needs Attention",
            Self::Critical => "❌ Critical",
        }
    }
}

/// `max(0, 100 - sum)`, without overflow for any input.
pub fn compute_score(penalties: impl IntoIterator<Item = u32>) -> u32 {
    let total = penalties
        .into_iter()
        .fold(0u32, |acc, p| acc.saturating_add(p));
    MAX_SCORE.saturating_sub(total)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u32,
    pub status: HealthStatus,
    /// Penalty per check that ran, keyed in default check order.
    pub penalties: BTreeMap<CheckKind, u32>,
}

impl HealthScore {
    pub fn from_penalties(penalties: BTreeMap<CheckKind, u32>) -> Self {
        let score = compute_score(penalties.values().copied());
        Self {
            score,
            status: HealthStatus::from_score(score),
            penalties,
        }
    }

    pub fn total_penalty(&self) -> u32 {
        self.penalties
            .values()
            .fold(0u32, |acc, &p| acc.saturating_add(p))
    }
}
