//! # Health Classification
//!
//! Four independent checks, counted into a tri-state verdict. Nothing is
//! persisted; every call recomputes from current data.
//!
//! | Triggered | Status |
//! |-----------|--------|
//! | 0 | healthy |
//! | 1-2 | warning |
//! | 3-4 | critical |

use serde::Serialize;
use shared_types::{Address, Height, U256};

/// One alert check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertCheck {
    /// Too many gaps between the validator's own recent blocks.
    MissedBlocks,
    /// Share of in-window blocks below the uptime floor.
    LowUptime,
    /// In-window fee sum below the rewards floor.
    LowRewards,
    /// Too few in-window blocks carry transactions.
    LowEfficiency,
}

impl AlertCheck {
    /// Name as reported to API clients.
    pub fn name(self) -> &'static str {
        match self {
            Self::MissedBlocks => "missedBlocks",
            Self::LowUptime => "lowUptime",
            Self::LowRewards => "lowRewards",
            Self::LowEfficiency => "lowEfficiency",
        }
    }
}

/// Tri-state health verdict, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// No check triggered.
    Healthy,
    /// One or two checks triggered.
    Warning,
    /// Three or four checks triggered.
    Critical,
}

impl HealthStatus {
    /// Status for a number of triggered checks.
    pub fn from_triggered(count: usize) -> Self {
        match count {
            0 => Self::Healthy,
            1 | 2 => Self::Warning,
            _ => Self::Critical,
        }
    }
}

/// Outcome of the four checks for one validator, with the observed values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertReport {
    /// Validator address.
    pub address: Address,
    /// Missed-blocks check.
    pub missed_blocks: bool,
    /// Uptime check.
    pub low_uptime: bool,
    /// Rewards check.
    pub low_rewards: bool,
    /// Efficiency check.
    pub low_efficiency: bool,
    /// Sum of gaps between the validator's recent blocks.
    pub missed_block_count: u64,
    /// Observed uptime, percent.
    pub uptime: f64,
    /// Observed rewards.
    pub rewards: U256,
    /// Observed efficiency, percent.
    pub efficiency: f64,
}

impl AlertReport {
    /// Triggered checks in a fixed order.
    pub fn triggered(&self) -> Vec<AlertCheck> {
        [
            (self.missed_blocks, AlertCheck::MissedBlocks),
            (self.low_uptime, AlertCheck::LowUptime),
            (self.low_rewards, AlertCheck::LowRewards),
            (self.low_efficiency, AlertCheck::LowEfficiency),
        ]
        .into_iter()
        .filter_map(|(hit, check)| hit.then_some(check))
        .collect()
    }

    /// Verdict for this report.
    pub fn status(&self) -> HealthStatus {
        HealthStatus::from_triggered(self.triggered().len())
    }
}

/// Health verdict with the checks that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Validator address.
    pub address: Address,
    /// Verdict.
    pub status: HealthStatus,
    /// Triggered checks.
    pub alerts: Vec<AlertCheck>,
}

/// Sum of `next - prev - 1` over consecutive heights (ascending).
///
/// This counts heights between the validator's own turns, not blocks it was
/// scheduled for and failed to produce.
pub fn count_missed_blocks(heights: &[Height]) -> u64 {
    heights
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0]).saturating_sub(1))
        .fold(0u64, u64::saturating_add)
}
