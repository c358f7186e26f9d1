use serde::{Deserialize, Serialize};

use super::super::days::DayChoiceAdjustments;
use crate::config::PolicySettings;

/// Tunables for the leave policy engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePolicyConfig {
    pub adjustments: DayChoiceAdjustments,
    pub financial_year_start_month: u32,
}

impl Default for LeavePolicyConfig {
    fn default() -> Self {
        Self {
            adjustments: DayChoiceAdjustments::standard(),
            financial_year_start_month: 4,
        }
    }
}

impl From<&PolicySettings> for LeavePolicyConfig {
    fn from(settings: &PolicySettings) -> Self {
        Self {
            financial_year_start_month: settings.financial_year_start_month,
            ..Self::default()
        }
    }
}
