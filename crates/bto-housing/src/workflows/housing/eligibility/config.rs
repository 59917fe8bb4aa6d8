use serde::{Deserialize, Serialize};

pub const DEFAULT_SINGLE_MIN_AGE: u8 = 35;
pub const DEFAULT_MARRIED_MIN_AGE: u8 = 21;

/// Age thresholds applied by the eligibility engine.
///
/// These are scheme policy defaults, configurable per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub single_min_age: u8,
    pub married_min_age: u8,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            single_min_age: DEFAULT_SINGLE_MIN_AGE,
            married_min_age: DEFAULT_MARRIED_MIN_AGE,
        }
    }
}
