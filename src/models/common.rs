use serde::{Deserialize, Serialize};

use crate::config::WarningThresholds;

/// Simple message response for lightweight endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Well-known refund reasons. The policy table is keyed by these
/// strings; unknown reasons resolve through the "default" entry, so
/// the set is open-ended by design.
pub mod refund_reasons {
    pub const DOCTOR_NO_RESPONSE: &str = "doctor-no-response";
    pub const MANUAL_ADMIN: &str = "manual-admin";
    pub const PATIENT_REQUEST: &str = "patient-request";
    pub const TECHNICAL_ISSUE: &str = "technical-issue";
    pub const DEFAULT: &str = "default";
}

/// Severity tier for doctor-facing warnings, banded from the
/// trailing-window count of refunds the doctor caused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WarningLevel {
    Mild,
    Moderate,
    Severe,
}

impl WarningLevel {
    /// Band a trailing-window refund count against the configured
    /// thresholds. Counts below the mild threshold produce no warning.
    pub fn from_count(count: u64, thresholds: &WarningThresholds) -> Option<Self> {
        if count >= thresholds.severe {
            Some(Self::Severe)
        } else if count >= thresholds.moderate {
            Some(Self::Moderate)
        } else if count >= thresholds.mild {
            Some(Self::Mild)
        } else {
            None
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Mild => {
                "Several of your recent consultations were refunded because no \
                 response was recorded. Please reply to new patients promptly."
            }
            Self::Moderate => {
                "A significant number of your consultations were refunded for no \
                 response in the last 30 days. Continued inactivity may affect \
                 your visibility on the platform."
            }
            Self::Severe => {
                "Your no-response refund rate is critically high. Your account \
                 is under review and may be suspended from new consultations."
            }
        }
    }
}

/// Notification kinds delivered to the per-party sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    RefundProcessed,
    DoctorWarning,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> WarningThresholds {
        WarningThresholds {
            mild: 3,
            moderate: 5,
            severe: 8,
        }
    }

    #[test]
    fn counts_below_mild_produce_no_warning() {
        assert_eq!(WarningLevel::from_count(0, &thresholds()), None);
        assert_eq!(WarningLevel::from_count(2, &thresholds()), None);
    }

    #[test]
    fn banding_is_inclusive_at_each_threshold() {
        assert_eq!(
            WarningLevel::from_count(3, &thresholds()),
            Some(WarningLevel::Mild)
        );
        assert_eq!(
            WarningLevel::from_count(5, &thresholds()),
            Some(WarningLevel::Moderate)
        );
        assert_eq!(
            WarningLevel::from_count(8, &thresholds()),
            Some(WarningLevel::Severe)
        );
    }

    #[test]
    fn six_refunds_resolve_to_moderate_not_severe() {
        assert_eq!(
            WarningLevel::from_count(6, &thresholds()),
            Some(WarningLevel::Moderate)
        );
    }
}
