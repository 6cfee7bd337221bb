use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::{
    config::RefundPolicyConfig,
    error::Result,
    models::common::refund_reasons,
    services::{
        purchase_service::PurchaseService, refund_service::RefundService,
        response_probe::ResponseProbe,
    },
    utils::Clock,
};

/// Counters from one sweep pass
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepSummary {
    pub candidates: usize,
    pub refunded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Background worker that finds stale purchases and funnels them into
/// the refund executor. Owns its clock so timeout boundaries are
/// deterministic under test; talks to the store through the same
/// services request handlers use.
pub struct RefundSweep {
    policy: RefundPolicyConfig,
    purchases: Arc<PurchaseService>,
    refunds: Arc<RefundService>,
    probe: Arc<dyn ResponseProbe>,
    clock: Arc<dyn Clock>,
}

impl RefundSweep {
    pub fn new(
        policy: &RefundPolicyConfig,
        purchases: Arc<PurchaseService>,
        refunds: Arc<RefundService>,
        probe: Arc<dyn ResponseProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            policy: policy.clone(),
            purchases,
            refunds,
            probe,
            clock,
        }
    }

    /// Run the sweep loop until the process shuts down.
    pub async fn run(self: Arc<Self>) {
        if !self.policy.sweep_enabled {
            info!("Refund eligibility sweep disabled by configuration");
            return;
        }

        let mut ticker = tokio::time::interval(self.policy.sweep_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.policy.sweep_interval_ms,
            response_timeout_minutes = self.policy.response_timeout_minutes,
            "Starting refund eligibility sweep"
        );

        loop {
            ticker.tick().await;

            if !self.policy.auto_refund_enabled {
                debug!("Auto refund disabled, skipping sweep tick");
                continue;
            }

            match self.sweep_once().await {
                Ok(summary) => info!(
                    candidates = summary.candidates,
                    refunded = summary.refunded,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "Refund sweep complete"
                ),
                Err(e) => error!(error = %e, "Refund sweep failed"),
            }
        }
    }

    /// One full pass over the eligible purchases. Every candidate runs
    /// to completion; a failing candidate is logged and skipped, never
    /// aborting the rest of the sweep.
    pub async fn sweep_once(&self) -> Result<SweepSummary> {
        let now = self.clock.now_utc();
        let candidates = self.purchases.find_refund_eligible(now).await?;

        let mut summary = SweepSummary {
            candidates: candidates.len(),
            ..SweepSummary::default()
        };

        for (purchase, _session) in candidates {
            match self.process_candidate(&purchase).await {
                Ok(true) => summary.refunded += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    error!(
                        purchase_id = %purchase.id,
                        error = %e,
                        "Failed to process refund candidate"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Returns true when a refund was applied. A doctor response, or a
    /// refund that raced in between, skips the candidate.
    async fn process_candidate(
        &self,
        purchase: &entity::session_purchases::Model,
    ) -> Result<bool> {
        if self.probe.has_doctor_responded_after(purchase).await? {
            debug!(purchase_id = %purchase.id, "Doctor responded, purchase not refunded");
            return Ok(false);
        }

        let outcome = self
            .refunds
            .execute_refund(purchase.id, refund_reasons::DOCTOR_NO_RESPONSE)
            .await?;

        Ok(outcome.applied)
    }
}
