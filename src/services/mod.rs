// Service modules
pub mod earning_service;
pub mod notifier;
pub mod payout_service;
pub mod purchase_service;
pub mod refund_service;
pub mod response_probe;
pub mod sweep;

pub use earning_service::EarningService;
pub use notifier::{ChannelNotifier, Notification, Notifier};
pub use payout_service::PayoutService;
pub use purchase_service::PurchaseService;
pub use refund_service::{RefundOutcome, RefundService};
pub use response_probe::{MessageActivityProbe, ResponseProbe};
pub use sweep::{RefundSweep, SweepSummary};
