// Request/Response models
pub mod common;
pub mod earnings;
pub mod payouts;
pub mod purchases;
pub mod refunds;
