pub use super::earnings::Entity as Earnings;
pub use super::payout_requests::Entity as PayoutRequests;
pub use super::session_messages::Entity as SessionMessages;
pub use super::session_purchases::Entity as SessionPurchases;
pub use super::session_requests::Entity as SessionRequests;
pub use super::users::Entity as Users;
