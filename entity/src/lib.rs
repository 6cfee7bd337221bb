pub mod prelude;

pub mod earnings;
pub mod payout_requests;
pub mod sea_orm_active_enums;
pub mod session_messages;
pub mod session_purchases;
pub mod session_requests;
pub mod users;
