// Middleware modules
pub mod identity;
pub mod logging;
pub mod rate_limit;

// Export identity middleware components
pub use identity::{identity_middleware, PartyIdentity};

// Export rate limit middleware components
pub use rate_limit::create_rate_limiter;

// Export logging middleware
pub use logging::logging_middleware;
