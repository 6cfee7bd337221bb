use crate::{
    config::Config,
    services::{ChannelNotifier, EarningService, PayoutService, PurchaseService, RefundService},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: Arc<redis::Client>,
    pub purchase_service: Arc<PurchaseService>,
    pub refund_service: Arc<RefundService>,
    pub earning_service: Arc<EarningService>,
    pub payout_service: Arc<PayoutService>,
    pub notifier: Arc<ChannelNotifier>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        // Connect to database
        let db = sea_orm::Database::connect(&config.database.url).await?;

        // Connect to Redis
        let redis = Arc::new(redis::Client::open(config.redis.url.as_str())?);

        // Initialize services
        let notifier = Arc::new(ChannelNotifier::new());
        let purchase_service = Arc::new(PurchaseService::new(db.clone(), &config.refund_policy));
        let refund_service = Arc::new(RefundService::new(
            db.clone(),
            &config.refund_policy,
            purchase_service.clone(),
            notifier.clone(),
        ));
        let earning_service = Arc::new(EarningService::new(db.clone(), &config.earnings));
        let payout_service = Arc::new(PayoutService::new(db.clone()));

        Ok(Self {
            db,
            redis,
            purchase_service,
            refund_service,
            earning_service,
            payout_service,
            notifier,
            config: Arc::new(config),
        })
    }
}
