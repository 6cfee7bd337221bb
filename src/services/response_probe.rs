use async_trait::async_trait;
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use tracing::instrument;

use crate::error::{ApiError, Result};

/// Collaborator seam to the messaging service: has the doctor sent any
/// activity for this session after the purchase was opened?
#[async_trait]
pub trait ResponseProbe: Send + Sync {
    async fn has_doctor_responded_after(
        &self,
        purchase: &entity::session_purchases::Model,
    ) -> Result<bool>;

    async fn count_doctor_messages_after(
        &self,
        purchase: &entity::session_purchases::Model,
    ) -> Result<u64>;
}

/// Probe backed by the session_messages activity mirror (sender and
/// timestamp facts only; content stays in the messaging service).
pub struct MessageActivityProbe {
    db: DatabaseConnection,
}

impl MessageActivityProbe {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResponseProbe for MessageActivityProbe {
    async fn has_doctor_responded_after(
        &self,
        purchase: &entity::session_purchases::Model,
    ) -> Result<bool> {
        Ok(self.count_doctor_messages_after(purchase).await? > 0)
    }

    #[instrument(skip(self, purchase), fields(purchase_id = %purchase.id))]
    async fn count_doctor_messages_after(
        &self,
        purchase: &entity::session_purchases::Model,
    ) -> Result<u64> {
        let session = entity::session_requests::Entity::find_by_id(purchase.session_request_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "Session request {} for purchase {}",
                    purchase.session_request_id, purchase.id
                ))
            })?;

        let count = entity::session_messages::Entity::find()
            .filter(
                entity::session_messages::Column::SessionRequestId.eq(purchase.session_request_id),
            )
            .filter(entity::session_messages::Column::SenderId.eq(session.doctor_id))
            .filter(entity::session_messages::Column::SentAt.gt(purchase.created_at))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}
