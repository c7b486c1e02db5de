use async_trait::async_trait;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use super::{PgStore, StoreError};
use crate::{models::SlotEntity, schema::slots};

#[async_trait]
pub trait SlotsRepository: Send + Sync {
    async fn create(&self, slot: SlotEntity) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<SlotEntity>, StoreError>;
}

#[async_trait]
impl SlotsRepository for PgStore {
    async fn create(&self, slot: SlotEntity) -> Result<(), StoreError> {
        let conn = &mut self.conn().await?;

        diesel::insert_into(slots::table)
            .values(&slot)
            .execute(conn)
            .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<SlotEntity>, StoreError> {
        let conn = &mut self.conn().await?;

        let slots = slots::table
            .order_by(slots::start_time.asc())
            .select(SlotEntity::as_select())
            .load(conn)
            .await?;

        Ok(slots)
    }
}
