use async_trait::async_trait;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use super::{PgStore, StoreError};
use crate::{models::AddonEntity, schema::addons};

#[async_trait]
pub trait AddonsRepository: Send + Sync {
    async fn create(&self, addon: AddonEntity) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<AddonEntity>, StoreError>;
}

#[async_trait]
impl AddonsRepository for PgStore {
    async fn create(&self, addon: AddonEntity) -> Result<(), StoreError> {
        let conn = &mut self.conn().await?;

        diesel::insert_into(addons::table)
            .values(&addon)
            .execute(conn)
            .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<AddonEntity>, StoreError> {
        let conn = &mut self.conn().await?;

        let addons = addons::table
            .order_by((addons::category.asc(), addons::name.asc()))
            .select(AddonEntity::as_select())
            .load(conn)
            .await?;

        Ok(addons)
    }
}
