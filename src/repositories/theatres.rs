use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::{PgStore, StoreError};
use crate::{
    models::{SlotEntity, TheatreEntity, TheatreSlotEntity, TheatreWithSlots},
    schema::{slots, theatre_slots, theatres},
};

#[async_trait]
pub trait TheatresRepository: Send + Sync {
    /// Inserts the theatre together with its slot associations.
    async fn create(&self, theatre: TheatreEntity, slot_ids: Vec<Uuid>) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<TheatreEntity>, StoreError>;

    async fn get_with_slots(&self, id: Uuid) -> Result<TheatreWithSlots, StoreError>;
}

#[async_trait]
impl TheatresRepository for PgStore {
    async fn create(&self, theatre: TheatreEntity, slot_ids: Vec<Uuid>) -> Result<(), StoreError> {
        let conn = &mut self.conn().await?;

        conn.transaction(move |conn| {
            Box::pin(async move {
                diesel::insert_into(theatres::table)
                    .values(&theatre)
                    .execute(conn)
                    .await?;

                let links: Vec<TheatreSlotEntity> = slot_ids
                    .into_iter()
                    .map(|slot_id| TheatreSlotEntity {
                        theatre_id: theatre.id,
                        slot_id,
                    })
                    .collect();

                diesel::insert_into(theatre_slots::table)
                    .values(&links)
                    .execute(conn)
                    .await?;

                Ok::<(), StoreError>(())
            })
        })
        .await
    }

    async fn list(&self) -> Result<Vec<TheatreEntity>, StoreError> {
        let conn = &mut self.conn().await?;

        let theatres = theatres::table
            .order_by(theatres::name.asc())
            .select(TheatreEntity::as_select())
            .load(conn)
            .await?;

        Ok(theatres)
    }

    async fn get_with_slots(&self, id: Uuid) -> Result<TheatreWithSlots, StoreError> {
        let conn = &mut self.conn().await?;

        let theatre = theatres::table
            .find(id)
            .select(TheatreEntity::as_select())
            .first(conn)
            .await
            .optional()?
            .ok_or(StoreError::NotFound)?;

        let slots = theatre_slots::table
            .inner_join(slots::table)
            .filter(theatre_slots::theatre_id.eq(id))
            .order_by(slots::start_time.asc())
            .select(SlotEntity::as_select())
            .load(conn)
            .await?;

        Ok(TheatreWithSlots { theatre, slots })
    }
}
