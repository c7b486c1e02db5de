use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use super::{PgStore, StoreError};
use crate::{models::UserEntity, schema::users};

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn create(&self, user: UserEntity) -> Result<(), StoreError>;

    /// Emails are stored lower-cased; callers pass the normalized form.
    async fn get_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError>;
}

#[async_trait]
impl UsersRepository for PgStore {
    async fn create(&self, user: UserEntity) -> Result<(), StoreError> {
        let conn = &mut self.conn().await?;

        diesel::insert_into(users::table)
            .values(&user)
            .execute(conn)
            .await?;

        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        let conn = &mut self.conn().await?;

        let user = users::table
            .filter(users::email.eq(email))
            .select(UserEntity::as_select())
            .first(conn)
            .await
            .optional()?;

        Ok(user)
    }
}
