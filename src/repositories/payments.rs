use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use super::{PgStore, StoreError};
use crate::{
    models::{CreatePaymentEntity, PaymentEntity, PaymentStatus},
    schema::payments,
};

#[async_trait]
pub trait PaymentsRepository: Send + Sync {
    async fn create_pending(&self, razorpay_order_id: &str) -> Result<PaymentEntity, StoreError>;

    /// Marks the payment as successful. Returns `None` when no payment row
    /// exists for the gateway order id.
    async fn mark_success(
        &self,
        razorpay_order_id: &str,
        razorpay_payment_id: &str,
        razorpay_signature: &str,
    ) -> Result<Option<PaymentEntity>, StoreError>;

    async fn find(&self, razorpay_order_id: &str) -> Result<Option<PaymentEntity>, StoreError>;
}

#[async_trait]
impl PaymentsRepository for PgStore {
    async fn create_pending(&self, razorpay_order_id: &str) -> Result<PaymentEntity, StoreError> {
        let conn = &mut self.conn().await?;

        let payment = diesel::insert_into(payments::table)
            .values(CreatePaymentEntity {
                razorpay_order_id: razorpay_order_id.to_string(),
                status: PaymentStatus::Pending.to_string(),
            })
            .returning(PaymentEntity::as_returning())
            .get_result(conn)
            .await?;

        Ok(payment)
    }

    async fn mark_success(
        &self,
        razorpay_order_id: &str,
        razorpay_payment_id: &str,
        razorpay_signature: &str,
    ) -> Result<Option<PaymentEntity>, StoreError> {
        let conn = &mut self.conn().await?;

        let payment = diesel::update(payments::table.find(razorpay_order_id))
            .set((
                payments::status.eq(PaymentStatus::Success.to_string()),
                payments::razorpay_payment_id.eq(Some(razorpay_payment_id)),
                payments::razorpay_signature.eq(Some(razorpay_signature)),
                payments::updated_at.eq(diesel::dsl::now),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result(conn)
            .await
            .optional()?;

        Ok(payment)
    }

    async fn find(&self, razorpay_order_id: &str) -> Result<Option<PaymentEntity>, StoreError> {
        let conn = &mut self.conn().await?;

        let payment = payments::table
            .find(razorpay_order_id)
            .select(PaymentEntity::as_select())
            .first(conn)
            .await
            .optional()?;

        Ok(payment)
    }
}
