//! Order creation workflow.
//!
//! An attempt moves through validation, the duplicate check, payment intent
//! creation and persistence. Any failing stage aborts the attempt; the only
//! state that can survive an abort is a pending payment whose order failed to
//! persist, which is logged with its provider order id.

use std::sync::Arc;

use uuid::Uuid;

use super::payments::{PaymentError, PaymentsService};
use crate::{
    models::{Order, OrderAddon, OrderDetails},
    params::{FieldErrors, OrderParams, ValidateParams},
    repositories::{ORDER_SLOT_UNIQUE, OrdersRepository, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("invalid order")]
    Validation(FieldErrors),

    #[error("order already exists for the given theatre and slot")]
    DuplicateOrder,

    #[error("order references an unknown theatre, slot or addon")]
    UnknownReference,

    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => OrderError::NotFound,
            err if err.is_unique_violation(ORDER_SLOT_UNIQUE) => OrderError::DuplicateOrder,
            StoreError::MissingReference(_) => OrderError::UnknownReference,
            err => OrderError::Store(err),
        }
    }
}

/// Charge amount in minor currency units.
pub fn minor_units(total_price: i32) -> i64 {
    i64::from(total_price) * 100
}

pub struct OrdersService {
    orders: Arc<dyn OrdersRepository>,
    payments: Arc<PaymentsService>,
}

impl OrdersService {
    pub fn new(orders: Arc<dyn OrdersRepository>, payments: Arc<PaymentsService>) -> Self {
        Self { orders, payments }
    }

    pub async fn create(&self, params: OrderParams) -> Result<Order, OrderError> {
        let errors = params.validate_params();
        if !errors.is_empty() {
            return Err(OrderError::Validation(errors));
        }
        let mut order = into_order(params)?;

        if self
            .orders
            .find_by_theatre_slot_date(order.theatre_id, order.slot_id, order.order_date)
            .await?
            .is_some()
        {
            tracing::info!(
                theatre_id = %order.theatre_id,
                slot_id = %order.slot_id,
                order_date = %order.order_date,
                "Slot already booked"
            );
            return Err(OrderError::DuplicateOrder);
        }

        let amount = minor_units(order.total_price);
        order.razorpay_order_id = self.payments.create_payment_intent(amount).await?;

        match self
            .orders
            .create_order(order.to_entity(), order.line_items())
            .await
        {
            Ok(ordered_at) => order.ordered_at = ordered_at,
            Err(err) => {
                tracing::warn!(
                    order_id = %order.id,
                    razorpay_order_id = %order.razorpay_order_id,
                    error = %err,
                    "Order not persisted, payment intent left pending"
                );
                return Err(err.into());
            }
        }

        tracing::info!(
            order_id = %order.id,
            razorpay_order_id = %order.razorpay_order_id,
            amount,
            "Order created"
        );
        Ok(order)
    }

    pub async fn get_all(&self) -> Result<Vec<OrderDetails>, OrderError> {
        Ok(self.orders.get_all().await?)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<OrderDetails, OrderError> {
        Ok(self.orders.get_by_id(id).await?)
    }
}

/// Builds the order from already validated params.
fn into_order(params: OrderParams) -> Result<Order, OrderError> {
    let parse = |field: &str, value: &str| {
        Uuid::parse_str(value).map_err(|_| {
            OrderError::Validation(FieldErrors::from([(
                field.to_string(),
                "must be a valid uuid".to_string(),
            )]))
        })
    };

    let addons = params
        .addons
        .iter()
        .map(|addon| {
            Ok(OrderAddon {
                id: parse("addons", &addon.id)?,
                quantity: addon.quantity,
            })
        })
        .collect::<Result<Vec<_>, OrderError>>()?;

    Ok(Order {
        id: Uuid::new_v4(),
        theatre_id: parse("theatre_id", &params.theatre_id)?,
        slot_id: parse("slot_id", &params.slot_id)?,
        customer_name: params.customer_name,
        customer_email: params.customer_email,
        phone_number: params.phone_number,
        addons,
        no_of_persons: params.no_of_persons,
        total_price: params.total_price,
        order_date: params.order_date,
        ordered_at: chrono::Utc::now(),
        razorpay_order_id: String::new(),
    })
}
