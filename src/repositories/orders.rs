use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::{PgStore, StoreError};
use crate::{
    models::{
        AddonEntity, CreateOrderEntity, OrderAddonDetails, OrderAddonEntity, OrderDetails,
        OrderEntity, PaymentEntity, SlotEntity, TheatreEntity,
    },
    schema::{addons, order_addons, orders, payments, slots, theatres},
};

#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Exact-match lookup backing the one-booking-per-slot check.
    async fn find_by_theatre_slot_date(
        &self,
        theatre_id: Uuid,
        slot_id: Uuid,
        order_date: NaiveDate,
    ) -> Result<Option<OrderEntity>, StoreError>;

    /// Inserts the order and all of its line items in one transaction and
    /// returns the server-assigned order timestamp.
    async fn create_order(
        &self,
        order: CreateOrderEntity,
        line_items: Vec<OrderAddonEntity>,
    ) -> Result<DateTime<Utc>, StoreError>;

    async fn get_all(&self) -> Result<Vec<OrderDetails>, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<OrderDetails, StoreError>;
}

type OrderRow = (OrderEntity, TheatreEntity, SlotEntity, Option<PaymentEntity>);

fn into_details(row: OrderRow, addons: Vec<OrderAddonDetails>) -> OrderDetails {
    let (order, theatre, slot, payment) = row;
    OrderDetails {
        id: order.id,
        customer_name: order.customer_name,
        customer_email: order.customer_email,
        phone_number: order.phone_number,
        no_of_persons: order.no_of_persons,
        total_price: order.total_price,
        order_date: order.order_date,
        ordered_at: order.ordered_at,
        theatre,
        slot,
        addons,
        payment_details: payment.as_ref().map(PaymentEntity::to_order_payment),
    }
}

async fn load_line_items(
    conn: &mut AsyncPgConnection,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OrderAddonDetails>>, StoreError> {
    let rows: Vec<(OrderAddonEntity, AddonEntity)> = order_addons::table
        .inner_join(addons::table)
        .filter(order_addons::order_id.eq_any(order_ids))
        .select((OrderAddonEntity::as_select(), AddonEntity::as_select()))
        .load(conn)
        .await?;

    let mut group: HashMap<Uuid, Vec<OrderAddonDetails>> = HashMap::new();
    for (item, addon) in rows {
        group.entry(item.order_id).or_default().push(OrderAddonDetails {
            addon,
            quantity: item.quantity,
        });
    }
    Ok(group)
}

#[async_trait]
impl OrdersRepository for PgStore {
    async fn find_by_theatre_slot_date(
        &self,
        theatre_id: Uuid,
        slot_id: Uuid,
        order_date: NaiveDate,
    ) -> Result<Option<OrderEntity>, StoreError> {
        let conn = &mut self.conn().await?;

        let order = orders::table
            .filter(orders::theatre_id.eq(theatre_id))
            .filter(orders::slot_id.eq(slot_id))
            .filter(orders::order_date.eq(order_date))
            .select(OrderEntity::as_select())
            .first(conn)
            .await
            .optional()?;

        Ok(order)
    }

    async fn create_order(
        &self,
        order: CreateOrderEntity,
        line_items: Vec<OrderAddonEntity>,
    ) -> Result<DateTime<Utc>, StoreError> {
        let conn = &mut self.conn().await?;

        conn.transaction(move |conn| {
            Box::pin(async move {
                let ordered_at: DateTime<Utc> = diesel::insert_into(orders::table)
                    .values(&order)
                    .returning(orders::ordered_at)
                    .get_result(conn)
                    .await?;

                if !line_items.is_empty() {
                    diesel::insert_into(order_addons::table)
                        .values(&line_items)
                        .execute(conn)
                        .await?;
                }

                Ok::<DateTime<Utc>, StoreError>(ordered_at)
            })
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<OrderDetails>, StoreError> {
        let conn = &mut self.conn().await?;

        let rows: Vec<OrderRow> = orders::table
            .inner_join(theatres::table)
            .inner_join(slots::table)
            .left_join(payments::table)
            .order_by(orders::ordered_at.desc())
            .select((
                OrderEntity::as_select(),
                TheatreEntity::as_select(),
                SlotEntity::as_select(),
                Option::<PaymentEntity>::as_select(),
            ))
            .load(conn)
            .await?;

        let order_ids: Vec<Uuid> = rows.iter().map(|(order, ..)| order.id).collect();
        let mut line_items = load_line_items(conn, &order_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let addons = line_items.remove(&row.0.id).unwrap_or_default();
                into_details(row, addons)
            })
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<OrderDetails, StoreError> {
        let conn = &mut self.conn().await?;

        let row: OrderRow = orders::table
            .inner_join(theatres::table)
            .inner_join(slots::table)
            .left_join(payments::table)
            .filter(orders::id.eq(id))
            .select((
                OrderEntity::as_select(),
                TheatreEntity::as_select(),
                SlotEntity::as_select(),
                Option::<PaymentEntity>::as_select(),
            ))
            .first(conn)
            .await?;

        let addons = load_line_items(conn, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        Ok(into_details(row, addons))
    }
}
