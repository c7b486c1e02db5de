//! In-process store used by tests and local runs without Postgres.
//!
//! Mirrors the database constraints the services rely on: one order per
//! (theatre, slot, date), unique user emails and referential integrity for
//! orders, theatre slots and line items.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AddonsRepository, ORDER_SLOT_UNIQUE, OrdersRepository, PaymentsRepository, SlotsRepository,
    StoreError, TheatresRepository, USER_EMAIL_UNIQUE, UsersRepository,
};
use crate::models::{
    AddonEntity, CreateOrderEntity, OrderAddonDetails, OrderAddonEntity, OrderDetails,
    OrderEntity, PaymentEntity, PaymentStatus, SlotEntity, TheatreEntity, TheatreWithSlots,
    UserEntity,
};

#[derive(Default)]
struct MemoryData {
    orders: Vec<OrderEntity>,
    order_addons: Vec<OrderAddonEntity>,
    payments: HashMap<String, PaymentEntity>,
    theatres: HashMap<Uuid, TheatreEntity>,
    theatre_slots: Vec<(Uuid, Uuid)>,
    slots: HashMap<Uuid, SlotEntity>,
    addons: HashMap<Uuid, AddonEntity>,
    users: HashMap<Uuid, UserEntity>,
}

impl MemoryData {
    fn details(&self, order: &OrderEntity) -> Result<OrderDetails, StoreError> {
        let theatre = self
            .theatres
            .get(&order.theatre_id)
            .cloned()
            .ok_or_else(|| StoreError::MissingReference("orders_theatre_id_fkey".into()))?;
        let slot = self
            .slots
            .get(&order.slot_id)
            .cloned()
            .ok_or_else(|| StoreError::MissingReference("orders_slot_id_fkey".into()))?;

        let addons = self
            .order_addons
            .iter()
            .filter(|item| item.order_id == order.id)
            .filter_map(|item| {
                self.addons.get(&item.addon_id).map(|addon| OrderAddonDetails {
                    addon: addon.clone(),
                    quantity: item.quantity,
                })
            })
            .collect();

        Ok(OrderDetails {
            id: order.id,
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            phone_number: order.phone_number.clone(),
            no_of_persons: order.no_of_persons,
            total_price: order.total_price,
            order_date: order.order_date,
            ordered_at: order.ordered_at,
            theatre,
            slot,
            addons,
            payment_details: self
                .payments
                .get(&order.razorpay_order_id)
                .map(PaymentEntity::to_order_payment),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) async fn payment_count(&self) -> usize {
        self.data.read().await.payments.len()
    }
}

#[async_trait]
impl OrdersRepository for MemoryStore {
    async fn find_by_theatre_slot_date(
        &self,
        theatre_id: Uuid,
        slot_id: Uuid,
        order_date: NaiveDate,
    ) -> Result<Option<OrderEntity>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .orders
            .iter()
            .find(|order| {
                order.theatre_id == theatre_id
                    && order.slot_id == slot_id
                    && order.order_date == order_date
            })
            .cloned())
    }

    async fn create_order(
        &self,
        order: CreateOrderEntity,
        line_items: Vec<OrderAddonEntity>,
    ) -> Result<DateTime<Utc>, StoreError> {
        let mut data = self.data.write().await;

        // All checks run before any write so a failure leaves nothing behind.
        if data.orders.iter().any(|existing| {
            existing.theatre_id == order.theatre_id
                && existing.slot_id == order.slot_id
                && existing.order_date == order.order_date
        }) {
            return Err(StoreError::UniqueViolation(ORDER_SLOT_UNIQUE.into()));
        }
        if data.orders.iter().any(|existing| existing.id == order.id) {
            return Err(StoreError::UniqueViolation("orders_pkey".into()));
        }
        if !data.theatres.contains_key(&order.theatre_id) {
            return Err(StoreError::MissingReference("orders_theatre_id_fkey".into()));
        }
        if !data.slots.contains_key(&order.slot_id) {
            return Err(StoreError::MissingReference("orders_slot_id_fkey".into()));
        }
        if !data.payments.contains_key(&order.razorpay_order_id) {
            return Err(StoreError::MissingReference(
                "orders_razorpay_order_id_fkey".into(),
            ));
        }
        for item in &line_items {
            if !data.addons.contains_key(&item.addon_id) {
                return Err(StoreError::MissingReference(
                    "order_addons_addon_id_fkey".into(),
                ));
            }
        }

        let ordered_at = Utc::now();
        data.orders.push(OrderEntity {
            id: order.id,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            phone_number: order.phone_number,
            theatre_id: order.theatre_id,
            slot_id: order.slot_id,
            no_of_persons: order.no_of_persons,
            total_price: order.total_price,
            order_date: order.order_date,
            ordered_at,
            razorpay_order_id: order.razorpay_order_id,
        });
        data.order_addons.extend(line_items);

        Ok(ordered_at)
    }

    async fn get_all(&self) -> Result<Vec<OrderDetails>, StoreError> {
        let data = self.data.read().await;
        let mut orders: Vec<&OrderEntity> = data.orders.iter().collect();
        orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
        orders.into_iter().map(|order| data.details(order)).collect()
    }

    async fn get_by_id(&self, id: Uuid) -> Result<OrderDetails, StoreError> {
        let data = self.data.read().await;
        let order = data
            .orders
            .iter()
            .find(|order| order.id == id)
            .ok_or(StoreError::NotFound)?;
        data.details(order)
    }
}

#[async_trait]
impl PaymentsRepository for MemoryStore {
    async fn create_pending(&self, razorpay_order_id: &str) -> Result<PaymentEntity, StoreError> {
        let mut data = self.data.write().await;
        if data.payments.contains_key(razorpay_order_id) {
            return Err(StoreError::UniqueViolation("payments_pkey".into()));
        }

        let now = Utc::now();
        let payment = PaymentEntity {
            razorpay_order_id: razorpay_order_id.to_string(),
            status: PaymentStatus::Pending.to_string(),
            razorpay_payment_id: None,
            razorpay_signature: None,
            created_at: now,
            updated_at: now,
        };
        data.payments
            .insert(razorpay_order_id.to_string(), payment.clone());
        Ok(payment)
    }

    async fn mark_success(
        &self,
        razorpay_order_id: &str,
        razorpay_payment_id: &str,
        razorpay_signature: &str,
    ) -> Result<Option<PaymentEntity>, StoreError> {
        let mut data = self.data.write().await;
        Ok(data.payments.get_mut(razorpay_order_id).map(|payment| {
            payment.status = PaymentStatus::Success.to_string();
            payment.razorpay_payment_id = Some(razorpay_payment_id.to_string());
            payment.razorpay_signature = Some(razorpay_signature.to_string());
            payment.updated_at = Utc::now();
            payment.clone()
        }))
    }

    async fn find(&self, razorpay_order_id: &str) -> Result<Option<PaymentEntity>, StoreError> {
        Ok(self.data.read().await.payments.get(razorpay_order_id).cloned())
    }
}

#[async_trait]
impl TheatresRepository for MemoryStore {
    async fn create(&self, theatre: TheatreEntity, slot_ids: Vec<Uuid>) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data.theatres.contains_key(&theatre.id) {
            return Err(StoreError::UniqueViolation("theatres_pkey".into()));
        }
        if slot_ids.iter().any(|id| !data.slots.contains_key(id)) {
            return Err(StoreError::MissingReference(
                "theatre_slots_slot_id_fkey".into(),
            ));
        }

        data.theatre_slots
            .extend(slot_ids.into_iter().map(|slot_id| (theatre.id, slot_id)));
        data.theatres.insert(theatre.id, theatre);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<TheatreEntity>, StoreError> {
        let data = self.data.read().await;
        let mut theatres: Vec<TheatreEntity> = data.theatres.values().cloned().collect();
        theatres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(theatres)
    }

    async fn get_with_slots(&self, id: Uuid) -> Result<TheatreWithSlots, StoreError> {
        let data = self.data.read().await;
        let theatre = data.theatres.get(&id).cloned().ok_or(StoreError::NotFound)?;

        let mut slots: Vec<SlotEntity> = data
            .theatre_slots
            .iter()
            .filter(|(theatre_id, _)| *theatre_id == id)
            .filter_map(|(_, slot_id)| data.slots.get(slot_id).cloned())
            .collect();
        slots.sort_by_key(|slot| slot.start_time);

        Ok(TheatreWithSlots { theatre, slots })
    }
}

#[async_trait]
impl SlotsRepository for MemoryStore {
    async fn create(&self, slot: SlotEntity) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data.slots.contains_key(&slot.id) {
            return Err(StoreError::UniqueViolation("slots_pkey".into()));
        }
        data.slots.insert(slot.id, slot);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SlotEntity>, StoreError> {
        let data = self.data.read().await;
        let mut slots: Vec<SlotEntity> = data.slots.values().cloned().collect();
        slots.sort_by_key(|slot| slot.start_time);
        Ok(slots)
    }
}

#[async_trait]
impl AddonsRepository for MemoryStore {
    async fn create(&self, addon: AddonEntity) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data.addons.contains_key(&addon.id) {
            return Err(StoreError::UniqueViolation("addons_pkey".into()));
        }
        data.addons.insert(addon.id, addon);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AddonEntity>, StoreError> {
        let data = self.data.read().await;
        let mut addons: Vec<AddonEntity> = data.addons.values().cloned().collect();
        addons.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(addons)
    }
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn create(&self, user: UserEntity) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data.users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::UniqueViolation(USER_EMAIL_UNIQUE.into()));
        }
        data.users.insert(user.id, user);
        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        let data = self.data.read().await;
        Ok(data.users.values().find(|user| user.email == email).cloned())
    }
}
