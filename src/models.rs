use chrono::{DateTime, NaiveDate, Utc};
use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;
use uuid::Uuid;

// Enumerations

/// Fixed set of add-on categories offered alongside a booking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
    AsRefStr, ToSchema,
)]
pub enum AddonCategory {
    Decorations,
    Cakes,
    Flowers,
    Photographs,
}

impl AddonCategory {
    pub fn all() -> Vec<AddonCategory> {
        AddonCategory::iter().collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
    AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failure,
}

// Theatres & slots

#[derive(
    Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize, Debug, Clone, ToSchema,
)]
#[diesel(table_name = crate::schema::theatres)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TheatreEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub additional_price_per_head: f64,
    pub min_capacity: i32,
    pub max_capacity: i32,
    pub default_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

/// Daily time window; start and end are minutes from midnight.
#[derive(
    Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize, Debug, Clone, ToSchema,
)]
#[diesel(table_name = crate::schema::slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SlotEntity {
    pub id: Uuid,
    pub start_time: i32,
    pub end_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::theatre_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TheatreSlotEntity {
    pub theatre_id: Uuid,
    pub slot_id: Uuid,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct TheatreWithSlots {
    #[serde(flatten)]
    pub theatre: TheatreEntity,
    pub slots: Vec<SlotEntity>,
}

// Addons

#[derive(
    Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize, Debug, Clone, ToSchema,
)]
#[diesel(table_name = crate::schema::addons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AddonEntity {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[schema(value_type = Object)]
    pub meta_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub phone_number: String,
    pub theatre_id: Uuid,
    pub slot_id: Uuid,
    pub no_of_persons: i32,
    pub total_price: i32,
    pub order_date: NaiveDate,
    pub ordered_at: DateTime<Utc>,
    pub razorpay_order_id: String,
}

/// Order row as written; `ordered_at` is assigned by the database.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub phone_number: String,
    pub theatre_id: Uuid,
    pub slot_id: Uuid,
    pub no_of_persons: i32,
    pub total_price: i32,
    pub order_date: NaiveDate,
    pub razorpay_order_id: String,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::order_addons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderAddonEntity {
    pub order_id: Uuid,
    pub addon_id: Uuid,
    pub quantity: i32,
}

/// One line item of an order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct OrderAddon {
    pub id: Uuid,
    pub quantity: i32,
}

/// Order as returned from the creation flow.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub phone_number: String,
    pub theatre_id: Uuid,
    pub slot_id: Uuid,
    pub addons: Vec<OrderAddon>,
    pub no_of_persons: i32,
    pub total_price: i32,
    pub order_date: NaiveDate,
    pub ordered_at: DateTime<Utc>,
    pub razorpay_order_id: String,
}

impl Order {
    pub fn line_items(&self) -> Vec<OrderAddonEntity> {
        self.addons
            .iter()
            .map(|addon| OrderAddonEntity {
                order_id: self.id,
                addon_id: addon.id,
                quantity: addon.quantity,
            })
            .collect()
    }

    pub fn to_entity(&self) -> CreateOrderEntity {
        CreateOrderEntity {
            id: self.id,
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            phone_number: self.phone_number.clone(),
            theatre_id: self.theatre_id,
            slot_id: self.slot_id,
            no_of_persons: self.no_of_persons,
            total_price: self.total_price,
            order_date: self.order_date,
            razorpay_order_id: self.razorpay_order_id.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct OrderAddonDetails {
    #[serde(flatten)]
    pub addon: AddonEntity,
    pub quantity: i32,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct OrderPayment {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub status: PaymentStatus,
}

/// Denormalized read model of an order with theatre, slot, payment and add-ons.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct OrderDetails {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub phone_number: String,
    pub no_of_persons: i32,
    pub total_price: i32,
    pub order_date: NaiveDate,
    pub ordered_at: DateTime<Utc>,
    pub theatre: TheatreEntity,
    pub slot: SlotEntity,
    pub addons: Vec<OrderAddonDetails>,
    pub payment_details: Option<OrderPayment>,
}

// Payments

#[derive(Queryable, Serialize, Selectable, Identifiable, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(primary_key(razorpay_order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentEntity {
    pub razorpay_order_id: String,
    pub status: String,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatePaymentEntity {
    pub razorpay_order_id: String,
    pub status: String,
}

impl PaymentEntity {
    /// Unknown status strings read as pending; they never count as paid.
    pub fn payment_status(&self) -> PaymentStatus {
        self.status.parse().unwrap_or(PaymentStatus::Pending)
    }

    pub fn to_order_payment(&self) -> OrderPayment {
        OrderPayment {
            razorpay_order_id: self.razorpay_order_id.clone(),
            razorpay_payment_id: self.razorpay_payment_id.clone(),
            razorpay_signature: self.razorpay_signature.clone(),
            status: self.payment_status(),
        }
    }
}

// Users

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserEntity {
    pub fn role_set(&self) -> Vec<Role> {
        self.roles
            .iter()
            .filter_map(|role| match role.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    tracing::warn!(user_id = %self.id, role = %role, "Ignoring unknown role");
                    None
                }
            })
            .collect()
    }
}

/// Public view of a user account.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        let roles = entity.role_set();
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            roles,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addon_categories_round_trip_through_strings() {
        let names: Vec<String> = AddonCategory::all().iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["Decorations", "Cakes", "Flowers", "Photographs"]);
        assert_eq!("Cakes".parse::<AddonCategory>().ok(), Some(AddonCategory::Cakes));
        assert!("Balloons".parse::<AddonCategory>().is_err());
    }

    #[test]
    fn roles_use_lowercase_names() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!("customer".parse::<Role>().ok(), Some(Role::Customer));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn unknown_roles_are_dropped_from_role_set() {
        let user = UserEntity {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: "x".into(),
            roles: vec!["admin".into(), "root".into()],
            created_at: Utc::now(),
        };
        assert_eq!(user.role_set(), vec![Role::Admin]);
    }

    #[test]
    fn line_items_carry_order_id() {
        let order = Order {
            id: Uuid::new_v4(),
            customer_name: "Ravi".into(),
            customer_email: "ravi@example.com".into(),
            phone_number: "9999999999".into(),
            theatre_id: Uuid::new_v4(),
            slot_id: Uuid::new_v4(),
            addons: vec![OrderAddon {
                id: Uuid::new_v4(),
                quantity: 2,
            }],
            no_of_persons: 4,
            total_price: 500,
            order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ordered_at: Utc::now(),
            razorpay_order_id: "order_1".into(),
        };
        let items = order.line_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_id, order.id);
        assert_eq!(items[0].quantity, 2);
    }
}
