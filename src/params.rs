//! Request bodies accepted by the API and their field-local validation.
//!
//! Every params type derives [`validator::Validate`] for the per-field rules and
//! exposes [`ValidateParams::validate_params`], which flattens the result into a
//! [`FieldErrors`] map (field name to message). An empty map means valid.

use std::{borrow::Cow, collections::BTreeMap, collections::HashSet, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{AddonCategory, Role};

pub type FieldErrors = BTreeMap<String, String>;

pub const MIN_SLOT_MINUTE: i32 = 0;
pub const MAX_SLOT_MINUTE: i32 = 1440;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("email pattern compiles")
});

pub trait ValidateParams: Validate {
    fn validate_params(&self) -> FieldErrors {
        match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => flatten(&errors),
        }
    }
}

/// Keeps the first message reported for every field.
fn flatten(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn is_email_valid(email: &str) -> bool {
    EMAIL_REGEX.is_match(&email.to_lowercase())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_email_valid(email) {
        Ok(())
    } else {
        Err(error("email", "invalid email address"))
    }
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| error("uuid", "must be a valid uuid"))
}

// Orders

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderAddonParams {
    pub id: String,
    pub quantity: i32,
}

fn validate_order_addons(addons: &[OrderAddonParams]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for addon in addons {
        let Ok(id) = Uuid::parse_str(&addon.id) else {
            return Err(error("uuid", "addon id must be a valid uuid"));
        };
        if addon.quantity <= 0 {
            return Err(error("quantity", "addon quantity should not be less than 1"));
        }
        if !seen.insert(id) {
            return Err(error("duplicate", "addon ids must be unique"));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderParams {
    #[validate(length(min = 1, message = "customer name can not be empty"))]
    pub customer_name: String,
    #[validate(custom(function = "validate_email", message = "invalid email address"))]
    pub customer_email: String,
    #[validate(length(min = 1, message = "phone number can not be empty"))]
    pub phone_number: String,
    #[validate(custom(function = "validate_uuid", message = "theatre id must be a valid uuid"))]
    pub theatre_id: String,
    #[validate(custom(function = "validate_uuid", message = "slot id must be a valid uuid"))]
    pub slot_id: String,
    #[validate(range(min = 1, message = "number of persons should be at least 1"))]
    pub no_of_persons: i32,
    #[validate(range(min = 1, message = "order value must be greater than zero"))]
    pub total_price: i32,
    pub order_date: NaiveDate,
    #[serde(default)]
    #[validate(custom(function = "validate_order_addons"))]
    pub addons: Vec<OrderAddonParams>,
}

impl ValidateParams for OrderParams {}

// Theatres

fn validate_slot_ids(slots: &[String]) -> Result<(), ValidationError> {
    if slots.is_empty() {
        return Err(error(
            "length",
            "theatre should have at least one slot allocated",
        ));
    }
    if slots.iter().any(|slot| Uuid::parse_str(slot).is_err()) {
        return Err(error("uuid", "invalid slot_id, it should be a valid uuid"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTheatreParams {
    #[validate(length(min = 1, message = "name of the theatre can not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "description of the theatre can not be empty"))]
    pub description: String,
    #[validate(range(
        exclusive_min = 0.0,
        message = "price of the theatre can not be zero or negative"
    ))]
    pub price: f64,
    #[validate(range(
        exclusive_min = 0.0,
        message = "additional price per head should be a positive number"
    ))]
    pub additional_price_per_head: f64,
    #[validate(range(min = 1, message = "minimum capacity should be at least 1"))]
    pub min_capacity: i32,
    pub max_capacity: i32,
    pub default_capacity: i32,
    #[validate(custom(function = "validate_slot_ids"))]
    pub slots: Vec<String>,
}

impl ValidateParams for CreateTheatreParams {
    fn validate_params(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => flatten(&errors),
        };
        if self.max_capacity < self.min_capacity {
            errors.insert(
                "max_capacity".into(),
                "maximum capacity can not be less than minimum capacity".into(),
            );
        }
        if self.default_capacity < self.min_capacity || self.default_capacity > self.max_capacity {
            errors.insert(
                "default_capacity".into(),
                "default capacity should be between minimum and maximum capacity".into(),
            );
        }
        errors
    }
}

// Slots

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSlotParams {
    /// Minutes from midnight.
    #[validate(range(
        min = 0,
        max = 1440,
        message = "start time should be between 0 and 1440 minutes"
    ))]
    pub start_time: i32,
    /// Minutes from midnight.
    #[validate(range(
        min = 0,
        max = 1440,
        message = "end time should be between 0 and 1440 minutes"
    ))]
    pub end_time: i32,
}

impl ValidateParams for CreateSlotParams {
    fn validate_params(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => flatten(&errors),
        };
        if self.start_time >= self.end_time && !errors.contains_key("start_time") {
            errors.insert(
                "start_time".into(),
                format!(
                    "start time: {}, should be less than end time: {}",
                    self.start_time, self.end_time
                ),
            );
        }
        errors
    }
}

// Addons

fn validate_addon_category(category: &str) -> Result<(), ValidationError> {
    category
        .parse::<AddonCategory>()
        .map(|_| ())
        .map_err(|_| error("category", "addon category is not valid"))
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddonParams {
    #[validate(length(min = 1, message = "addon name can not be empty"))]
    pub name: String,
    #[validate(custom(function = "validate_addon_category"))]
    pub category: String,
    #[validate(range(exclusive_min = 0.0, message = "addon price should be greater than zero"))]
    pub price: f64,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub meta_data: Map<String, Value>,
}

impl ValidateParams for AddonParams {}

// Users & auth

fn validate_roles(roles: &[String]) -> Result<(), ValidationError> {
    match roles.iter().find(|role| role.parse::<Role>().is_err()) {
        Some(_) => Err(error("role", "roles should be one of admin, customer")),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserParams {
    #[validate(length(min = 1, message = "user name can not be empty"))]
    pub name: String,
    #[validate(custom(
        function = "validate_email",
        message = "user email should be a valid email address"
    ))]
    pub email: String,
    #[validate(length(min = 8, message = "user password should be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(custom(function = "validate_roles"))]
    pub roles: Vec<String>,
}

impl ValidateParams for UserParams {}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginParams {
    #[validate(custom(function = "validate_email", message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "password can not be empty"))]
    pub password: String,
}

impl ValidateParams for LoginParams {}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenParams {
    #[validate(length(min = 1, message = "refresh_token can not be empty"))]
    pub refresh_token: String,
}

impl ValidateParams for RefreshTokenParams {}

// Payments

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PaymentVerificationBody {
    #[validate(length(min = 1, message = "razorpay_order_id can not be empty"))]
    pub razorpay_order_id: String,
    #[validate(length(min = 1, message = "razorpay_payment_id can not be empty"))]
    pub razorpay_payment_id: String,
    #[validate(length(min = 1, message = "razorpay_signature can not be empty"))]
    pub razorpay_signature: String,
}

impl ValidateParams for PaymentVerificationBody {}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_params() -> OrderParams {
        OrderParams {
            customer_name: "Meera".into(),
            customer_email: "meera@example.com".into(),
            phone_number: "9876543210".into(),
            theatre_id: Uuid::new_v4().to_string(),
            slot_id: Uuid::new_v4().to_string(),
            no_of_persons: 4,
            total_price: 500,
            order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            addons: vec![OrderAddonParams {
                id: Uuid::new_v4().to_string(),
                quantity: 2,
            }],
        }
    }

    #[test]
    fn slot_accepts_full_day_window() {
        let params = CreateSlotParams {
            start_time: 0,
            end_time: 1440,
        };
        assert!(params.validate_params().is_empty());
    }

    #[test]
    fn slot_rejects_bounds_and_ordering() {
        let cases = [(-1, 60), (0, 1441), (1441, 1500), (600, 600), (700, 600)];
        for (start_time, end_time) in cases {
            let errors = CreateSlotParams {
                start_time,
                end_time,
            }
            .validate_params();
            assert!(
                !errors.is_empty(),
                "expected {start_time}..{end_time} to be rejected"
            );
        }
    }

    #[test]
    fn slot_ordering_error_is_reported_on_start_time() {
        let errors = CreateSlotParams {
            start_time: 720,
            end_time: 600,
        }
        .validate_params();
        assert_eq!(
            errors.get("start_time").map(String::as_str),
            Some("start time: 720, should be less than end time: 600")
        );
    }

    #[test]
    fn valid_order_has_no_errors() {
        assert!(order_params().validate_params().is_empty());
    }

    #[test]
    fn order_reports_every_bad_field() {
        let params = OrderParams {
            customer_name: String::new(),
            customer_email: "not-an-email".into(),
            phone_number: String::new(),
            theatre_id: "t1".into(),
            slot_id: "s1".into(),
            no_of_persons: 0,
            total_price: 0,
            ..order_params()
        };
        let errors = params.validate_params();
        for field in [
            "customer_name",
            "customer_email",
            "phone_number",
            "theatre_id",
            "slot_id",
            "no_of_persons",
            "total_price",
        ] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
        assert_eq!(errors["slot_id"], "slot id must be a valid uuid");
    }

    #[test]
    fn order_addons_must_be_positive_and_distinct() {
        let id = Uuid::new_v4().to_string();
        let mut params = order_params();
        params.addons = vec![OrderAddonParams {
            id: id.clone(),
            quantity: 0,
        }];
        assert_eq!(
            params.validate_params()["addons"],
            "addon quantity should not be less than 1"
        );

        params.addons = vec![
            OrderAddonParams {
                id: id.clone(),
                quantity: 1,
            },
            OrderAddonParams { id, quantity: 3 },
        ];
        assert_eq!(params.validate_params()["addons"], "addon ids must be unique");
    }

    #[test]
    fn theatre_capacities_must_be_ordered() {
        let params = CreateTheatreParams {
            name: "Aurora".into(),
            description: "Rooftop screen".into(),
            price: 1500.0,
            additional_price_per_head: 200.0,
            min_capacity: 4,
            max_capacity: 2,
            default_capacity: 3,
            slots: vec![Uuid::new_v4().to_string()],
        };
        let errors = params.validate_params();
        assert!(errors.contains_key("max_capacity"));
        assert!(errors.contains_key("default_capacity"));
    }

    #[test]
    fn theatre_requires_slots() {
        let params = CreateTheatreParams {
            name: "Aurora".into(),
            description: "Rooftop screen".into(),
            price: 1500.0,
            additional_price_per_head: 0.0,
            min_capacity: 2,
            max_capacity: 10,
            default_capacity: 4,
            slots: vec![],
        };
        let errors = params.validate_params();
        assert!(errors.contains_key("slots"));
        assert!(errors.contains_key("additional_price_per_head"));
        assert!(!errors.contains_key("price"));
    }

    #[test]
    fn addon_category_must_be_known() {
        let params = AddonParams {
            name: "Balloons".into(),
            category: "Balloons".into(),
            price: 100.0,
            meta_data: Map::new(),
        };
        assert_eq!(
            params.validate_params()["category"],
            "addon category is not valid"
        );
    }

    #[test]
    fn user_roles_are_closed_set() {
        let params = UserParams {
            name: "Kiran".into(),
            email: "Kiran@Example.com".into(),
            password: "long-enough".into(),
            roles: vec!["admin".into(), "owner".into()],
        };
        let errors = params.validate_params();
        assert!(errors.contains_key("roles"));
        assert!(!errors.contains_key("email"));
    }

    #[test]
    fn verification_body_requires_all_fields() {
        let body = PaymentVerificationBody {
            razorpay_order_id: String::new(),
            razorpay_payment_id: "pay_1".into(),
            razorpay_signature: String::new(),
        };
        let errors = body.validate_params();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("razorpay_order_id"));
        assert!(errors.contains_key("razorpay_signature"));
    }
}
