use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    api::{GatewayError, PaymentGateway},
    models::PaymentEntity,
    params::{FieldErrors, PaymentVerificationBody, ValidateParams},
    repositories::{PaymentsRepository, StoreError},
};

type HmacSha256 = Hmac<Sha256>;

/// Hex length of an HMAC-SHA256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("invalid payment verification request")]
    Validation(FieldErrors),

    #[error("payment info is invalid")]
    InvalidSignature,

    #[error("no payment found for order {0}")]
    NotFound(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Checks `signature` against HMAC-SHA256(`order_id|payment_id`) keyed with
/// `secret`. Only the canonical lowercase hex encoding is accepted and the
/// digest comparison runs in constant time.
pub fn verify_signature(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    if signature.len() != SIGNATURE_HEX_LEN
        || !signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }
    let Ok(claimed) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&claimed).is_ok()
}

pub struct PaymentsService {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentsRepository>,
    secret: String,
}

impl PaymentsService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentsRepository>,
        secret: String,
    ) -> Self {
        Self {
            gateway,
            payments,
            secret,
        }
    }

    /// Creates a provider order for `amount` minor units and records it as a
    /// pending payment. Fails as a whole if either step fails.
    pub async fn create_payment_intent(&self, amount: i64) -> Result<String, PaymentError> {
        let razorpay_order_id = self.gateway.create_order(amount).await?;
        tracing::info!(%razorpay_order_id, amount, "Created payment intent");

        self.payments.create_pending(&razorpay_order_id).await?;
        Ok(razorpay_order_id)
    }

    /// Reconciles a provider callback. Repeated valid calls rewrite the same
    /// success state.
    pub async fn verify_payment(
        &self,
        body: &PaymentVerificationBody,
    ) -> Result<PaymentEntity, PaymentError> {
        let errors = body.validate_params();
        if !errors.is_empty() {
            return Err(PaymentError::Validation(errors));
        }

        if !verify_signature(
            &body.razorpay_order_id,
            &body.razorpay_payment_id,
            &body.razorpay_signature,
            &self.secret,
        ) {
            tracing::warn!(
                razorpay_order_id = %body.razorpay_order_id,
                razorpay_payment_id = %body.razorpay_payment_id,
                "Payment signature mismatch"
            );
            return Err(PaymentError::InvalidSignature);
        }

        let payment = self
            .payments
            .mark_success(
                &body.razorpay_order_id,
                &body.razorpay_payment_id,
                &body.razorpay_signature,
            )
            .await?
            .ok_or_else(|| PaymentError::NotFound(body.razorpay_order_id.clone()))?;

        tracing::info!(
            razorpay_order_id = %payment.razorpay_order_id,
            "Payment verified"
        );
        Ok(payment)
    }
}
