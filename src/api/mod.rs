pub mod razorpay;

use async_trait::async_trait;

pub use razorpay::RazorpayClient;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0} is unreachable")]
    Unreachable(String),

    #[error("payment provider rejected the request with status {status}")]
    Rejected { status: u16, body: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Remote payment provider able to mint payment intents.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a provider order for `amount` minor currency units and returns
    /// the provider's order id.
    async fn create_order(&self, amount: i64) -> Result<String, GatewayError>;
}
