//! Payment gateway seam.
//!
//! The gateway signs redirect URLs and verifies callback signatures.
//! Everything order-related stays on this side of the trait, so a
//! provider integration only deals with parameters and signatures.

use std::collections::HashMap;

use mockall::automock;
use thiserror::Error;

use crate::domain::orders::records::OrderUuid;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("missing callback field {0}")]
    MissingField(&'static str),

    #[error("malformed callback value {0:?}")]
    Malformed(String),
}

/// What the service hands the gateway to build a redirect URL.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub order_uuid: OrderUuid,
    pub amount_minor: u64,
    pub client_ip: String,
}

/// The gateway's reading of a provider callback.
///
/// `valid` reflects the signature check. The other fields are only
/// meaningful when the signature held.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackVerification {
    pub valid: bool,
    pub order_uuid: Option<OrderUuid>,
    pub succeeded: bool,
    pub transaction_ref: Option<String>,
}

#[automock]
pub trait PaymentGateway: Send + Sync {
    /// Builds the signed URL the buyer is redirected to.
    fn build_payment_url(&self, request: &PaymentRequest) -> Result<String, GatewayError>;

    /// Checks the callback signature and extracts the outcome.
    fn verify_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<CallbackVerification, GatewayError>;
}
