//! Uniform payment adapter trait and charge types.
//!
//! Three heterogeneous provider protocols (hosted checkout, synchronous
//! card capture, asynchronous mobile money) are wrapped behind one
//! interface: [`ProviderAdapter::initiate`] runs a single attempt to a
//! terminal result, racing the session's cancellation token. The token is
//! the liveness flag for the whole session: adapters must stop issuing
//! requests once it is cancelled, and the selector drops any result that
//! arrives afterwards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::PaymentError;
use crate::session::PaymentMethod;

/// Billing fields collected from the payer.
///
/// `phone_number` is only collected by the mobile-money flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    /// Payer first name, required non-empty.
    pub first_name: String,
    /// Payer last name, required non-empty.
    pub last_name: String,
    /// Payer email, required `local@domain.tld`.
    pub email: String,
    /// Mobile number in local or international form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// One charge attempt handed to an adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    /// Amount to charge.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Billing details; `None` for flows that collect nothing locally.
    pub billing: Option<BillingDetails>,
}

impl ChargeRequest {
    /// Creates a charge with no billing details attached.
    #[must_use]
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            billing: None,
        }
    }

    /// Attaches billing details to the charge.
    #[must_use]
    pub fn with_billing(mut self, billing: BillingDetails) -> Self {
        self.billing = Some(billing);
        self
    }
}

/// Successful terminal result of a provider flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// The method that produced this confirmation.
    pub method: PaymentMethod,
    /// Provider transaction reference, when one was supplied.
    ///
    /// The card endpoint acknowledges with a bare 200 and no reference;
    /// mobile money supplies an M-PESA reference; hosted checkout supplies
    /// its order id.
    pub reference: Option<String>,
}

impl Confirmation {
    /// Creates a confirmation for `method` with an optional reference.
    #[must_use]
    pub fn new(method: PaymentMethod, reference: Option<String>) -> Self {
        Self { method, reference }
    }

    /// Returns the transaction id to record in the receipt, falling back to
    /// the method tag when the provider returned no reference.
    #[must_use]
    pub fn transaction_id(&self) -> String {
        self.reference
            .clone()
            .unwrap_or_else(|| self.method.tag().to_owned())
    }
}

/// A payment provider wrapped behind the uniform capability set.
///
/// Implementations run one attempt to a terminal result. Errors carry the
/// message to display; [`PaymentError::Cancelled`] marks an attempt that
/// ended because the session token fired and must not mutate state.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The method this adapter implements.
    fn method(&self) -> PaymentMethod;

    /// Runs one payment attempt to a terminal result.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] on validation failure, transport or provider
    /// failure, a terminal backend failure, or cancellation.
    async fn initiate(
        &self,
        charge: &ChargeRequest,
        cancel: &CancellationToken,
    ) -> Result<Confirmation, PaymentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_prefers_the_provider_reference() {
        let confirmation = Confirmation::new(PaymentMethod::Mpesa, Some("MPESA123".to_owned()));
        assert_eq!(confirmation.transaction_id(), "MPESA123");
    }

    #[test]
    fn transaction_id_falls_back_to_the_method_tag() {
        let confirmation = Confirmation::new(PaymentMethod::Card, None);
        assert_eq!(confirmation.transaction_id(), "CARD-PAYMENT");
    }

    #[test]
    fn billing_serializes_without_absent_phone() {
        let billing = BillingDetails {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            email: "jane@doe.com".to_owned(),
            phone_number: None,
        };
        let json = serde_json::to_value(&billing).unwrap();
        assert!(json.get("phone_number").is_none());
    }
}
