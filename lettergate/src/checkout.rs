//! Hosted-checkout (instant confirmation) adapter.
//!
//! The instant provider is an externally hosted checkout widget: the app
//! hands it an order and the widget's approve/error callbacks are the only
//! inputs back. [`HostedCheckout`] isolates that callback protocol behind
//! the uniform [`ProviderAdapter`] interface: [`ProviderAdapter::initiate`]
//! parks on a oneshot channel that [`HostedCheckout::approved`] or
//! [`HostedCheckout::errored`] resolves. Fund capture happens on the
//! provider's side; approval alone is success, with no local validation.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::PaymentError;
use crate::provider::{ChargeRequest, Confirmation, ProviderAdapter};
use crate::session::PaymentMethod;

/// Item category reported to the checkout widget.
pub const DIGITAL_GOODS: &str = "DIGITAL_GOODS";

/// Single line item inside a checkout order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Item name shown in the checkout.
    pub name: String,
    /// Item description shown in the checkout.
    pub description: String,
    /// Always 1 for the unlock purchase.
    pub quantity: u32,
    /// Unit price in the order currency.
    pub unit_amount: f64,
    /// Item category (always [`DIGITAL_GOODS`]).
    pub category: &'static str,
}

/// Order handed to the hosted checkout widget.
///
/// Fixed USD amount with a single line item.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOrder {
    /// Total order amount.
    pub amount: f64,
    /// Always `"USD"` for the hosted checkout.
    pub currency: &'static str,
    /// The single unlock line item.
    pub item: LineItem,
}

impl CheckoutOrder {
    /// Builds the unlock order for the given amount.
    #[must_use]
    pub fn unlock(amount: f64) -> Self {
        Self {
            amount,
            currency: "USD",
            item: LineItem {
                name: "Cover Letter Unlock".to_owned(),
                description: "One-time payment to unlock full cover letter".to_owned(),
                quantity: 1,
                unit_amount: amount,
                category: DIGITAL_GOODS,
            },
        }
    }
}

type CheckoutResult = Result<Confirmation, PaymentError>;

/// Adapter for the externally hosted checkout widget.
///
/// One attempt at a time: each [`ProviderAdapter::initiate`] call opens a
/// fresh channel, replacing (and thereby aborting) any earlier unresolved
/// attempt. The widget host calls [`Self::approved`] or [`Self::errored`]
/// from its callbacks.
#[derive(Debug, Default)]
pub struct HostedCheckout {
    pending: Mutex<Option<oneshot::Sender<CheckoutResult>>>,
}

impl HostedCheckout {
    /// Creates an idle adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Widget approval callback: the provider captured funds for `order_id`.
    ///
    /// A no-op when no attempt is awaiting confirmation.
    pub fn approved(&self, order_id: impl Into<String>) {
        if let Some(tx) = self.take_pending() {
            let confirmation =
                Confirmation::new(PaymentMethod::Paypal, Some(order_id.into()));
            let _ = tx.send(Ok(confirmation));
        }
    }

    /// Widget error callback.
    ///
    /// Wraps whatever message the provider supplied, falling back to a
    /// generic unknown-error string. A no-op when no attempt is awaiting
    /// confirmation.
    pub fn errored(&self, message: Option<String>) {
        if let Some(tx) = self.take_pending() {
            let _ = tx.send(Err(PaymentError::provider(message)));
        }
    }

    fn take_pending(&self) -> Option<oneshot::Sender<CheckoutResult>> {
        self.pending.lock().expect("checkout lock poisoned").take()
    }
}

#[async_trait]
impl ProviderAdapter for HostedCheckout {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Paypal
    }

    async fn initiate(
        &self,
        charge: &ChargeRequest,
        cancel: &CancellationToken,
    ) -> Result<Confirmation, PaymentError> {
        let order = CheckoutOrder::unlock(charge.amount);
        tracing::debug!(amount = order.amount, "opening hosted checkout");

        let (tx, rx) = oneshot::channel();
        *self.pending.lock().expect("checkout lock poisoned") = Some(tx);

        tokio::select! {
            _ = cancel.cancelled() => {
                self.take_pending();
                Err(PaymentError::Cancelled)
            }
            result = rx => match result {
                Ok(outcome) => outcome,
                // Sender replaced by a newer attempt.
                Err(_) => Err(PaymentError::provider(None)),
            }
        }
    }
}
