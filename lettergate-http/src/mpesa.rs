//! Asynchronous mobile-money client with status polling.
//!
//! The flow has two legs. Initiation submits the billing fields plus the
//! normalized phone number; the backend answers `complete` (funds already
//! captured) or `pending` with an invoice id. A pending session then polls
//! the status endpoint: one check immediately, then one per poll interval,
//! strictly serial — check *n+1* is only issued after *n*'s handler has
//! finished. `complete` and `failed` are the only terminal statuses;
//! anything else, including transport errors during a check, is transient
//! and polling continues unchanged.
//!
//! The session's [`CancellationToken`] is checked before every request and
//! raced against the inter-check sleep, so backing out or tearing down the
//! hosting view releases the timer on every exit path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use url::Url;

use lettergate::error::PaymentError;
use lettergate::provider::{BillingDetails, ChargeRequest, Confirmation, ProviderAdapter};
use lettergate::session::PaymentMethod;
use lettergate::validate::{PhoneRequirement, normalize_phone, validate_billing};

use crate::error::ClientError;
use crate::types::{MpesaPaymentRequest, MpesaResponse, MpesaStatus};

/// Fixed cadence between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Message for responses the protocol does not account for.
const UNEXPECTED_RESPONSE: &str = "Unexpected response";

/// Observer hooks around the polling lifecycle.
///
/// All methods have default no-op implementations; implement only what you
/// need. `on_pending` is where the owner stamps the session's correlation
/// id.
pub trait PollHooks: Send + Sync {
    /// Called once when initiation enters the pending state.
    fn on_pending(&self, _invoice_id: &str) {}

    /// Called after each status check with the observed status.
    fn on_check(&self, _status: MpesaStatus) {}
}

/// No-op hook set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl PollHooks for NoHooks {}

/// Client for the mobile-money initiate and status endpoints.
#[derive(Clone)]
pub struct MpesaClient {
    initiate_url: Url,
    status_base_url: Url,
    client: Client,
    poll_interval: Duration,
    timeout: Option<Duration>,
    hooks: Arc<dyn PollHooks>,
}

impl std::fmt::Debug for MpesaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpesaClient")
            .field("initiate_url", &self.initiate_url)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl MpesaClient {
    /// Constructs a client from the backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if an endpoint URL cannot be
    /// joined onto the base.
    pub fn try_new(base_url: Url) -> Result<Self, ClientError> {
        let initiate_url =
            base_url
                .join("./api/payment/mpesa-payment")
                .map_err(|e| ClientError::UrlParse {
                    context: "Failed to construct mpesa-payment URL",
                    source: e,
                })?;
        // Trailing slash so the invoice id joins as a path segment.
        let status_base_url =
            base_url
                .join("./api/payment/status/")
                .map_err(|e| ClientError::UrlParse {
                    context: "Failed to construct status URL",
                    source: e,
                })?;
        Ok(Self {
            initiate_url,
            status_base_url,
            client: Client::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            hooks: Arc::new(NoHooks),
        })
    }

    /// Overrides the cadence between status checks.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets a timeout for each individual request.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches observer hooks for the polling lifecycle.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn PollHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Returns the computed initiate endpoint URL.
    #[must_use]
    pub const fn initiate_url(&self) -> &Url {
        &self.initiate_url
    }

    /// Runs one payment attempt to a terminal result.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Validation`] before any network call,
    /// [`PaymentError::Transport`] when initiation itself fails (no pending
    /// state is entered), [`PaymentError::Terminal`] on an explicit
    /// `failed` status, [`PaymentError::Provider`] on a response outside
    /// the protocol, or [`PaymentError::Cancelled`] when the session token
    /// fires.
    pub async fn pay(
        &self,
        billing: Option<&BillingDetails>,
        amount: f64,
        cancel: &CancellationToken,
    ) -> Result<Confirmation, PaymentError> {
        validate_billing(billing, PhoneRequirement::Required).into_result()?;
        let billing = billing.ok_or_else(|| PaymentError::provider(None))?;
        let phone_number = normalize_phone(billing.phone_number.as_deref().unwrap_or_default());

        let request = MpesaPaymentRequest {
            first_name: billing.first_name.clone(),
            last_name: billing.last_name.clone(),
            email: billing.email.clone(),
            phone_number,
            amount,
        };

        if cancel.is_cancelled() {
            return Err(PaymentError::Cancelled);
        }
        tracing::debug!(amount, "initiating mpesa payment");
        let response = self
            .post_initiate(&request)
            .await
            .map_err(|e| PaymentError::transport(e.to_string()))?;

        match response.status {
            Some(MpesaStatus::Complete) => {
                Ok(Confirmation::new(
                    PaymentMethod::Mpesa,
                    response.data.mpesa_reference,
                ))
            }
            Some(MpesaStatus::Pending) => {
                let invoice_id = response
                    .data
                    .invoice_id
                    .ok_or_else(|| PaymentError::provider(Some(UNEXPECTED_RESPONSE.to_owned())))?;
                self.hooks.on_pending(&invoice_id);
                self.poll_until_terminal(&invoice_id, cancel).await
            }
            _ => Err(PaymentError::provider(Some(
                response.message.unwrap_or_else(|| UNEXPECTED_RESPONSE.to_owned()),
            ))),
        }
    }

    /// Polls the status endpoint until a terminal result or cancellation.
    ///
    /// First check immediately, then one per poll interval. Serial by
    /// construction: the next request is only built after the previous
    /// handler returned.
    async fn poll_until_terminal(
        &self,
        invoice_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Confirmation, PaymentError> {
        loop {
            if cancel.is_cancelled() {
                tracing::debug!(invoice_id, "polling cancelled");
                return Err(PaymentError::Cancelled);
            }

            match self.check_status(invoice_id).await {
                Ok(response) => {
                    if let Some(status) = response.status {
                        self.hooks.on_check(status);
                    }
                    match response.status {
                        Some(MpesaStatus::Complete) => {
                            tracing::debug!(invoice_id, "mpesa payment complete");
                            return Ok(Confirmation::new(
                                PaymentMethod::Mpesa,
                                response.data.mpesa_reference,
                            ));
                        }
                        Some(MpesaStatus::Failed) => {
                            tracing::debug!(invoice_id, "mpesa payment failed");
                            return Err(PaymentError::terminal(response.data.failed_reason));
                        }
                        // Still pending, or a status we don't know: keep going.
                        _ => {}
                    }
                }
                Err(error) => {
                    // Transient: never stops polling, never surfaced.
                    tracing::debug!(invoice_id, %error, "status check failed, continuing");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(invoice_id, "polling cancelled during wait");
                    return Err(PaymentError::Cancelled);
                }
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    async fn post_initiate(
        &self,
        request: &MpesaPaymentRequest,
    ) -> Result<MpesaResponse, ClientError> {
        let context = "POST mpesa-payment";
        let mut req = self.client.post(self.initiate_url.clone()).json(request);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ClientError::Http { context, source: e })?;
        if response.status() != StatusCode::OK {
            return Err(ClientError::HttpStatus {
                context,
                status: response.status(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::JsonDeserialization { context, source: e })
    }

    async fn check_status(&self, invoice_id: &str) -> Result<MpesaResponse, ClientError> {
        let context = "GET payment status";
        let url = self
            .status_base_url
            .join(invoice_id)
            .map_err(|e| ClientError::UrlParse {
                context: "Failed to construct status check URL",
                source: e,
            })?;
        let mut req = self.client.get(url);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ClientError::Http { context, source: e })?;
        if response.status() != StatusCode::OK {
            return Err(ClientError::HttpStatus {
                context,
                status: response.status(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::JsonDeserialization { context, source: e })
    }
}

#[async_trait]
impl ProviderAdapter for MpesaClient {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Mpesa
    }

    async fn initiate(
        &self,
        charge: &ChargeRequest,
        cancel: &CancellationToken,
    ) -> Result<Confirmation, PaymentError> {
        self.pay(charge.billing.as_ref(), charge.amount, cancel).await
    }
}
