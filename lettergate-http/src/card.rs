//! Synchronous card capture client.
//!
//! One round trip: validation runs entirely client-side first, then a
//! single `POST` carries the billing fields and the fixed
//! `"CARD-PAYMENT"` method tag. An HTTP 200 is the whole success signal —
//! the backend returns no structured body — and any other status or
//! transport failure surfaces as a generic `"Payment failed"` message,
//! since the provider gives no failure reason. The user retries by
//! resubmitting.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use url::Url;

use lettergate::error::{GENERIC_PAYMENT_FAILED, PaymentError};
use lettergate::provider::{BillingDetails, ChargeRequest, Confirmation, ProviderAdapter};
use lettergate::session::PaymentMethod;
use lettergate::validate::{PhoneRequirement, validate_billing};

use crate::error::ClientError;
use crate::types::CardPaymentRequest;

/// Client for the card capture endpoint.
#[derive(Debug, Clone)]
pub struct CardClient {
    payment_url: Url,
    client: Client,
    timeout: Option<std::time::Duration>,
}

impl CardClient {
    /// Constructs a client from the backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if the endpoint URL cannot be
    /// joined onto the base.
    pub fn try_new(base_url: Url) -> Result<Self, ClientError> {
        let payment_url =
            base_url
                .join("./api/payment/card-payment")
                .map_err(|e| ClientError::UrlParse {
                    context: "Failed to construct card-payment URL",
                    source: e,
                })?;
        Ok(Self {
            payment_url,
            client: Client::new(),
            timeout: None,
        })
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the computed payment endpoint URL.
    #[must_use]
    pub const fn payment_url(&self) -> &Url {
        &self.payment_url
    }

    /// Validates and submits one card charge.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Validation`] before any network call when a
    /// field fails, or [`PaymentError::Transport`] with the generic message
    /// on any non-200 status or transport failure.
    pub async fn charge(
        &self,
        billing: Option<&BillingDetails>,
        amount: f64,
        currency: &str,
    ) -> Result<Confirmation, PaymentError> {
        validate_billing(billing, PhoneRequirement::NotCollected).into_result()?;
        let billing = billing.ok_or_else(|| PaymentError::transport(GENERIC_PAYMENT_FAILED))?;

        let request = CardPaymentRequest {
            first_name: billing.first_name.clone(),
            last_name: billing.last_name.clone(),
            email: billing.email.clone(),
            method: PaymentMethod::Card.tag().to_owned(),
            amount,
            currency: currency.to_owned(),
        };

        tracing::debug!(amount, currency, "submitting card payment");
        let mut req = self.client.post(self.payment_url.clone()).json(&request);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        match req.send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                // No reference in the acknowledgement body.
                Ok(Confirmation::new(PaymentMethod::Card, None))
            }
            Ok(response) => {
                tracing::debug!(status = %response.status(), "card payment rejected");
                Err(PaymentError::transport(GENERIC_PAYMENT_FAILED))
            }
            Err(error) => {
                tracing::debug!(%error, "card payment transport failure");
                Err(PaymentError::transport(GENERIC_PAYMENT_FAILED))
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for CardClient {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Card
    }

    async fn initiate(
        &self,
        charge: &ChargeRequest,
        cancel: &CancellationToken,
    ) -> Result<Confirmation, PaymentError> {
        if cancel.is_cancelled() {
            return Err(PaymentError::Cancelled);
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(PaymentError::Cancelled),
            result = self.charge(charge.billing.as_ref(), charge.amount, &charge.currency) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn billing() -> BillingDetails {
        BillingDetails {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            email: "jane@doe.com".to_owned(),
            phone_number: None,
        }
    }

    async fn client(server: &MockServer) -> CardClient {
        CardClient::try_new(server.uri().parse::<Url>().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn http_200_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payment/card-payment"))
            .and(body_partial_json(serde_json::json!({
                "method": "CARD-PAYMENT",
                "email": "jane@doe.com",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let confirmation = client(&server)
            .await
            .charge(Some(&billing()), 5.0, "USD")
            .await
            .unwrap();
        assert_eq!(confirmation.method, PaymentMethod::Card);
        assert!(confirmation.reference.is_none());
    }

    #[tokio::test]
    async fn non_200_fails_with_the_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payment/card-payment"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .charge(Some(&billing()), 5.0, "USD")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), GENERIC_PAYMENT_FAILED);
    }

    #[tokio::test]
    async fn validation_failures_never_reach_the_network() {
        let server = MockServer::start().await;
        // No mock mounted: any request would 404 and the expect(0) below
        // would also catch it.
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let bad = BillingDetails {
            email: "foo".to_owned(),
            ..billing()
        };
        let err = client(&server)
            .await
            .charge(Some(&bad), 5.0, "USD")
            .await
            .unwrap_err();
        let PaymentError::Validation(errors) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(errors.get("email"), Some("Email is invalid"));
    }

    #[tokio::test]
    async fn cancellation_preempts_the_round_trip() {
        let server = MockServer::start().await;
        let card = client(&server).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let charge = ChargeRequest::new(5.0, "USD").with_billing(billing());
        let err = card.initiate(&charge, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
