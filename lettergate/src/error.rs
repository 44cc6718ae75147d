//! Payment failure taxonomy.
//!
//! Four failure classes cover every way a provider session can go wrong:
//!
//! - [`PaymentError::Validation`] - client-side field failures; never reach
//!   the network and are recoverable by correcting the form
//! - [`PaymentError::Transport`] - network or non-2xx failures from a
//!   single-round-trip call; the user may retry by resubmitting
//! - [`PaymentError::Provider`] - structured failure reported by the hosted
//!   checkout widget, with a best-effort message
//! - [`PaymentError::Terminal`] - an explicit `failed` status from the
//!   asynchronous money backend; halts polling and is not retried
//!   automatically
//!
//! Transient errors during a status poll are deliberately absent: they are
//! swallowed by the polling loop and never surface. No variant is fatal to
//! the hosting application; every failure degrades to a displayed message
//! and a path back to provider selection.

use std::collections::BTreeMap;
use std::fmt;

/// Generic message for transport-level payment failures.
pub const GENERIC_PAYMENT_FAILED: &str = "Payment failed";

/// Fallback message when the hosted checkout reports no structured reason.
pub const UNKNOWN_PROVIDER_ERROR: &str = "An unknown error occurred";

/// A failure raised by a provider adapter or the selection state machine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentError {
    /// Client-side field validation failed; submission was blocked.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Network failure or unexpected HTTP status from a provider endpoint.
    #[error("{message}")]
    Transport {
        /// Human-readable message shown to the user.
        message: String,
    },

    /// Failure reported by the hosted checkout widget.
    #[error("{message}")]
    Provider {
        /// Best-effort message extracted from the provider, else a fallback.
        message: String,
    },

    /// Explicit `failed` status from the asynchronous money backend.
    #[error("{reason}")]
    Terminal {
        /// Reason supplied by the backend (e.g. "insufficient funds").
        reason: String,
    },

    /// The session was cancelled before the flow reached a terminal result.
    ///
    /// Never surfaced to the user; the selector drops results that arrive
    /// after cancellation.
    #[error("payment session cancelled")]
    Cancelled,
}

impl PaymentError {
    /// Creates a transport error with the given message.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a provider error, falling back to [`UNKNOWN_PROVIDER_ERROR`]
    /// when the widget supplied no message.
    #[must_use]
    pub fn provider(message: Option<String>) -> Self {
        Self::Provider {
            message: message.unwrap_or_else(|| UNKNOWN_PROVIDER_ERROR.to_owned()),
        }
    }

    /// Creates a terminal failure, falling back to [`GENERIC_PAYMENT_FAILED`]
    /// when the backend supplied no reason.
    #[must_use]
    pub fn terminal(reason: Option<String>) -> Self {
        Self::Terminal {
            reason: reason.unwrap_or_else(|| GENERIC_PAYMENT_FAILED.to_owned()),
        }
    }

    /// Returns `true` for results that should never mutate session state.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Field-to-message mapping produced by client-side form validation.
///
/// Keys are wire field names (`first_name`, `last_name`, `email`,
/// `phone_number`). An empty map means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    /// Creates an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for a field, replacing any earlier one.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Returns the message recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns `true` when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Converts a non-empty map into an error, or `Ok(())` when valid.
    ///
    /// # Errors
    ///
    /// Returns `self` wrapped in [`PaymentError::Validation`] when at least
    /// one field failed.
    pub fn into_result(self) -> Result<(), PaymentError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PaymentError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
