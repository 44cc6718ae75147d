//! Provider selection state machine and session lifecycle.
//!
//! [`ProviderSelector`] walks the user through unlocking: `Closed` →
//! `Choosing` → `InFlow(method)` → `Succeeded`, with "back" returning to
//! `Choosing` and cancelling whatever the in-flight adapter owns. The
//! selector is the single writer of [`AccessState`]: on success it flips
//! the flag, records the receipt, and fires the owner's callback exactly
//! once. Results that arrive after a cancel are dropped on the floor.
//!
//! Method buttons are only reachable from `Choosing`, so no two adapters
//! can ever be in flight at once.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::access::{AccessState, PaymentDetails};
use crate::provider::Confirmation;
use crate::timestamp::UnixTimestamp;

/// The three enumerated payment flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Hosted checkout with instant confirmation.
    Paypal,
    /// Synchronous card capture, one round trip.
    Card,
    /// Asynchronous mobile money with status polling.
    Mpesa,
}

impl PaymentMethod {
    /// Wire tag used as a transaction-id fallback and in request payloads.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Paypal => "PAYPAL",
            Self::Card => "CARD-PAYMENT",
            Self::Mpesa => "MPESA",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Lifecycle of one payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No attempt in flight (form visible, nothing submitted).
    #[default]
    Idle,
    /// Submitted and awaiting a terminal result.
    Pending,
    /// Terminal success.
    Succeeded,
    /// Terminal or displayed failure; the user may retry.
    Failed,
}

/// One attempt to pay via a specific method.
///
/// Created when the unlock panel opens, destroyed when it closes or
/// succeeds. `correlation_id` is set if and only if the method is
/// [`PaymentMethod::Mpesa`] and an attempt has been submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSession {
    /// Chosen method; `None` while still choosing.
    pub method: Option<PaymentMethod>,
    /// Current attempt status.
    pub status: SessionStatus,
    /// Invoice id returned by an asynchronous initiation, used for polling.
    pub correlation_id: Option<String>,
    /// Message displayed to the user (progress or failure).
    pub message: Option<String>,
}

/// Externally visible state of the unlock panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorState {
    /// Panel closed; no session exists.
    #[default]
    Closed,
    /// Panel open, provider not yet picked.
    Choosing,
    /// A provider flow is active.
    InFlow(PaymentMethod),
    /// Payment committed; access is unlocked.
    Succeeded,
}

/// Invalid state-machine transition.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("cannot {action} from {from:?}")]
pub struct TransitionError {
    /// The attempted action.
    pub action: &'static str,
    /// The state the selector was in.
    pub from: SelectorState,
}

/// Callback fired once when a session succeeds.
pub type SuccessCallback = Box<dyn FnOnce(&PaymentDetails) + Send>;

/// The unlock-panel state machine.
pub struct ProviderSelector {
    state: SelectorState,
    session: Option<ProviderSession>,
    access: Arc<AccessState>,
    amount: f64,
    currency: String,
    cancel: Option<CancellationToken>,
    on_success: Option<SuccessCallback>,
}

impl fmt::Debug for ProviderSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSelector")
            .field("state", &self.state)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ProviderSelector {
    /// Creates a closed selector charging `amount` in `currency`.
    #[must_use]
    pub fn new(access: Arc<AccessState>, amount: f64, currency: impl Into<String>) -> Self {
        Self {
            state: SelectorState::Closed,
            session: None,
            access,
            amount,
            currency: currency.into(),
            cancel: None,
            on_success: None,
        }
    }

    /// Registers the owner callback fired exactly once on success.
    #[must_use]
    pub fn with_on_success(mut self, callback: SuccessCallback) -> Self {
        self.on_success = Some(callback);
        self
    }

    /// Returns the current panel state.
    #[must_use]
    pub const fn state(&self) -> SelectorState {
        self.state
    }

    /// Returns the current session, if the panel is open.
    #[must_use]
    pub const fn session(&self) -> Option<&ProviderSession> {
        self.session.as_ref()
    }

    /// Opens the unlock panel, creating a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the panel is closed.
    pub fn open(&mut self) -> Result<(), TransitionError> {
        if self.state != SelectorState::Closed {
            return Err(TransitionError {
                action: "open",
                from: self.state,
            });
        }
        self.state = SelectorState::Choosing;
        self.session = Some(ProviderSession::default());
        Ok(())
    }

    /// Picks a provider, entering its flow.
    ///
    /// Returns the session's cancellation token; the caller passes it to
    /// the adapter so that backing out stops any in-flight work.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the selector is in `Choosing` —
    /// method buttons are only reachable from there, which is what rules
    /// out two concurrently active adapters.
    pub fn choose(&mut self, method: PaymentMethod) -> Result<CancellationToken, TransitionError> {
        if self.state != SelectorState::Choosing {
            return Err(TransitionError {
                action: "choose a provider",
                from: self.state,
            });
        }
        self.state = SelectorState::InFlow(method);
        if let Some(session) = &mut self.session {
            session.method = Some(method);
            session.status = SessionStatus::Idle;
            session.correlation_id = None;
            session.message = None;
        }
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        Ok(token)
    }

    /// Marks the active attempt submitted and awaiting its result.
    ///
    /// For the asynchronous money flow, `correlation_id` carries the
    /// invoice id returned by initiation; other methods pass `None`.
    pub fn mark_pending(&mut self, correlation_id: Option<String>) {
        let SelectorState::InFlow(method) = self.state else {
            return;
        };
        if let Some(session) = &mut self.session {
            session.status = SessionStatus::Pending;
            // Correlation ids only exist for the polling flow.
            session.correlation_id = if method == PaymentMethod::Mpesa {
                correlation_id
            } else {
                None
            };
        }
    }

    /// Backs out of the active flow, returning to provider choice.
    ///
    /// Cancels the session token so the adapter stops any in-flight
    /// polling; the session itself survives with its fields reset.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless a flow is active.
    pub fn back(&mut self) -> Result<(), TransitionError> {
        let SelectorState::InFlow(_) = self.state else {
            return Err(TransitionError {
                action: "go back",
                from: self.state,
            });
        };
        self.cancel_in_flight();
        self.state = SelectorState::Choosing;
        self.session = Some(ProviderSession::default());
        Ok(())
    }

    /// Closes the panel from any state, destroying the session.
    pub fn close(&mut self) {
        self.cancel_in_flight();
        self.state = SelectorState::Closed;
        self.session = None;
    }

    /// Commits a successful payment.
    ///
    /// Gated on session liveness: a confirmation arriving after
    /// [`Self::back`] or [`Self::close`], or for a method other than the
    /// active one, is dropped. On commit, in order: the access flag flips,
    /// the receipt is recorded, the owner callback fires (exactly once over
    /// the selector's lifetime), and the panel reaches `Succeeded`.
    ///
    /// Returns `true` when the confirmation was applied.
    pub fn report_success(&mut self, confirmation: &Confirmation) -> bool {
        if !self.is_live(confirmation.method) {
            tracing::debug!(method = %confirmation.method, "dropping stale confirmation");
            return false;
        }

        let details = PaymentDetails {
            amount: self.amount,
            currency: self.currency.clone(),
            transaction_id: confirmation.transaction_id(),
            timestamp: UnixTimestamp::now(),
        };
        self.access.set(true);
        self.access.set_details(Some(details.clone()));
        if let Some(callback) = self.on_success.take() {
            callback(&details);
        }

        if let Some(session) = &mut self.session {
            session.status = SessionStatus::Succeeded;
            session.message = None;
        }
        self.state = SelectorState::Succeeded;
        self.cancel = None;
        true
    }

    /// Records a failure message on the active flow.
    ///
    /// No state transition: the panel stays in the same flow with the
    /// message attached, and the user may retry or back out. Stale results
    /// are dropped like stale confirmations.
    ///
    /// Returns `true` when the message was applied.
    pub fn report_failure(&mut self, method: PaymentMethod, message: impl Into<String>) -> bool {
        if !self.is_live(method) {
            tracing::debug!(method = %method, "dropping stale failure");
            return false;
        }
        if let Some(session) = &mut self.session {
            session.status = SessionStatus::Failed;
            session.message = Some(message.into());
        }
        true
    }

    /// Liveness gate for adapter results: the flow for `method` must still
    /// be active and its token must not have been cancelled.
    fn is_live(&self, method: PaymentMethod) -> bool {
        self.state == SelectorState::InFlow(method)
            && self.cancel.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}
