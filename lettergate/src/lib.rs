//! Core types for payment-gated document unlock and in-place editing.
//!
//! This crate provides the foundational pieces for gating a generated text
//! artifact behind proof of payment and editing it in place once unlocked.
//! It is transport-agnostic: the HTTP payment providers and the document
//! service live in the companion `lettergate-http` crate.
//!
//! # Overview
//!
//! A hosting screen owns the artifact and a shared [`access::AccessState`].
//! While locked, [`gate::ContentGate`] exposes a short preview and the
//! [`session::ProviderSelector`] drives one of three payment flows behind
//! the uniform [`provider::ProviderAdapter`] trait. The selector is the only
//! writer of the access flag; on success it records the payment details and
//! fires the owner's callback exactly once. Once unlocked, the full text is
//! handed to [`editor::EditableSurface`], which preserves the caret across
//! re-renders by flattening the selection to UTF-16 offsets.
//!
//! # Modules
//!
//! - [`access`] - Shared unlock flag with durable key-value persistence
//! - [`checkout`] - Hosted-checkout (instant confirmation) adapter
//! - [`editor`] - Caret-preserving editable text surface
//! - [`error`] - Payment failure taxonomy
//! - [`gate`] - Preview truncation and copy gating
//! - [`provider`] - Uniform payment adapter trait and charge types
//! - [`screen`] - Hosting-screen glue tying artifact, gate, and selector
//! - [`session`] - Provider selection state machine and session lifecycle
//! - [`timestamp`] - Unix timestamps for payment receipts
//! - [`validate`] - Billing field validation and phone normalization

pub mod access;
pub mod checkout;
pub mod editor;
pub mod error;
pub mod gate;
pub mod provider;
pub mod screen;
pub mod session;
pub mod timestamp;
pub mod validate;
