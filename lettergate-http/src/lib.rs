//! HTTP payment-provider and document-service clients for lettergate.
//!
//! This crate supplies the network half of the system: reqwest-based
//! clients for the two backend payment endpoints and the document service,
//! each constructed from a base [`url::Url`] with endpoint URLs pre-joined
//! up front.
//!
//! # Clients
//!
//! - [`card::CardClient`] - synchronous card capture, one round trip
//! - [`mpesa::MpesaClient`] - asynchronous mobile money: initiate, then
//!   poll a status endpoint on a fixed cadence until a terminal result,
//!   racing the session's cancellation token
//! - [`documents::DocumentsClient`] - the external collaborators: generate
//!   an artifact from a job description, extract text from an uploaded
//!   file, export to PDF/DOCX
//!
//! Both payment clients implement
//! [`lettergate::provider::ProviderAdapter`], so the selection state
//! machine drives them interchangeably with the in-process hosted
//! checkout.

pub mod card;
pub mod documents;
pub mod error;
pub mod mpesa;
pub mod types;
