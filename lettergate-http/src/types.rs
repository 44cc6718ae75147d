//! Wire types for the backend payment and document endpoints.
//!
//! Field names follow the backend verbatim: request bodies use snake_case,
//! the `data` envelopes of the mobile-money responses use camelCase.

use serde::{Deserialize, Serialize};

/// Request body for the card capture endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPaymentRequest {
    /// Payer first name.
    pub first_name: String,
    /// Payer last name.
    pub last_name: String,
    /// Payer email.
    pub email: String,
    /// Always `"CARD-PAYMENT"`.
    pub method: String,
    /// Amount to capture.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
}

/// Request body for the mobile-money initiate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpesaPaymentRequest {
    /// Payer first name.
    pub first_name: String,
    /// Payer last name.
    pub last_name: String,
    /// Payer email.
    pub email: String,
    /// Normalized `254...` mobile number.
    pub phone_number: String,
    /// Amount to charge.
    pub amount: f64,
}

/// Status reported by the mobile-money backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MpesaStatus {
    /// Awaiting the payer's confirmation on their phone.
    Pending,
    /// Funds captured; terminal success.
    Complete,
    /// Terminal failure; `failedReason` carries the cause.
    Failed,
    /// Anything the backend may add later.
    #[serde(other)]
    Unknown,
}

/// The `data` envelope of mobile-money responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MpesaData {
    /// Correlation id for status polling; set on a pending initiation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    /// M-PESA transaction reference; set on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpesa_reference: Option<String>,
    /// Failure cause; set on a `failed` status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_reason: Option<String>,
}

/// Response of the mobile-money initiate and status endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpesaResponse {
    /// Payment status.
    pub status: Option<MpesaStatus>,
    /// Status-dependent payload.
    #[serde(default)]
    pub data: MpesaData,
    /// Optional backend message (unexpected responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request body for artifact generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The job description to tailor the letter to.
    #[serde(rename = "jobDescription")]
    pub job_description: String,
}

/// Response of artifact generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated letter text.
    #[serde(rename = "coverLetter")]
    pub cover_letter: String,
}

/// Response of the text extraction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Plain text recovered from the uploaded document.
    #[serde(rename = "extractedText")]
    pub extracted_text: String,
}

/// Request body for document export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// The text to lay out.
    pub text: String,
}

/// Export output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Portable Document Format.
    Pdf,
    /// Word document.
    Docx,
}

impl ExportFormat {
    /// Endpoint path segment for this format.
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::Pdf => "generate-pdf",
            Self::Docx => "generate-docx",
        }
    }

    /// File extension for downloads.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}
