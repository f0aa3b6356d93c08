//! Document Extraction Client
//!
//! Client for the hosted AI document-extraction service that turns uploaded
//! PDFs and weighing-slip photos into structured fields. Every call is
//! schema-constrained: the service either returns the full target shape or
//! an error, so the ledgers never see partial data.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Client for the document extraction microservice
#[derive(Clone)]
pub struct DocumentExtractionClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Request to classify or extract a document
#[derive(Debug, Serialize)]
struct ExtractionRequest<'a> {
    document_base64: &'a str,
    mime_type: &'a str,
    target: &'a str,
}

/// Response for a document-type classification
#[derive(Debug, Deserialize)]
pub struct ClassificationResponse {
    pub matches: bool,
}

/// Fields extracted from a Dhan Delivery Order PDF
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOrderFields {
    pub do_no: String,
    pub do_date: String,
    pub lot_no: String,
    pub issue_center: String,
    pub godown: String,
    /// Quantity in quintals, as printed (e.g. "433.00").
    pub quantity: String,
    pub valid_upto: String,
    /// Procurement year ("uparjan varsh"), e.g. "2024-2025".
    pub uparjan_varsh: String,
}

/// Fields extracted from a CMR Deposit Order PDF
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmrOrderFields {
    pub do_no: String,
    pub order_no: String,
    pub deposit_date: String,
    pub deposited_at: String,
}

/// Fields extracted from a weighing slip (Kanta Parchi) photo
///
/// The slip values come back as strings; bags are often handwritten and may
/// be missing entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeighingSlipFields {
    #[serde(default)]
    pub rst_no: Option<String>,
    #[serde(default)]
    pub truck_no: Option<String>,
    #[serde(default)]
    pub lifted_quantity_in_kg: Option<String>,
    #[serde(default)]
    pub number_of_bags: Option<String>,
}

impl DocumentExtractionClient {
    /// Create a new document extraction client
    pub fn new(api_endpoint: String, api_key: String) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|err| {
                AppError::Configuration(format!("Failed to create HTTP client: {}", err))
            })?;

        Ok(Self {
            api_endpoint,
            api_key,
            http_client,
        })
    }

    /// Is the uploaded PDF a Dhan Delivery Order?
    pub async fn validate_release_order(&self, pdf_base64: &str) -> AppResult<bool> {
        let response: ClassificationResponse = self
            .post(
                "classify",
                &ExtractionRequest {
                    document_base64: pdf_base64,
                    mime_type: "application/pdf",
                    target: "dhanDeliveryOrder",
                },
            )
            .await?;
        Ok(response.matches)
    }

    /// Extract release-order fields from a Dhan Delivery Order PDF.
    pub async fn extract_release_order(&self, pdf_base64: &str) -> AppResult<ReleaseOrderFields> {
        self.post(
            "extract",
            &ExtractionRequest {
                document_base64: pdf_base64,
                mime_type: "application/pdf",
                target: "releaseOrder",
            },
        )
        .await
    }

    /// Is the uploaded PDF a CMR Deposit Order?
    pub async fn validate_cmr_order(&self, pdf_base64: &str) -> AppResult<bool> {
        let response: ClassificationResponse = self
            .post(
                "classify",
                &ExtractionRequest {
                    document_base64: pdf_base64,
                    mime_type: "application/pdf",
                    target: "cmrDepositOrder",
                },
            )
            .await?;
        Ok(response.matches)
    }

    /// Extract CMR deposit-order fields from a PDF.
    pub async fn extract_cmr_order(&self, pdf_base64: &str) -> AppResult<CmrOrderFields> {
        self.post(
            "extract",
            &ExtractionRequest {
                document_base64: pdf_base64,
                mime_type: "application/pdf",
                target: "cmrDepositOrder",
            },
        )
        .await
    }

    /// Extract weighing-slip fields from a photo.
    pub async fn extract_weighing_slip(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> AppResult<WeighingSlipFields> {
        self.post(
            "extract",
            &ExtractionRequest {
                document_base64: image_base64,
                mime_type,
                target: "weighingSlip",
            },
        )
        .await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &ExtractionRequest<'_>,
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.api_endpoint, path);

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| AppError::ExtractionError(format!("Request failed: {}", err)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExtractionError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|err| AppError::ExtractionError(format!("Failed to parse response: {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighing_slip_fields_tolerate_missing_values() {
        let fields: WeighingSlipFields =
            serde_json::from_str(r#"{"rstNo": "12800", "truckNo": "MP19HA4165"}"#).unwrap();
        assert_eq!(fields.rst_no.as_deref(), Some("12800"));
        assert_eq!(fields.lifted_quantity_in_kg, None);
        assert_eq!(fields.number_of_bags, None);
    }

    #[test]
    fn test_release_order_fields_parse_camel_case() {
        let fields: ReleaseOrderFields = serde_json::from_str(
            r#"{
                "doNo": "1224121212510046",
                "doDate": "12/Mar/2025",
                "lotNo": "Lot46.0000/2",
                "issueCenter": "Satna Unit-II",
                "godown": "JAMUNA WAREHOUSE NO. 25",
                "quantity": "433.00",
                "validUpto": "22/Mar/2025",
                "uparjanVarsh": "2024-2025"
            }"#,
        )
        .unwrap();
        assert_eq!(fields.do_no, "1224121212510046");
        assert_eq!(fields.uparjan_varsh, "2024-2025");
    }
}
