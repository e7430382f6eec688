//! API request and response types.

use crate::admin::TableInfo;
use crate::storage::Row;
use crate::verification::VerifyOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// VERIFICATION
// ============================================================================

/// Body of both verify endpoints. Fields are loose JSON so a numeric
/// `teamNumber` is accepted as its text form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(default, rename = "teamNumber")]
    pub team_number: Value,
    #[serde(default)]
    pub passcode: Value,
}

impl VerifyRequest {
    pub fn team_number(&self) -> String {
        field_text(&self.team_number)
    }

    pub fn passcode(&self) -> String {
        field_text(&self.passcode)
    }
}

/// Null or missing reads as the empty string.
fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResponse {
    pub fn fault(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

impl From<&VerifyOutcome> for VerifyResponse {
    fn from(outcome: &VerifyOutcome) -> Self {
        Self {
            success: outcome.is_accepted(),
            message: outcome.message().map(str::to_string),
            error: None,
        }
    }
}

// ============================================================================
// TABLES
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TableListResponse {
    pub files: Vec<TableInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RowsResponse {
    pub data: Vec<Row>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RowsMutationResponse {
    pub success: bool,
    pub data: Vec<Row>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub columns: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verify_request_field_text() {
        let req: VerifyRequest =
            serde_json::from_value(json!({"teamNumber": 7, "passcode": "x"})).unwrap();
        assert_eq!(req.team_number(), "7");
        assert_eq!(req.passcode(), "x");

        let req: VerifyRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.team_number(), "");
        assert_eq!(req.passcode(), "");
    }

    #[test]
    fn test_verify_response_shape() {
        let ok = serde_json::to_value(VerifyResponse {
            success: true,
            message: None,
            error: None,
        })
        .unwrap();
        assert_eq!(ok, json!({"success": true}));

        let rejected = serde_json::to_value(VerifyResponse::from(&VerifyOutcome::InvalidCredentials)).unwrap();
        assert_eq!(
            rejected,
            json!({"success": false, "message": "Invalid credentials"})
        );

        let fault = serde_json::to_value(VerifyResponse::fault("disk full")).unwrap();
        assert_eq!(fault, json!({"success": false, "error": "disk full"}));
    }
}
