//! Persistence gateway response envelope
//!
//! Every remote store call answers `{success, data?, error?}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse<T> {
    pub success: bool,
    // No `default`: it would bound `Deserialize` on `T: Default`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> GatewayResponse<T> {
    /// Success with payload
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Success without payload
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Failure with message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Collapse the envelope into a `Result`
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| "unknown gateway error".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let ok = GatewayResponse::success(vec![1, 2]);
        let json = serde_json::to_string(&ok).unwrap();
        assert_eq!(json, r#"{"success":true,"data":[1,2]}"#);

        let err: GatewayResponse<()> =
            serde_json::from_str(r#"{"success":false,"error":"disk full"}"#).unwrap();
        assert_eq!(err.into_result(), Err("disk full".to_string()));
    }

    /// Decodes for any payload type, as the HTTP gateway does
    fn decode<T: serde::de::DeserializeOwned>(body: &str) -> GatewayResponse<T> {
        serde_json::from_str(body).unwrap()
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Snapshot {
        sequence: u64,
    }

    #[test]
    fn test_generic_decode_without_data() {
        let resp: GatewayResponse<Snapshot> = decode(r#"{"success":true}"#);
        assert_eq!(resp.into_result(), Ok(None));

        let resp: GatewayResponse<Snapshot> = decode(r#"{"success":true,"data":{"sequence":3}}"#);
        assert_eq!(resp.into_result(), Ok(Some(Snapshot { sequence: 3 })));
    }

    #[test]
    fn test_empty_success() {
        let resp: GatewayResponse<u8> = GatewayResponse::empty();
        assert_eq!(resp.into_result(), Ok(None));
    }
}
