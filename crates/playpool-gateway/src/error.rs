//! Error type for ledger calls.

/// A gateway call failed.
///
/// These are remote failures: the transaction was rejected, the contract
/// reverted, or the network dropped the call. The client never retries
/// them automatically; a blind retry of a join or submit could spend an
/// entry fee twice. Local validation failures never become a
/// `GatewayError`; they are caught before a call is issued.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The node accepted the request but the call was rejected or the
    /// contract reverted. `data` carries the node's nested error payload
    /// when one was returned; [`GatewayError::reason`] knows how to dig
    /// through it.
    #[error("ledger rejected the call: {message}")]
    Rejected {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// The call never reached the ledger (timeout, connection refused,
    /// transport error). The intent may or may not have landed; callers
    /// must re-read before assuming either way.
    #[error("network error: {0}")]
    Network(String),

    /// The node answered with something that isn't a valid response.
    #[error("malformed gateway response: {0}")]
    BadResponse(String),
}

impl GatewayError {
    /// Best-available human-readable reason for the failure.
    ///
    /// Nodes nest the useful revert string inside the structured `data`
    /// payload; the flat `message` is often just "execution reverted".
    /// Checks `data.reason`, then `data.message`, then falls back to the
    /// top-level message.
    pub fn reason(&self) -> &str {
        match self {
            Self::Rejected { message, data, .. } => data
                .as_ref()
                .and_then(|d| {
                    d.get("reason")
                        .or_else(|| d.get("message"))
                        .and_then(|v| v.as_str())
                })
                .unwrap_or(message),
            Self::Network(msg) | Self::BadResponse(msg) => msg,
        }
    }

    /// Shorthand for a contract revert with a structured reason.
    pub fn reverted(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::Rejected {
            code: 3,
            message: "execution reverted".into(),
            data: Some(serde_json::json!({ "reason": reason })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_prefers_nested_payload() {
        let err = GatewayError::reverted("room is full");
        assert_eq!(err.reason(), "room is full");
        assert_eq!(err.to_string(), "ledger rejected the call: execution reverted");
    }

    #[test]
    fn test_reason_falls_back_to_nested_message_field() {
        let err = GatewayError::Rejected {
            code: -32000,
            message: "call failed".into(),
            data: Some(serde_json::json!({ "message": "out of gas" })),
        };
        assert_eq!(err.reason(), "out of gas");
    }

    #[test]
    fn test_reason_falls_back_to_flat_message() {
        let err = GatewayError::Rejected {
            code: -32000,
            message: "nonce too low".into(),
            data: None,
        };
        assert_eq!(err.reason(), "nonce too low");

        let err = GatewayError::Rejected {
            code: 3,
            message: "execution reverted".into(),
            data: Some(serde_json::json!({ "unrelated": 1 })),
        };
        assert_eq!(err.reason(), "execution reverted");
    }

    #[test]
    fn test_reason_for_network_error() {
        let err = GatewayError::Network("connection refused".into());
        assert_eq!(err.reason(), "connection refused");
    }
}
