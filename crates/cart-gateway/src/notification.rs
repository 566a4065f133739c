//! # Payment Notifications
//!
//! Verification and parsing of the gateway's asynchronous payment
//! notifications. The signature header carries a timestamp and one or
//! more HMAC-SHA256 signatures over `"{timestamp}.{payload}"`; nothing
//! in the payload is trusted before the signature checks out.

use cart_core::{CartError, CartResult, PaymentOutcome};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

/// Timestamp tolerance for notification signatures (seconds)
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// A verified, parsed payment notification
#[derive(Debug, Clone)]
pub struct PaymentNotification {
    /// Order id the notification settles
    pub order_id: String,
    /// Terminal outcome carried by the notification
    pub outcome: PaymentOutcome,
}

#[derive(Debug, Deserialize)]
struct NotificationPayload {
    order_id: String,
    status: String,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Verify the signature header and parse the notification payload.
///
/// # Arguments
/// * `payload` - Raw notification body bytes
/// * `signature` - Signature header (`t=...,v1=...`)
/// * `shared_secret` - The gateway's shared signing secret
pub fn verify_notification(
    payload: &[u8],
    signature: &str,
    shared_secret: &str,
) -> CartResult<PaymentNotification> {
    let header = parse_signature_header(signature)?;

    let now = Utc::now().timestamp();
    if (now - header.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(CartError::Validation(
            "notification timestamp outside tolerance".to_string(),
        ));
    }

    let signed_payload = format!("{}.{}", header.timestamp, String::from_utf8_lossy(payload));
    let valid = header
        .signatures
        .iter()
        .any(|sig| verify_hmac_sha256(shared_secret, &signed_payload, sig));

    if !valid {
        return Err(CartError::Validation(
            "notification signature mismatch".to_string(),
        ));
    }

    let parsed: NotificationPayload = serde_json::from_slice(payload)
        .map_err(|e| CartError::Serialization(format!("failed to parse notification: {e}")))?;

    debug!(order_id = %parsed.order_id, status = %parsed.status, "verified payment notification");

    let outcome = match parsed.status.as_str() {
        "approved" | "completed" => {
            let transaction_reference = parsed.transaction_id.ok_or_else(|| {
                CartError::Validation("approved notification without a transaction id".to_string())
            })?;
            PaymentOutcome::Approved {
                transaction_reference,
            }
        }
        "declined" | "failed" => PaymentOutcome::Declined {
            reason: parsed
                .reason
                .unwrap_or_else(|| "declined by provider".to_string()),
        },
        "cancelled" => PaymentOutcome::Cancelled,
        other => {
            return Err(CartError::Validation(format!(
                "unknown notification status: {other}"
            )))
        }
    };

    Ok(PaymentNotification {
        order_id: parsed.order_id,
        outcome,
    })
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> CartResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.split('=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0] {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        CartError::Validation("missing timestamp in notification signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(CartError::Validation(
            "no v1 signature in notification header".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Constant-time HMAC check via `Mac::verify_slice`
fn verify_hmac_sha256(secret: &str, message: &str, signature_hex: &str) -> bool {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Compute the hex signature for a payload (used by tests and tooling)
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{}.{}", timestamp, String::from_utf8_lossy(payload)).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "secret_0123456789abcdef";

    fn signed(payload: &str) -> (String, String) {
        let ts = Utc::now().timestamp();
        let sig = sign_payload(SECRET, ts, payload.as_bytes());
        (payload.to_string(), format!("t={ts},v1={sig}"))
    }

    #[test]
    fn test_valid_notification() {
        let (payload, header) = signed(
            r#"{"order_id":"ORD_1","status":"approved","transaction_id":"txn_1"}"#,
        );

        let notification = verify_notification(payload.as_bytes(), &header, SECRET).unwrap();
        assert_eq!(notification.order_id, "ORD_1");
        assert_eq!(notification.outcome.transaction_reference(), Some("txn_1"));
    }

    #[test]
    fn test_failed_status_maps_to_declined() {
        let (payload, header) =
            signed(r#"{"order_id":"ORD_1","status":"failed","reason":"card expired"}"#);

        let notification = verify_notification(payload.as_bytes(), &header, SECRET).unwrap();
        assert_eq!(
            notification.outcome,
            PaymentOutcome::Declined {
                reason: "card expired".into()
            }
        );
    }

    #[test]
    fn test_signature_mismatch_rejected() {
        let (payload, _) = signed(r#"{"order_id":"ORD_1","status":"cancelled"}"#);
        let ts = Utc::now().timestamp();
        let header = format!("t={ts},v1={}", "0".repeat(64));

        let err = verify_notification(payload.as_bytes(), &header, SECRET).unwrap_err();
        assert!(matches!(err, CartError::Validation(_)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = r#"{"order_id":"ORD_1","status":"cancelled"}"#;
        let stale = Utc::now().timestamp() - 3600;
        let sig = sign_payload(SECRET, stale, payload.as_bytes());
        let header = format!("t={stale},v1={sig}");

        let err = verify_notification(payload.as_bytes(), &header, SECRET).unwrap_err();
        assert!(matches!(err, CartError::Validation(_)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let (_, header) = signed(r#"{"order_id":"ORD_1","status":"cancelled"}"#);
        let tampered = r#"{"order_id":"ORD_2","status":"cancelled"}"#;

        assert!(verify_notification(tampered.as_bytes(), &header, SECRET).is_err());
    }

    #[test]
    fn test_header_parsing() {
        let header = "t=1234567890,v1=abc123,v1=def456";
        let parsed = parse_signature_header(header).unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures.len(), 2);

        assert!(parse_signature_header("v1=abc").is_err());
        assert!(parse_signature_header("t=123").is_err());
    }
}
