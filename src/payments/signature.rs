use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Webhook signature scheme: the gateway sends a header of the form
/// `t=<unix-seconds>,v1=<hex hmac>`, where the MAC is HMAC-SHA256 of
/// `"{t}.{raw body}"` under the endpoint's webhook secret. Multiple `v1`
/// entries may appear during secret rotation.
#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,

    #[error("signature timestamp outside tolerance")]
    Expired,

    #[error("signature mismatch")]
    Mismatch,
}

struct SignatureHeader {
    timestamp: i64,
    candidates: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=').ok_or(SignatureError::Malformed)?;
        match key {
            "t" => {
                timestamp = Some(value.parse::<i64>().map_err(|_| SignatureError::Malformed)?);
            }
            "v1" => {
                candidates.push(hex::decode(value).map_err(|_| SignatureError::Malformed)?);
            }
            // other schemes (v0 test signatures etc.) are ignored
            _ => {}
        }
    }

    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }

    Ok(SignatureHeader {
        timestamp: timestamp.ok_or(SignatureError::Malformed)?,
        candidates,
    })
}

/// Verifies a webhook signature header against the raw request body.
///
/// `now` is passed in rather than read from the clock so the tolerance
/// window is testable.
pub fn verify(
    secret: &str,
    header: &str,
    payload: &[u8],
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;

    if (now - parsed.timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let mac = signed_mac(secret, parsed.timestamp, payload);
    for candidate in &parsed.candidates {
        if mac.clone().verify_slice(candidate).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

/// Computes the hex signature for a timestamp and body. Used by tests and
/// useful for replaying events against a local endpoint.
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    hex::encode(signed_mac(secret, timestamp, payload).finalize().into_bytes())
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    fn header_for(timestamp: i64) -> String {
        format!("t={},v1={}", timestamp, sign(SECRET, timestamp, BODY))
    }

    #[test]
    fn valid_signature_verifies() {
        let header = header_for(1_700_000_000);
        assert_eq!(verify(SECRET, &header, BODY, 1_700_000_010, 300), Ok(()));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let header = header_for(1_700_000_000);
        let result = verify(SECRET, &header, b"{\"type\":\"other\"}", 1_700_000_010, 300);
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = header_for(1_700_000_000);
        let result = verify("whsec_other", &header, BODY, 1_700_000_010, 300);
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let header = header_for(1_700_000_000);
        let result = verify(SECRET, &header, BODY, 1_700_000_000 + 301, 300);
        assert_eq!(result, Err(SignatureError::Expired));
    }

    #[test]
    fn rotation_candidates_are_all_tried() {
        let timestamp = 1_700_000_000;
        let header = format!(
            "t={},v1={},v1={}",
            timestamp,
            sign("whsec_retired", timestamp, BODY),
            sign(SECRET, timestamp, BODY),
        );
        assert_eq!(verify(SECRET, &header, BODY, timestamp, 300), Ok(()));
    }

    #[test]
    fn missing_parts_are_malformed() {
        assert_eq!(
            verify(SECRET, "v1=deadbeef", BODY, 0, 300),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify(SECRET, "t=123", BODY, 0, 300),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify(SECRET, "t=123,v1=not-hex", BODY, 0, 300),
            Err(SignatureError::Malformed)
        );
    }
}
