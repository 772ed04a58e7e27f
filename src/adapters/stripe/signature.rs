use {
    crate::domain::error::LedgerError,
    hmac::{Hmac, Mac},
    serde::Deserialize,
    sha2::Sha256,
    std::sync::Arc,
    std::time::{SystemTime, UNIX_EPOCH},
};

type HmacSha256 = Hmac<Sha256>;

/// Clock skew the provider allows between signing and delivery.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Thin view of a provider event: enough to route on kind and hand the
/// object to extraction, nothing more.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

/// Validates that an inbound notification really came from the payment
/// provider. The sole trust boundary: no field of the payload may be read
/// before this passes.
///
/// The shared secret is injected at construction so the verifier can be
/// exercised with fake credentials.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Arc<str>,
    tolerance_secs: i64,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self::with_tolerance(secret, DEFAULT_TOLERANCE_SECS)
    }

    pub fn with_tolerance(secret: impl Into<Arc<str>>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Verify against the current wall clock.
    pub fn verify(
        &self,
        payload: &[u8],
        header: Option<&str>,
    ) -> Result<WebhookEvent, LedgerError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        self.verify_at(payload, header, now)
    }

    /// Clock-explicit variant; the handler passes wall time, tests pin it.
    ///
    /// Header scheme: `t=<unix seconds>,v1=<hex hmac>[,v1=..]` where the
    /// signature is HMAC-SHA256 over `"{t}.{payload}"`. Any matching `v1`
    /// accepts; `v0` and unknown schemes are skipped.
    pub fn verify_at(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<WebhookEvent, LedgerError> {
        let header = header
            .ok_or_else(|| LedgerError::Signature("missing Stripe-Signature header".into()))?;

        let mut timestamp: Option<i64> = None;
        let mut signatures: Vec<&str> = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", v)) => timestamp = v.parse().ok(),
                Some(("v1", v)) => signatures.push(v),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| LedgerError::Signature("signature header has no timestamp".into()))?;
        if signatures.is_empty() {
            return Err(LedgerError::Signature(
                "signature header has no v1 signature".into(),
            ));
        }

        if (now - timestamp).abs() > self.tolerance_secs {
            return Err(LedgerError::Signature(format!(
                "timestamp {timestamp} outside tolerance of {}s",
                self.tolerance_secs
            )));
        }

        let mut signed_payload = Vec::with_capacity(payload.len() + 12);
        signed_payload.extend_from_slice(timestamp.to_string().as_bytes());
        signed_payload.push(b'.');
        signed_payload.extend_from_slice(payload);

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| LedgerError::Signature(format!("hmac init: {e}")))?;
        mac.update(&signed_payload);
        let expected = mac.finalize().into_bytes();

        let valid = signatures.iter().any(|sig| match hex::decode(sig) {
            Ok(sig_bytes) => constant_time_eq(&expected, &sig_bytes),
            Err(_) => false,
        });
        if !valid {
            return Err(LedgerError::Signature(
                "no v1 signature matched the payload".into(),
            ));
        }

        serde_json::from_slice(payload).map_err(|e| {
            LedgerError::Signature(format!("verified payload is not an event: {e}"))
        })
    }
}

// Accumulates over every byte instead of short-circuiting on the first
// mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] =
        br#"{"id":"evt_1","type":"checkout.session.completed","created":1700000000,"data":{"object":{"id":"cs_x"}}}"#;

    fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_passes() {
        let verifier = SignatureVerifier::new(SECRET);
        let ts = 1700000000;
        let header = format!("t={ts},v1={}", sign(SECRET, ts, BODY));

        let event = verifier.verify_at(BODY, Some(&header), ts).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.id, "evt_1");
    }

    #[test]
    fn second_v1_signature_accepts() {
        let verifier = SignatureVerifier::new(SECRET);
        let ts = 1700000000;
        let bad = "0".repeat(64);
        let header = format!("t={ts},v1={bad},v1={}", sign(SECRET, ts, BODY));

        assert!(verifier.verify_at(BODY, Some(&header), ts).is_ok());
    }

    #[test]
    fn tampered_body_rejected() {
        let verifier = SignatureVerifier::new(SECRET);
        let ts = 1700000000;
        let header = format!("t={ts},v1={}", sign(SECRET, ts, BODY));
        let tampered = BODY.to_vec().repeat(2);

        let err = verifier.verify_at(&tampered, Some(&header), ts).unwrap_err();
        assert!(matches!(err, LedgerError::Signature(_)));
    }

    #[test]
    fn wrong_secret_rejected() {
        let verifier = SignatureVerifier::new(SECRET);
        let ts = 1700000000;
        let header = format!("t={ts},v1={}", sign("whsec_other", ts, BODY));

        assert!(verifier.verify_at(BODY, Some(&header), ts).is_err());
    }

    #[test]
    fn missing_header_rejected() {
        let verifier = SignatureVerifier::new(SECRET);
        let err = verifier.verify_at(BODY, None, 1700000000).unwrap_err();
        assert!(matches!(err, LedgerError::Signature(_)));
    }

    #[test]
    fn header_without_timestamp_rejected() {
        let verifier = SignatureVerifier::new(SECRET);
        let header = format!("v1={}", sign(SECRET, 1700000000, BODY));
        assert!(verifier.verify_at(BODY, Some(&header), 1700000000).is_err());
    }

    #[test]
    fn header_without_v1_rejected() {
        let verifier = SignatureVerifier::new(SECRET);
        assert!(
            verifier
                .verify_at(BODY, Some("t=1700000000,v0=abcdef"), 1700000000)
                .is_err()
        );
    }

    #[test]
    fn expired_timestamp_rejected() {
        let verifier = SignatureVerifier::new(SECRET);
        let ts = 1700000000;
        let header = format!("t={ts},v1={}", sign(SECRET, ts, BODY));

        let err = verifier
            .verify_at(BODY, Some(&header), ts + DEFAULT_TOLERANCE_SECS + 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Signature(_)));
    }

    #[test]
    fn non_hex_signature_rejected() {
        let verifier = SignatureVerifier::new(SECRET);
        assert!(
            verifier
                .verify_at(BODY, Some("t=1700000000,v1=zzzz"), 1700000000)
                .is_err()
        );
    }

    #[test]
    fn verified_garbage_payload_still_rejected() {
        let verifier = SignatureVerifier::new(SECRET);
        let ts = 1700000000;
        let body = b"not json at all";
        let header = format!("t={ts},v1={}", sign(SECRET, ts, body));

        let err = verifier.verify_at(body, Some(&header), ts).unwrap_err();
        assert!(matches!(err, LedgerError::Signature(_)));
    }
}
