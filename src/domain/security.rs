//! Payment signature verification
//!
//! The gateway signs `order_id|payment_id` with the merchant key secret using
//! HMAC-SHA256 and hands the hex digest to the customer's browser. Recomputing it
//! is what proves a verification request was not forged.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `message` under `secret`
pub fn hmac_sha256_hex(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies gateway payment signatures
#[derive(Clone)]
pub struct PaymentSignatureVerifier {
    secret: String,
}

impl PaymentSignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    fn signed_payload(order_id: &str, payment_id: &str) -> String {
        format!("{}|{}", order_id, payment_id)
    }

    /// Signature the gateway would have produced for this pair
    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> String {
        hmac_sha256_hex(self.secret.as_bytes(), Self::signed_payload(order_id, payment_id).as_bytes())
    }

    /// Constant-time comparison of a hex signature against the recomputed MAC
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(provided) = hex::decode(signature) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(Self::signed_payload(order_id, payment_id).as_bytes());
        mac.verify_slice(&provided).is_ok()
    }
}

impl std::fmt::Debug for PaymentSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentSignatureVerifier").field("secret", &"<redacted>").finish()
    }
}
