//! Interaction request signature check.
//!
//! Discord signs `timestamp || body` with the application's Ed25519 key and
//! sends the signature and timestamp as headers. Unsigned or badly signed
//! requests must be answered with 401.

use ring::signature::{UnparsedPublicKey, ED25519};

use crate::error::Error;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

const PUBLIC_KEY_LEN: usize = 32;

/// Verifies request signatures against the application public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    public_key: Vec<u8>,
}

impl SignatureVerifier {
    /// Build from the hex key shown in the developer portal.
    pub fn from_hex(public_key: &str) -> Result<Self, Error> {
        let public_key = hex::decode(public_key.trim())
            .map_err(|e| Error::ConfigParse(format!("DISCORD_PUBLIC_KEY is not hex: {}", e)))?;
        if public_key.len() != PUBLIC_KEY_LEN {
            return Err(Error::ConfigParse(format!(
                "DISCORD_PUBLIC_KEY must be {} bytes, got {}",
                PUBLIC_KEY_LEN,
                public_key.len()
            )));
        }
        Ok(Self { public_key })
    }

    pub fn verify(&self, signature_hex: &str, timestamp: &str, body: &[u8]) -> bool {
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };
        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        UnparsedPublicKey::new(&ED25519, &self.public_key)
            .verify(&message, &signature)
            .is_ok()
    }
}
