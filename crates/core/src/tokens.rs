//! Anti-forgery tokens for the refresh endpoint.
//!
//! A token is the HMAC-SHA256 of the action name and the current time tick.
//! A tick lasts half the configured lifetime and a token is accepted during
//! its own tick and the next one, so a token stays valid for between half
//! and the full lifetime.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::Timestamp;

/// Action name bound into refresh tokens.
pub const REFRESH_ACTION: &str = "quotes_widget_refresh";

/// Default token lifetime (one day).
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 86_400;

type HmacSha256 = Hmac<Sha256>;

/// Issues and verifies refresh tokens with a server-side secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
    lifetime_secs: i64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Lifetimes under two seconds are raised to two.
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            lifetime_secs: lifetime_secs.max(2),
        }
    }

    pub fn issue(&self, action: &str, now: Timestamp) -> String {
        self.sign(action, self.tick(now))
    }

    pub fn verify(&self, token: &str, action: &str, now: Timestamp) -> bool {
        let tick = self.tick(now);
        [tick, tick - 1]
            .iter()
            .any(|t| constant_time_eq(token.as_bytes(), self.sign(action, *t).as_bytes()))
    }

    fn tick(&self, now: Timestamp) -> i64 {
        now.timestamp().div_euclid(self.lifetime_secs / 2)
    }

    fn sign(&self, action: &str, tick: i64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(format!("{tick}|{action}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
