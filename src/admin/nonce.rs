//! Request-forgery tokens for admin forms

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Seconds a token stays valid at most
const LIFETIME_SECS: i64 = 86_400;

/// Hex characters kept from the digest
const TOKEN_LEN: usize = 20;

/// Issues and checks tokens bound to an action and a user
///
/// Time is split into half-lifetime ticks; a token from the current or the
/// previous tick verifies.
#[derive(Debug, Clone)]
pub struct NonceIssuer {
    secret: String,
}

impl NonceIssuer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn create(&self, action: &str, user: &str) -> String {
        self.create_at(action, user, Utc::now())
    }

    pub fn verify(&self, action: &str, user: &str, token: Option<&str>) -> bool {
        self.verify_at(action, user, token, Utc::now())
    }

    pub fn create_at(&self, action: &str, user: &str, now: DateTime<Utc>) -> String {
        self.token_for_tick(action, user, tick(now))
    }

    pub fn verify_at(
        &self,
        action: &str,
        user: &str,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return false;
        };

        let current = tick(now);
        [current, current - 1]
            .into_iter()
            .any(|t| self.token_for_tick(action, user, t) == token)
    }

    fn token_for_tick(&self, action: &str, user: &str, tick: i64) -> String {
        let tick_bytes = tick.to_be_bytes();
        let parts: [&[u8]; 4] = [
            self.secret.as_bytes(),
            &tick_bytes,
            action.as_bytes(),
            user.as_bytes(),
        ];

        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part);
        }

        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>()[..TOKEN_LEN]
            .to_string()
    }
}

fn tick(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(LIFETIME_SECS / 2)
}
