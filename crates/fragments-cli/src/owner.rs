//! Owner - email から owner ID を導出（境界層側）
//!
//! core は email を見ません。受け取るのは HMAC-SHA256 の hex だけです。

use anyhow::anyhow;
use fragments_core::OwnerId;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_HASH_SECRET: &str = "default-secret";

pub fn owner_from_email(email: &str, secret: &str) -> anyhow::Result<OwnerId> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| anyhow!("hmac key: {e}"))?;
    mac.update(email.as_bytes());
    Ok(OwnerId::new(hex::encode(mac.finalize().into_bytes())))
}
