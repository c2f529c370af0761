//! Gravatar avatar URLs.
//!
//! The URL embeds the MD5 hex digest of the email bytes as given; no
//! trimming or case folding is applied, so the same email string always
//! maps to the same avatar.

use md5::{Digest, Md5};

const GRAVATAR_BASE_URL: &str = "http://www.gravatar.com/avatar/";

/// Builds the Gravatar URL for `email` at `size` pixels, using the
/// "mystery man" fallback image.
pub fn gravatar_url(email: &str, size: u32) -> String {
    format!(
        "{GRAVATAR_BASE_URL}{}?d=mm&s={size}",
        email_hash(email)
    )
}

fn email_hash(email: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(email.as_bytes());
    format!("{:x}", hasher.finalize())
}
