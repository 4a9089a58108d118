//! Detection of anti-automation pages served in place of real content.
//!
//! YouTube answers throttled clients with a 200 and an HTML interstitial, so
//! the body has to be inspected. Update [`SIGNATURES`] when the markup moves.

use crate::{Result, TranscriptError};

/// Markers that only appear on CAPTCHA, "sorry" and consent interstitials
pub const SIGNATURES: &[&str] = &[
    "class=\"g-recaptcha\"",
    "/sorry/index",
    "action=\"https://consent.youtube.com/s\"",
];

pub fn is_rate_limited(body: &str) -> bool {
    SIGNATURES.iter().any(|signature| body.contains(signature))
}

/// Fail with [`TranscriptError::RateLimited`] when `body` is an interstitial
pub fn ensure_not_rate_limited(body: &str, context: &str) -> Result<()> {
    if is_rate_limited(body) {
        tracing::warn!("Rate limit interstitial received for {}", context);
        return Err(TranscriptError::RateLimited(context.to_string()));
    }
    Ok(())
}
