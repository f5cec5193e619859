//! Shared HTTP helpers: client construction and bounded body reads.

use std::error::Error as StdError;

use reqwest::redirect::Policy;

/// Upper bound on UTF-8 bytes per character, used to size body reads.
const MAX_UTF8_CHAR_LEN: usize = 4;

/// Redirect hops followed before giving up, matching reqwest's default.
const MAX_REDIRECTS: usize = 10;

/// Build the HTTP client shared by every target in a run.
///
/// No client-wide timeout is set; each trigger enforces its own deadline.
/// Redirects are followed only within the original origin, since the auth
/// header travels with every hop.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(same_origin_redirects())
        .build()
}

/// Follow redirects that keep scheme, host and port; stop on anything else.
///
/// A stopped redirect hands the 3xx response back to the caller, where it
/// is classified like any other non-2xx status.
fn same_origin_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let same_origin = attempt
            .previous()
            .first()
            .is_some_and(|origin| origin.origin() == attempt.url().origin());
        if same_origin {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

/// Read at most `max_chars` characters of a response body.
///
/// Stops pulling chunks once enough bytes are buffered to cover
/// `max_chars` characters, so a large or endless body is never read in
/// full. Invalid UTF-8 is replaced rather than rejected.
pub async fn read_body_snippet(
    mut response: reqwest::Response,
    max_chars: usize,
) -> Result<String, reqwest::Error> {
    let byte_budget = max_chars.saturating_mul(MAX_UTF8_CHAR_LEN);
    let mut buf: Vec<u8> = Vec::new();

    while buf.len() < byte_budget {
        match response.chunk().await? {
            Some(chunk) => buf.extend_from_slice(&chunk),
            None => break,
        }
    }

    Ok(truncate_chars(&String::from_utf8_lossy(&buf), max_chars))
}

/// Keep the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Render an error together with its chain of sources.
///
/// `reqwest` keeps the useful part (DNS failure, refused connection,
/// certificate problem) in the source chain, not the top-level message.
pub fn describe_error(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Inner;

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "é".repeat(600);
        let cut = truncate_chars(&text, 500);
        assert_eq!(cut.chars().count(), 500);
        assert_eq!(cut.len(), 1000);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_chars("short", 500), "short");
    }

    #[test]
    fn describe_error_includes_source_chain() {
        assert_eq!(describe_error(&Outer(Inner)), "outer: connection refused");
    }

    #[test]
    fn build_client_does_not_fail() {
        assert!(build_client().is_ok());
    }
}
