//! Canonicalization of user-supplied YouTube video references.
//!
//! Accepted inputs are a bare video id, a short link (`https://youtu.be/<id>`)
//! or a watch URL (`https://www.youtube.com/watch?v=<id>`). Anything else that
//! carries a scheme is passed through untouched.

use url::Url;

const WATCH_URL_BASE: &str = "https://www.youtube.com/watch";
const SHORT_HOSTS: [&str; 2] = ["youtu.be", "www.youtu.be"];
const WATCH_HOSTS: [&str; 2] = ["www.youtube.com", "youtube.com"];

/// Canonical long-form watch URL for `value`.
///
/// Returns an empty string for blank input. Normalizing an already canonical
/// URL yields the same URL. The id is form-encoded into the `v` parameter, so
/// a bare id holding `&`, `#` or `+` survives a second pass unchanged.
pub fn normalize_video_url(value: &str) -> String {
    let raw = value.trim();
    if raw.is_empty() {
        return String::new();
    }
    if !has_scheme(raw) {
        return watch_url(raw);
    }
    match recognized_video_id(raw) {
        Some(id) => watch_url(&id),
        None => raw.to_string(),
    }
}

/// Bare video id for `value`, used as a batch output filename stem.
///
/// Unrecognized URLs come back as the trimmed input.
pub fn extract_video_id(value: &str) -> String {
    let raw = value.trim();
    if raw.is_empty() || !has_scheme(raw) {
        return raw.to_string();
    }
    recognized_video_id(raw).unwrap_or_else(|| raw.to_string())
}

fn has_scheme(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn watch_url(id: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("v", id)
        .finish();
    format!("{}?{}", WATCH_URL_BASE, query)
}

fn recognized_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;

    let id = if SHORT_HOSTS.contains(&host) {
        url.path().trim_start_matches('/').to_string()
    } else if WATCH_HOSTS.contains(&host) {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else {
        return None;
    };

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalent_forms_normalize_alike() {
        let expected = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        for input in [
            "dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "  https://www.youtube.com/watch?v=dQw4w9WgXcQ\n",
        ] {
            assert_eq!(normalize_video_url(input), expected, "input: {input:?}");
            assert_eq!(extract_video_id(input), "dQw4w9WgXcQ", "input: {input:?}");
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://vimeo.com/123456",
            "https://www.youtube.com/playlist?list=PL123",
            "",
        ] {
            let once = normalize_video_url(input);
            assert_eq!(normalize_video_url(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_reserved_characters_in_bare_id_are_encoded() {
        for input in ["a&b", "a#b", "a+b"] {
            let once = normalize_video_url(input);
            assert!(once.starts_with("https://www.youtube.com/watch?v=a%"), "{once}");
            assert_eq!(normalize_video_url(&once), once, "input: {input:?}");
            assert_eq!(extract_video_id(&once), input);
        }
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize_video_url("   "), "");
        assert_eq!(extract_video_id("   "), "");
    }

    #[test]
    fn test_unrecognized_urls_pass_through() {
        assert_eq!(
            normalize_video_url("https://vimeo.com/123456"),
            "https://vimeo.com/123456"
        );
        assert_eq!(
            extract_video_id(" https://vimeo.com/123456 "),
            "https://vimeo.com/123456"
        );

        // Watch host without a `v` parameter
        let playlist = "https://www.youtube.com/playlist?list=PL123";
        assert_eq!(normalize_video_url(playlist), playlist);
        assert_eq!(extract_video_id(playlist), playlist);
    }
}
