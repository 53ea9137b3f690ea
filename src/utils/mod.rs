pub fn sanitize_filename(filename: &str) -> String {
    // Remove or replace characters that are invalid in filenames
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '-',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Preset identifier derived from a display name: lowercase, spaces become
/// underscores, and only alphanumerics, `_` and `-` survive.
pub fn sanitize_preset_id(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

const PROGRESS_WIDTH: usize = 30;

/// Fixed-width bracketed progress line, e.g. `[#####-----] 3/10 abc123`.
pub fn progress_line(done: usize, total: usize, label: &str) -> String {
    let filled = if total == 0 {
        PROGRESS_WIDTH
    } else {
        (done.min(total) * PROGRESS_WIDTH) / total
    };
    format!(
        "[{}{}] {}/{} {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        done,
        total,
        label
    )
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("hello/world"), "hello-world");
        assert_eq!(sanitize_filename("test<>file"), "test__file");
        assert_eq!(sanitize_filename("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_sanitize_preset_id() {
        assert_eq!(sanitize_preset_id("My Preset!"), "my_preset");
        assert_eq!(sanitize_preset_id("  Summary + Keywords v2 "), "summary__keywords_v2");
        assert_eq!(sanitize_preset_id("founder-story"), "founder-story");
        assert_eq!(sanitize_preset_id("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_preset_id("!!!"), "");
    }

    #[test]
    fn test_progress_line() {
        let line = progress_line(1, 3, "abc");
        assert_eq!(line, format!("[{}{}] 1/3 abc", "#".repeat(10), "-".repeat(20)));
        assert!(progress_line(3, 3, "x").starts_with(&format!("[{}]", "#".repeat(30))));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
