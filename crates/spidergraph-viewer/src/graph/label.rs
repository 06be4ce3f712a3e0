/// Longest display label in characters before an ellipsis is appended.
pub const MAX_DISPLAY_CHARS: usize = 18;

/// Short on-canvas label: last path segment, without `(..)` or `[..]`
/// annotations, whitespace collapsed, capped at [`MAX_DISPLAY_CHARS`].
pub fn display_label(full: &str) -> String {
    let trimmed = full.trim();
    let stem = trimmed.trim_end_matches(['/', '\\']);
    let base = stem.rsplit(['/', '\\']).next().unwrap_or(stem);
    let base = if base.is_empty() { trimmed } else { base };

    let stripped = strip_enclosed(&strip_enclosed(base, '(', ')'), '[', ']');
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_DISPLAY_CHARS {
        let mut out: String = collapsed.chars().take(MAX_DISPLAY_CHARS).collect();
        out.push('…');
        out
    } else {
        collapsed
    }
}

// Unterminated openers are kept as-is.
fn strip_enclosed(s: &str, open: char, close: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find(open) {
        let Some(len) = rest[start..].find(close) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push(' ');
        rest = &rest[start + len + close.len_utf8()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_path_and_annotations() {
        assert_eq!(display_label("docs/guide/intro.md"), "intro.md");
        assert_eq!(display_label(r"src\core\lib.rs"), "lib.rs");
        assert_eq!(display_label("Parser (v2) [draft]"), "Parser");
        assert_eq!(display_label("  many   spaces  "), "many spaces");
    }

    #[test]
    fn directory_labels_keep_their_name() {
        assert_eq!(display_label("specs/"), "specs");
        assert_eq!(display_label("specs/modules/"), "modules");
    }

    #[test]
    fn long_labels_are_capped_with_ellipsis() {
        let out = display_label("a_really_long_module_name.rs");
        assert_eq!(out.chars().count(), MAX_DISPLAY_CHARS + 1);
        assert!(out.ends_with('…'));
        assert!(out.starts_with("a_really_long_modu"));
    }

    #[test]
    fn unterminated_brackets_survive() {
        assert_eq!(display_label("weird (name"), "weird (name");
    }
}
