use crate::error::ValidationError;
use crate::history::MAX_DESCRIPTION_CHARS;

/// Strip markup and control characters from a free-text description.
///
/// Anything between `<` and the next `>` is dropped, as are unmatched angle
/// brackets. Tabs and newlines become spaces; other control characters are
/// removed. Surrounding whitespace is trimmed.
pub fn sanitize_description(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                let rest = chars.as_str();
                if let Some(end) = rest.find('>') {
                    chars = rest[end + 1..].chars();
                }
            }
            '>' => {}
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.trim().to_string()
}

/// Sanitize and enforce the description length limit.
pub fn clean_description(raw: &str) -> Result<String, ValidationError> {
    let cleaned = sanitize_description(raw);
    let len = cleaned.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::TooLong {
            field: "description",
            max: MAX_DESCRIPTION_CHARS,
            len,
        });
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        assert_eq!(
            sanitize_description("<b>write</b> the <script>alert(1)</script>report"),
            "write the alert(1)report"
        );
    }

    #[test]
    fn drops_unmatched_brackets() {
        assert_eq!(sanitize_description("a < b"), "a  b");
        assert_eq!(sanitize_description("x > y"), "x  y");
    }

    #[test]
    fn control_characters() {
        assert_eq!(sanitize_description("line\none\u{7}"), "line one");
        assert_eq!(sanitize_description("  padded\t"), "padded");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(sanitize_description("Revisão do capítulo 3"), "Revisão do capítulo 3");
        assert_eq!(sanitize_description(""), "");
    }

    #[test]
    fn length_is_checked_after_sanitizing() {
        let padded = format!("<p>{}</p>", "a".repeat(100));
        assert_eq!(clean_description(&padded).unwrap().len(), 100);

        assert!(matches!(
            clean_description(&"b".repeat(101)),
            Err(ValidationError::TooLong { len: 101, .. })
        ));
    }
}
