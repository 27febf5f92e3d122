/// Squash runs of blank lines down to one, leaving fenced code blocks and
/// quote blocks untouched.
pub fn strip_multiple_newlines(text: &str) -> String {
    let mut result = String::new();
    let mut in_code_block = false;
    let mut in_quote_block = false;
    let mut consecutive_newlines = 0;

    for line in text.lines() {
        if line.trim().starts_with("```") {
            in_code_block = !in_code_block;
            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(line);
            consecutive_newlines = 0;
            continue;
        }

        if line.trim().starts_with('>') {
            in_quote_block = true;
        } else if in_quote_block && !line.trim().is_empty() {
            in_quote_block = false;
        }

        if line.trim().is_empty() {
            if in_code_block || in_quote_block {
                result.push('\n');
            } else {
                consecutive_newlines += 1;
                if consecutive_newlines <= 1 {
                    result.push('\n');
                }
            }
        } else {
            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(line);
            consecutive_newlines = 0;
        }
    }

    result
}

/// First `max_chars` characters of `text`, with "..." appended when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_multiple_newlines() {
        let text = "a\n\n\n\nb\n\n\nc";
        assert_eq!(strip_multiple_newlines(text), "a\n\nb\n\nc");
    }

    #[test]
    fn test_code_block_preserved() {
        let text = "```\nx\n\n\ny\n```";
        assert_eq!(strip_multiple_newlines(text), text);
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 200), "short");
        assert_eq!(excerpt("abcdef", 3), "abc...");
        assert_eq!(excerpt("héllo", 2), "hé...");
        assert_eq!(excerpt("abc", 3), "abc");
    }
}
