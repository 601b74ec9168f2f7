//! Blank line cleanup for resolved messages.

/// Collapses runs of blank lines and trims the message.
///
/// Any stretch of whitespace holding three or more newlines is reduced to a
/// single blank line: the characters from its first newline to its last are
/// replaced by `"\n\n"`. Whitespace before the first newline and after the
/// last one is kept. The result is then trimmed. Running it twice changes
/// nothing.
///
/// # Examples
///
/// ```
/// use scribe_pm::whitespace::normalize;
///
/// assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
/// assert_eq!(normalize("  a\n \n\t\n  b  "), "a\n\n  b");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !c.is_whitespace() {
            out.push(c);
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }

        push_run(&mut out, &text[start..end]);
    }

    out.trim().to_string()
}

fn push_run(out: &mut String, run: &str) {
    if run.matches('\n').count() < 3 {
        out.push_str(run);
        return;
    }

    // Both exist: the run holds at least three newlines.
    let first = run.find('\n').unwrap_or(0);
    let last = run.rfind('\n').unwrap_or(run.len() - 1);
    out.push_str(&run[..first]);
    out.push_str("\n\n");
    out.push_str(&run[last + 1..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_three_or_more_newlines() {
        assert_eq!(normalize("a\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_keeps_single_blank_line() {
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\nb"), "a\nb");
    }

    #[test]
    fn test_whitespace_only_lines_count_as_blank() {
        assert_eq!(normalize("a\n   \n\t\nb"), "a\n\nb");
    }

    #[test]
    fn test_keeps_indent_after_collapsed_run() {
        assert_eq!(normalize("a  \n\n\n    b"), "a  \n\n    b");
    }

    #[test]
    fn test_trims_message() {
        assert_eq!(normalize("\n\n  Hello !  \n"), "Hello !");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "a\n\n\n\nb\n \n \n c",
            "  lead\n\n\n\ttrail  ",
            "x\r\n\r\n\r\ny",
            "plain",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample: {sample:?}");
        }
    }
}
