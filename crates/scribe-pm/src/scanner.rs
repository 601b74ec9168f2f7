//! Comment stripping and token scanning for prompt templates.
//!
//! Template grammar:
//!
//! - Block comment: `/* ... */`, removed entirely, may span lines. An
//!   unterminated `/*` runs to the end of the input.
//! - Variable token: `{{name param1 param2}}`. The body runs from `{{` to the
//!   first `}`, which must be followed by a second `}`.
//! - Function call: a token whose trimmed body is `name(args)`, with `name`
//!   made of word characters and `args` free of `)`.
//!
//! Scanning happens once, over the comment-stripped text. Substitution
//! replaces segments in place, so resolver output is never scanned again.

use std::borrow::Cow;

const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";
const TOKEN_OPEN: &str = "{{";
const TOKEN_CLOSE: &str = "}}";

/// Removes every `/* ... */` block comment from `text`.
///
/// Characters around a comment, including whitespace, are left untouched.
///
/// # Examples
///
/// ```
/// use scribe_pm::scanner::strip_comments;
///
/// assert_eq!(strip_comments("a /* note\nmore */b"), "a b");
/// assert_eq!(strip_comments("keep /* open"), "keep ");
/// ```
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    if !text.contains(COMMENT_OPEN) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(COMMENT_OPEN) {
        out.push_str(&rest[..open]);
        let body = &rest[open + COMMENT_OPEN.len()..];
        match body.find(COMMENT_CLOSE) {
            Some(close) => rest = &body[close + COMMENT_CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// A piece of a scanned template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text, copied to the output as is.
    Text(&'a str),

    /// A function-style token, `{{name(args)}}`.
    Call {
        /// The whole token including braces.
        raw: &'a str,
        name: &'a str,
        /// Argument text, trimmed.
        args: &'a str,
    },

    /// A plain variable token, `{{name params...}}`.
    Variable {
        /// The whole token including braces.
        raw: &'a str,
        name: &'a str,
        params: Vec<&'a str>,
    },

    /// Text produced by a resolver. Never scanned again.
    Resolved(String),
}

impl Segment<'_> {
    /// Text this segment contributes to the rendered output.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Call { raw, .. } | Segment::Variable { raw, .. } => raw,
            Segment::Resolved(text) => text,
        }
    }
}

/// Splits comment-stripped text into literal text and tokens, left to right.
///
/// A `{{` that does not open a well-formed token stays literal text.
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(TOKEN_OPEN) {
        let open = cursor + offset;
        let body_start = open + TOKEN_OPEN.len();

        match token_body_end(&text[body_start..]) {
            Some(body_len) => {
                if literal_start < open {
                    segments.push(Segment::Text(&text[literal_start..open]));
                }
                let body = &text[body_start..body_start + body_len];
                let end = body_start + body_len + TOKEN_CLOSE.len();
                segments.push(classify(&text[open..end], body));
                literal_start = end;
                cursor = end;
            }
            // Not a token; a later `{{` may still open one.
            None => cursor = open + 1,
        }
    }

    if literal_start < text.len() {
        segments.push(Segment::Text(&text[literal_start..]));
    }

    segments
}

/// Concatenates segments back into a string.
pub fn render(segments: &[Segment<'_>]) -> String {
    segments.iter().map(Segment::as_str).collect()
}

/// Length of a token body: up to the first `}`, which must start `}}`.
fn token_body_end(after_open: &str) -> Option<usize> {
    let close = after_open.find('}')?;
    if close == 0 || !after_open[close..].starts_with(TOKEN_CLOSE) {
        return None;
    }
    Some(close)
}

fn classify<'a>(raw: &'a str, body: &'a str) -> Segment<'a> {
    let trimmed = body.trim();

    if let Some((name, args)) = parse_call(trimmed) {
        return Segment::Call { raw, name, args };
    }

    let mut words = trimmed.split_whitespace();
    let name = words.next().unwrap_or("");
    Segment::Variable {
        raw,
        name,
        params: words.collect(),
    }
}

/// Parses `name(args)`; `name` is word characters only, no `)` inside `args`.
fn parse_call(body: &str) -> Option<(&str, &str)> {
    let open = body.find('(')?;
    let name = &body[..open];
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let inner = body[open + 1..].strip_suffix(')')?;
    if inner.contains(')') {
        return None;
    }

    Some((name, inner.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_single_comment() {
        assert_eq!(strip_comments("Hello /* hidden */world"), "Hello world");
    }

    #[test]
    fn test_strip_multiline_and_multiple_comments() {
        let text = "a/* one\ntwo\n*/b /*x*/c";
        assert_eq!(strip_comments(text), "ab c");
    }

    #[test]
    fn test_strip_is_non_greedy() {
        assert_eq!(strip_comments("/* a */ keep /* b */"), " keep ");
    }

    #[test]
    fn test_strip_unterminated_runs_to_end() {
        assert_eq!(strip_comments("before /* never closed\nstill"), "before ");
    }

    #[test]
    fn test_strip_without_comments_borrows() {
        assert!(matches!(strip_comments("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_content_independent() {
        for inner in ["", "{{pov}}", "line\nline", "/* nested start", "**"] {
            let text = format!("x/*{inner}*/y");
            assert_eq!(strip_comments(&text), "xy", "comment body: {inner:?}");
        }
    }

    #[test]
    fn test_scan_text_only() {
        assert_eq!(scan("no tokens"), vec![Segment::Text("no tokens")]);
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_scan_variable_with_params() {
        let segments = scan("A {{ character Mara Vell }} B");
        assert_eq!(
            segments,
            vec![
                Segment::Text("A "),
                Segment::Variable {
                    raw: "{{ character Mara Vell }}",
                    name: "character",
                    params: vec!["Mara", "Vell"],
                },
                Segment::Text(" B"),
            ]
        );
    }

    #[test]
    fn test_scan_function_call() {
        let segments = scan("{{previous_words( 25 )}}");
        assert_eq!(
            segments,
            vec![Segment::Call {
                raw: "{{previous_words( 25 )}}",
                name: "previous_words",
                args: "25",
            }]
        );
    }

    #[test]
    fn test_scan_malformed_call_is_variable() {
        let segments = scan("{{a(b)(c)}}");
        assert!(matches!(segments[0], Segment::Variable { name: "a(b)(c)", .. }));

        let segments = scan("{{my-fn(1)}}");
        assert!(matches!(segments[0], Segment::Variable { .. }));
    }

    #[test]
    fn test_scan_unclosed_braces_stay_literal() {
        assert_eq!(render(&scan("{{open and {{pov} x")), "{{open and {{pov} x");
        assert!(scan("{{open and {{pov} x")
            .iter()
            .all(|s| matches!(s, Segment::Text(_))));
        assert!(matches!(scan("{{}}")[0], Segment::Text("{{}}")));
    }

    #[test]
    fn test_scan_resumes_after_broken_token() {
        let segments = scan("{{x} {{pov}}");
        assert_eq!(segments[0], Segment::Text("{{x} "));
        assert!(matches!(segments[1], Segment::Variable { name: "pov", .. }));
    }

    #[test]
    fn test_scan_extra_open_brace_joins_body() {
        let segments = scan("{{{pov}}");
        assert!(matches!(segments[0], Segment::Variable { name: "{pov", .. }));
    }

    #[test]
    fn test_scan_adjacent_tokens() {
        let segments = scan("{{a}}{{b}}");
        assert_eq!(segments.len(), 2);
        assert!(matches!(segments[1], Segment::Variable { name: "b", .. }));
    }

    #[test]
    fn test_render_round_trips_unresolved() {
        let text = "x {{pov}} y {{previous_words(3)}} z";
        assert_eq!(render(&scan(text)), text);
    }
}
