//! JSON repair primitives for free-text generator output.
//!
//! Generator output is untrusted: it may be fenced, prefixed with prose,
//! followed by commentary, or cut off mid-object. The scanner below is a
//! small state machine over bytes (outside a string / inside a string /
//! after a backslash) with a depth counter, so braces inside string values
//! never affect nesting.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```(?:json)?\s*").expect("code fence pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InString,
    Escaped,
}

/// Removes every ```json / ``` fence marker and trims the result.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text.trim(), "").trim().to_string()
}

/// Given `start` pointing at an `open` delimiter, returns the exclusive end
/// index of its matching `close`, or `None` when the group is unterminated.
pub fn find_matching_close(text: &str, start: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&open) {
        return None;
    }

    let mut state = ScanState::Outside;
    let mut depth = 0usize;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        state = match state {
            ScanState::Escaped => ScanState::InString,
            ScanState::InString => match byte {
                b'\\' => ScanState::Escaped,
                b'"' => ScanState::Outside,
                _ => ScanState::InString,
            },
            ScanState::Outside => {
                if byte == b'"' {
                    ScanState::InString
                } else {
                    if byte == open {
                        depth += 1;
                    } else if byte == close {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return Some(start + offset + 1);
                        }
                    }
                    ScanState::Outside
                }
            }
        };
    }

    None
}

/// Locates the first `{` and cuts at its matching `}`, discarding trailing
/// text. An unterminated object is returned from `{` to the end so a strict
/// parse fails loudly and reconstruction can take over.
pub fn isolate_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    match find_matching_close(text, start, b'{', b'}') {
        Some(end) => Some(&text[start..end]),
        None => Some(&text[start..]),
    }
}

/// Returns every complete top-level `{...}` group in `body`, in order.
/// A trailing, unterminated object is dropped.
pub fn complete_objects(body: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut cursor = 0usize;

    while let Some(relative) = next_object_start(&body[cursor..]) {
        let start = cursor + relative;
        match find_matching_close(body, start, b'{', b'}') {
            Some(end) => {
                objects.push(&body[start..end]);
                cursor = end;
            }
            None => break,
        }
    }

    objects
}

/// Finds the next `{` that is not inside a string literal.
fn next_object_start(text: &str) -> Option<usize> {
    let mut state = ScanState::Outside;
    for (index, &byte) in text.as_bytes().iter().enumerate() {
        state = match (state, byte) {
            (ScanState::Escaped, _) => ScanState::InString,
            (ScanState::InString, b'\\') => ScanState::Escaped,
            (ScanState::InString, b'"') => ScanState::Outside,
            (ScanState::InString, _) => ScanState::InString,
            (ScanState::Outside, b'"') => ScanState::InString,
            (ScanState::Outside, b'{') => return Some(index),
            (ScanState::Outside, _) => ScanState::Outside,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_isolate_discards_prefix_and_trailing_text() {
        let input = "Here you go: {\"a\": {\"b\": 1}} Let me know!";
        assert_eq!(isolate_json_object(input), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_isolate_ignores_braces_inside_strings() {
        let input = r#"{"title": "Use {braces} and \"quotes\" }", "n": 1} tail"#;
        assert_eq!(
            isolate_json_object(input),
            Some(r#"{"title": "Use {braces} and \"quotes\" }", "n": 1}"#)
        );
    }

    #[test]
    fn test_isolate_unterminated_returns_rest() {
        let input = "noise {\"title\":\"X\",\"steps\":[{\"title\":\"A\"";
        assert_eq!(
            isolate_json_object(input),
            Some("{\"title\":\"X\",\"steps\":[{\"title\":\"A\"")
        );
    }

    #[test]
    fn test_isolate_without_object() {
        assert_eq!(isolate_json_object("no json here"), None);
    }

    #[test]
    fn test_find_matching_close_for_arrays() {
        let input = r#"[{"s": "]"}, [1, 2]] rest"#;
        let end = find_matching_close(input, 0, b'[', b']').unwrap();
        assert_eq!(&input[..end], r#"[{"s": "]"}, [1, 2]]"#);
    }

    #[test]
    fn test_complete_objects_drops_truncated_tail() {
        let body = r#"{"title": "A"}, {"title": "B {x}"}, {"title": "C"#;
        assert_eq!(
            complete_objects(body),
            vec![r#"{"title": "A"}"#, r#"{"title": "B {x}"}"#]
        );
    }
}
