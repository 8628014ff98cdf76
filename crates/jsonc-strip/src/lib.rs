//! JSONC preprocessing for hand-maintained guide and table files.
//!
//! Supports:
//! - `//` line comments
//! - `/* ... */` block comments
//! - trailing commas before `}` or `]`
//! - string literal preservation (including escapes)

/// Strip `//` and `/* */` comments from JSONC input.
///
/// Correctly handles escaped quotes inside strings and comment-like sequences
/// embedded in string literals. Line structure is kept so that `serde_json`
/// error positions still point at the original line.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0usize;
    let mut in_str = false;

    while i < len {
        let c = chars[i];

        if in_str {
            out.push(c);
            if c == '\\' && i + 1 < len {
                i += 1;
                out.push(chars[i]);
            } else if c == '"' {
                in_str = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_str = true;
            out.push(c);
            i += 1;
            continue;
        }

        if c == '/' && i + 1 < len {
            match chars[i + 1] {
                '/' => {
                    i += 2;
                    while i < len && chars[i] != '\n' {
                        i += 1;
                    }
                    continue;
                }
                '*' => {
                    i += 2;
                    while i + 1 < len && !(chars[i] == '*' && chars[i + 1] == '/') {
                        if chars[i] == '\n' {
                            out.push('\n');
                        }
                        i += 1;
                    }
                    i = (i + 2).min(len);
                    continue;
                }
                _ => {}
            }
        }

        out.push(c);
        i += 1;
    }
    out
}

/// Remove commas that directly precede a closing `}` or `]` (ignoring
/// whitespace). Expects comment-free input, see [`strip_jsonc`].
#[must_use]
pub fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_str = false;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if in_str {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                i += 1;
                out.push(chars[i]);
            } else if c == '"' {
                in_str = false;
            }
            i += 1;
            continue;
        }
        if c == '"' {
            in_str = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Full JSONC preprocessing: comments first, then trailing commas.
#[must_use]
pub fn to_json(input: &str) -> String {
    strip_trailing_commas(&strip_jsonc(input))
}

#[cfg(test)]
mod tests {
    use super::{strip_jsonc, strip_trailing_commas, to_json};

    #[test]
    fn strips_line_and_block_comments() {
        let input = r#"
{
  // comment
  "a": 1, /* inline */ "b": 2
}
"#;
        let stripped = strip_jsonc(input);
        assert!(!stripped.contains("comment"));
        assert!(!stripped.contains("inline"));
        assert!(stripped.contains("\"a\": 1"));
        assert!(stripped.contains("\"b\": 2"));
    }

    #[test]
    fn preserves_comment_like_text_in_strings() {
        let input = r#"{ "cmd": "say //not a comment", "nbt":"{a:\"/*x*/\"}" }"#;
        let stripped = strip_jsonc(input);
        assert!(stripped.contains("say //not a comment"));
        assert!(stripped.contains(r#"{a:\"/*x*/\"}"#));
    }

    #[test]
    fn block_comment_keeps_line_count() {
        let input = "{\n/* one\ntwo\nthree */\n\"a\": 1}";
        assert_eq!(strip_jsonc(input).lines().count(), input.lines().count());
    }

    #[test]
    fn trailing_commas_removed_outside_strings() {
        let input = r#"{"a": [1, 2, ], "b": "x,]", }"#;
        let out = strip_trailing_commas(input);
        assert_eq!(out, r#"{"a": [1, 2 ], "b": "x,]" }"#);
    }

    #[test]
    fn to_json_parses_with_serde() {
        let input = "{\n  \"give\": [\"a\", \"b\",], // root\n}";
        let json = to_json(input);
        assert!(json.starts_with('{'));
        assert!(!json.contains("root"));
        assert!(!json.contains(",]"));
    }
}
