//! Bracket- and quote-aware splitting of command lines.
//!
//! Commands embed SNBT, JSON and selector arguments, so a plain split on
//! spaces would cut `{Items:[{id:"a b"}]}` apart. The tokenizer only splits
//! on the separator when it is outside quotes and at bracket depth zero.

/// Result of a tokenizer run, with a flag for unbalanced input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    /// Tokens in input order.
    pub tokens: Vec<String>,
    /// `false` when the input ended inside a quote or with open brackets.
    pub balanced: bool,
}

/// Split `line` on `separator` outside quotes and `[ { (` nesting.
///
/// Double quotes are always honored; single quotes only when
/// `allow_single_quotes` is set. A quote only opens a quoted run where a
/// value can start (at the beginning of a token, after `:`, `=`, `,` or an
/// open bracket), so apostrophes in prose such as `say don't` stay literal.
/// Backslash escapes the next character inside a quoted run.
///
/// Never fails: unbalanced input keeps consuming separators into the last
/// token. A dangling separator at the end of the input is trimmed.
///
/// # Example
/// ```
/// let tokens = mapshift_core::tokenize::tokenize(
///     r#"fill ~ ~ ~ ~ ~ ~ minecraft:chest{Items:[{id:"a,b"}]}"#, ' ', true);
/// assert_eq!(tokens.len(), 8);
/// ```
pub fn tokenize(line: &str, separator: char, allow_single_quotes: bool) -> Vec<String> {
    split(line, separator, Quotes::from_flag(allow_single_quotes)).tokens
}

/// Like [`tokenize`], only tracking bracket balance (legacy selectors, whose
/// values may contain bare quote characters).
pub fn tokenize_without_quotes(line: &str, separator: char) -> Vec<String> {
    split(line, separator, Quotes::None).tokens
}

/// [`tokenize`] with a balance report.
pub fn tokenize_checked(line: &str, separator: char, allow_single_quotes: bool) -> Tokens {
    split(line, separator, Quotes::from_flag(allow_single_quotes))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quotes {
    None,
    Double,
    Both,
}

impl Quotes {
    fn from_flag(allow_single: bool) -> Self {
        if allow_single { Quotes::Both } else { Quotes::Double }
    }

    fn opens(self, c: char) -> bool {
        match self {
            Quotes::None => false,
            Quotes::Double => c == '"',
            Quotes::Both => c == '"' || c == '\'',
        }
    }
}

fn split(line: &str, separator: char, quotes: Quotes) -> Tokens {
    let line = line.strip_suffix(separator).unwrap_or(line);
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for c in line.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            prev = Some(c);
            continue;
        }
        if c == separator && depth == 0 {
            tokens.push(std::mem::take(&mut current));
            prev = None;
            continue;
        }
        match c {
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = depth.saturating_sub(1),
            _ if quotes.opens(c) && value_can_start(prev, separator) => quote = Some(c),
            _ => {}
        }
        current.push(c);
        prev = Some(c);
    }
    tokens.push(current);

    Tokens {
        tokens,
        balanced: depth == 0 && quote.is_none(),
    }
}

fn value_can_start(prev: Option<char>, separator: char) -> bool {
    match prev {
        None => true,
        Some(p) => p == separator || matches!(p, ':' | '=' | ',' | '[' | '{' | '(' | ' '),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_protect_separators() {
        let tokens = tokenize(r#"fill ~ ~ ~ ~ ~ ~ minecraft:chest{Items:[{id:"a,b"}]}"#, ' ', true);
        assert_eq!(tokens.len(), 8);
        assert_eq!(tokens[6], r#"minecraft:chest{Items:[{id:"a,b"}]}"#);
    }

    #[test]
    fn quoted_runs_protect_brackets() {
        let tokens = tokenize(r#"{a:"]",b:1},c"#, ',', true);
        assert_eq!(tokens, [r#"{a:"]",b:1}"#, "c"]);
    }

    #[test]
    fn escaped_quote_stays_inside_run() {
        let tokens = tokenize(r#"say "a \" b" c"#, ' ', true);
        assert_eq!(tokens, ["say", r#""a \" b""#, "c"]);
    }

    #[test]
    fn apostrophes_in_prose_are_literal() {
        let tokens = tokenize("say don't stop", ' ', true);
        assert_eq!(tokens, ["say", "don't", "stop"]);
    }

    #[test]
    fn single_quotes_only_when_enabled() {
        assert_eq!(tokenize("{a:'x,y'}", ',', true).len(), 1);
        assert_eq!(tokenize("'x,y'", ',', false), ["'x", "y'"]);
    }

    #[test]
    fn unbalanced_input_absorbs_remainder() {
        let report = tokenize_checked("give @p stone{a:[1 2 3", ' ', true);
        assert!(!report.balanced);
        assert_eq!(report.tokens, ["give", "@p", "stone{a:[1 2 3"]);
    }

    #[test]
    fn trailing_separator_is_trimmed() {
        assert_eq!(tokenize("kill @e ", ' ', true), ["kill", "@e"]);
        assert_eq!(tokenize("", ' ', true), [""]);
    }

    #[test]
    fn without_quotes_ignores_quote_characters() {
        let tokens = tokenize_without_quotes(r#"name="a,b",r=3"#, ',');
        assert_eq!(tokens, [r#"name="a"#, r#"b""#, "r=3"]);
    }
}
