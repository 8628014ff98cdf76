//! Issue splicing: deferred rewrites applied once a line is migrated.

use crate::context::Issue;
use crate::tokenize::tokenize;

/// Apply `issues` to the migrated `output` (one or more lines).
pub(crate) fn splice(output: &str, issues: &[Issue]) -> String {
    if issues.is_empty() {
        return output.to_string();
    }
    let mut lines: Vec<String> = Vec::new();
    for line in output.lines() {
        lines.push(line.to_string());
        for issue in issues {
            if let Some(extra) = safe_read(line, issue) {
                tracing::debug!(line = %extra, "spliced safe read");
                lines.push(extra);
            }
        }
    }
    lines.join("\n")
}

/// For `execute <prefix> store result score H O run data get <source> <path>`
/// reading a path that may now be absent, the line that stores the old
/// implicit value: `execute <prefix> unless data <source> <path> run
/// scoreboard players set H O <default>`.
fn safe_read(line: &str, issue: &Issue) -> Option<String> {
    let Issue::DefaultedNbtRead { source, path, default } = issue;
    let (indent, body) = split_indent(line);
    let (dollar, body) = match body.strip_prefix('$') {
        Some(rest) => ("$", rest),
        None => ("", body),
    };
    let tokens = tokenize(body, ' ', true);
    if tokens.first().map(String::as_str) != Some("execute") {
        return None;
    }
    let store = tokens
        .windows(3)
        .position(|w| w[0] == "store" && w[1] == "result" && w[2] == "score")?;
    let run = tokens.iter().position(|t| t == "run")?;
    if run < store + 5 {
        return None;
    }
    let tail = &tokens[run + 1..];
    // `data get <kind> <target...> <path>`; block targets span three tokens.
    let source = tokenize(source, ' ', true);
    let at = 2 + source.len();
    if tail.len() <= at
        || tail[0] != "data"
        || tail[1] != "get"
        || tail[2..at] != source[..]
        || tail[at] != *path
    {
        return None;
    }
    let holder = &tokens[store + 3];
    let objective = &tokens[store + 4];
    let mut out: Vec<&str> = vec!["execute"];
    out.extend(tokens[1..store].iter().map(String::as_str));
    out.extend(tokens[store + 5..run].iter().map(String::as_str));
    out.extend(["unless", "data"]);
    out.extend(tail[2..=at].iter().map(String::as_str));
    out.extend(["run", "scoreboard", "players", "set", holder.as_str(), objective.as_str(), default.as_str()]);
    Some(format!("{indent}{dollar}{}", out.join(" ")))
}

fn split_indent(line: &str) -> (&str, &str) {
    let body = line.trim_start();
    (&line[..line.len() - body.len()], body)
}
