/// Default line prefix for comment blocks in `.http` scripts
pub const DEFAULT_COMMENT_PREFIX: &str = "# ";

/// Prefix every line of `text` with `prefix`.
///
/// Absent or empty text yields the bare prefix so that a comment slot is
/// always present in the output. The result carries no trailing newline;
/// callers terminate the block. Occurrences of the prefix inside `text` are
/// passed through untouched.
pub fn format_comment(text: Option<&str>, prefix: &str) -> String {
    let text = match text {
        Some(text) if !text.is_empty() => text,
        _ => return prefix.to_string(),
    };

    text.split('\n')
        .map(|line| format!("{}{}", prefix, line.trim_end_matches('\r')))
        .collect::<Vec<_>>()
        .join("\n")
}
