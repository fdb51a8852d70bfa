//! Trailing-comma policy for loop iterations

/// Finish one leaf-loop iteration's text
///
/// Trailing whitespace and one trailing comma are removed, then a comma is
/// appended unless this is the last iteration and the text closes a brace
/// block (at least as many `}` as `{`).
pub fn apply(text: &str, is_last: bool) -> String {
    let trimmed = text.trim_end();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);

    if is_last && closes_block(trimmed) {
        trimmed.to_string()
    } else {
        format!("{},", trimmed)
    }
}

fn closes_block(text: &str) -> bool {
    let closes = text.matches('}').count();
    closes > 0 && text.matches('{').count() <= closes
}

/// Drop one trailing comma from the last iteration of an outer loop
///
/// Whitespace after the comma is kept.
pub fn trim_last_comma(text: &str) -> String {
    let content = text.trim_end();
    match content.strip_suffix(',') {
        Some(head) => format!("{}{}", head, &text[content.len()..]),
        None => text.to_string(),
    }
}
