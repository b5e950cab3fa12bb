//! Text formatting helpers for terminal output.

use colored::Colorize;

use crate::api::{Role, ThreadMessage};

/// Format a thread message for terminal display with role label and colors.
pub fn format_message(msg: &ThreadMessage) -> String {
    let body = msg.text().unwrap_or("(non-text content)");
    match msg.role {
        Role::User => format!("{}\n{}", "you:".green().bold(), body),
        Role::Assistant => format!("{}\n{}", "assistant:".cyan().bold(), render_markdown_lite(body)),
    }
}

/// Re-indents a JSON document for display.
///
/// Tool arguments arrive as a JSON-encoded string; when the model produced
/// something that isn't valid JSON, it is returned unchanged.
pub fn pretty_json(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| raw.to_string())
}

/// Minimal markdown renderer for terminal output.
/// Not a full parser. Handles the three most common patterns
/// in assistant output: bold, inline code, and fenced code blocks.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if let Some(lang) = line.strip_prefix("```") {
            if in_code_block {
                in_code_block = false;
                output.push('\n');
            } else {
                in_code_block = true;
                let lang = lang.trim();
                if !lang.is_empty() {
                    output.push_str(&format!("  {}\n", lang.dimmed()));
                }
            }
            continue;
        }

        if in_code_block {
            output.push_str(&format!("  {}\n", line.dimmed()));
            continue;
        }

        output.push_str(&render_inline(line));
        output.push('\n');
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut result = String::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**") {
                result.push_str(&after[..end].bold().to_string());
                rest = &after[end + 2..];
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix('`') {
            if let Some(end) = after.find('`') {
                result.push_str(&after[..end].dimmed().to_string());
                rest = &after[end + 1..];
                continue;
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            result.push(c);
        }
        rest = chars.as_str();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_json_reindents() {
        assert_eq!(pretty_json(r#"{"city":"Oslo"}"#), "{\n  \"city\": \"Oslo\"\n}");
    }

    #[test]
    fn test_pretty_json_passes_through_invalid() {
        assert_eq!(pretty_json("{not json"), "{not json");
        assert_eq!(pretty_json(""), "");
    }

    #[test]
    fn test_markdown_lite_plain_text_unchanged() {
        colored::control::set_override(false);
        assert_eq!(render_markdown_lite("hello\nworld"), "hello\nworld");
        assert_eq!(render_markdown_lite("a **b** `c` d"), "a b c d");
        assert_eq!(render_markdown_lite("unclosed **bold"), "unclosed **bold");
        assert_eq!(
            render_markdown_lite("```rust\nlet x = 1;\n```\nafter"),
            "  rust\n  let x = 1;\n\nafter"
        );
        assert_eq!(render_markdown_lite("héllo `ünï` ✓"), "héllo ünï ✓");
    }
}
