//! Stage 3 — per-message minimization: turn compression for messages older
//! than the history window, and in-window trimming (tool-result truncation,
//! filesystem-path redaction) for the rest.

use egress_llm::{Message, MessageRole};

use super::estimate::estimate_text_tokens;

const PREVIEW_CHARS: usize = 100;
const FS_PREFIXES: &[&str] = &["/Users/", "/home/", "/var/", "/tmp/", "/opt/"];
const PROJECT_ROOT_MARKERS: &[&str] = &["GolandProjects/", "Projects/", "workspace/", "repos/"];

/// Apply stage 3 to a copied slice of messages: everything older than
/// `history_window` turns from the end is compressed to a surrogate; the
/// rest is trimmed in place. Returns the new message vector plus the
/// number of tool results truncated for exceeding `max_tool_result_tokens`.
#[must_use]
pub fn minimize_messages(
    messages: &[Message],
    history_window: usize,
    max_tool_result_tokens: usize,
    can_receive_fs_info: bool,
) -> (Vec<Message>, usize) {
    let total = messages.len();
    let window_start = total.saturating_sub(history_window);
    let mut truncated = 0usize;

    let out = messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            if i < window_start && message.role != MessageRole::System {
                compress_turn(message)
            } else {
                trim_in_window(message, max_tool_result_tokens, can_receive_fs_info, &mut truncated)
            }
        })
        .collect();

    (out, truncated)
}

fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => content[..byte_idx].to_string(),
        None => content.to_string(),
    }
}

/// Replace a message older than the history window with a role-preserving
/// compressed surrogate.
fn compress_turn(message: &Message) -> Message {
    let content = match message.role {
        MessageRole::User => format!(
            "[Previous turn: user said: {}]",
            preview(&message.content, PREVIEW_CHARS)
        ),
        MessageRole::Assistant => {
            if message.tool_calls.is_empty() {
                format!(
                    "[Previous turn: assistant said: {}]",
                    preview(&message.content, PREVIEW_CHARS)
                )
            } else {
                let names: Vec<&str> = message.tool_calls.iter().map(|c| c.name.as_str()).collect();
                format!("[Previous turn: assistant used tools: {}]", names.join(", "))
            }
        },
        MessageRole::Tool => {
            if message.tool_results.is_empty() {
                "[Previous turn: tool results]".to_string()
            } else {
                let ids: Vec<&str> = message
                    .tool_results
                    .iter()
                    .map(|r| r.call_id.as_str())
                    .collect();
                format!("[Previous turn: tool results for: {}]", ids.join(", "))
            }
        },
        MessageRole::System => return message.clone(),
    };

    Message {
        role: message.role,
        content,
        tool_calls: Vec::new(),
        tool_results: Vec::new(),
    }
}

/// Trim a message that falls inside the history window: truncate
/// oversized tool results and (when the provider may not receive
/// filesystem info) redact absolute paths.
fn trim_in_window(
    message: &Message,
    max_tool_result_tokens: usize,
    can_receive_fs_info: bool,
    truncated: &mut usize,
) -> Message {
    let mut out = message.clone();

    if !out.tool_results.is_empty() && (max_tool_result_tokens > 0 || !can_receive_fs_info) {
        for result in &mut out.tool_results {
            if max_tool_result_tokens > 0 {
                let before = estimate_text_tokens(&result.content);
                if before > max_tool_result_tokens {
                    result.content = truncate_tool_result(&result.content, max_tool_result_tokens);
                    *truncated += 1;
                }
            }
            if !can_receive_fs_info {
                result.content = redact_fs_paths(&result.content);
            }
        }
    }

    if !can_receive_fs_info {
        out.content = redact_fs_paths(&out.content);
    }

    out
}

fn truncate_tool_result(content: &str, max_tokens: usize) -> String {
    let char_budget = max_tokens * 4;
    let original_tokens = estimate_text_tokens(content);
    let omitted = original_tokens.saturating_sub(max_tokens);
    let truncated = match content.char_indices().nth(char_budget) {
        Some((byte_idx, _)) => &content[..byte_idx],
        None => content,
    };
    format!("{truncated}\n[TRUNCATED: ~{omitted} tokens omitted]")
}

fn is_path_terminator(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(ch, '"' | '\'' | '(' | ')' | '[' | ']' | '{' | '}' | ';' | ',' | '>')
}

/// Rewrite every recognized absolute filesystem path token in `text` to a
/// relative form, e.g. `/Users/alice/Projects/foo/bar.rs` -> `./foo/bar.rs`.
#[must_use]
pub fn redact_fs_paths(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut i = 0usize;

    'outer: while i < text.len() {
        for prefix in FS_PREFIXES {
            if text[i..].starts_with(prefix) {
                let rest = &text[i..];
                let end = rest
                    .char_indices()
                    .skip(1)
                    .find(|(_, ch)| is_path_terminator(*ch))
                    .map_or(rest.len(), |(idx, _)| idx);
                let token = &rest[..end];
                result.push_str(&rewrite_path_token(token));
                i += end;
                continue 'outer;
            }
        }
        let ch = text[i..].chars().next().expect("i < text.len()");
        result.push(ch);
        i += ch.len_utf8();
    }

    result
}

fn rewrite_path_token(token: &str) -> String {
    for marker in PROJECT_ROOT_MARKERS {
        if let Some(pos) = token.find(marker) {
            let tail = &token[pos + marker.len()..];
            return format!("./{tail}");
        }
    }

    let parts: Vec<&str> = token.split('/').collect();
    if parts.len() > 3 {
        format!("./{}", parts[3..].join("/"))
    } else if let Some(last) = parts.last() {
        format!("./{last}")
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egress_llm::{ToolCall, ToolResult};

    #[test]
    fn history_window_with_exact_count_compresses_nothing() {
        let messages: Vec<Message> = (0..3).map(|i| Message::user(format!("turn {i}"))).collect();
        let (out, truncated) = minimize_messages(&messages, 3, 0, true);
        assert_eq!(out, messages);
        assert_eq!(truncated, 0);
    }

    #[test]
    fn older_user_turns_compress_to_preview_surrogate() {
        let messages = vec![
            Message::user("old message"),
            Message::user("recent message"),
        ];
        let (out, _) = minimize_messages(&messages, 1, 0, true);
        assert!(out[0].content.starts_with("[Previous turn: user said:"));
        assert_eq!(out[1].content, "recent message");
    }

    #[test]
    fn older_assistant_tool_call_turn_compresses_to_tool_names() {
        let messages = vec![
            Message::assistant_tool_calls(vec![
                ToolCall::new("id-1", "search"),
                ToolCall::new("id-2", "fetch"),
            ]),
            Message::user("next"),
        ];
        let (out, _) = minimize_messages(&messages, 1, 0, true);
        assert_eq!(
            out[0].content,
            "[Previous turn: assistant used tools: search, fetch]"
        );
    }

    #[test]
    fn system_turns_are_never_compressed() {
        let messages = vec![
            Message::system("you are an assistant"),
            Message::user("a"),
            Message::user("b"),
        ];
        let (out, _) = minimize_messages(&messages, 1, 0, true);
        assert_eq!(out[0].content, "you are an assistant");
    }

    #[test]
    fn tool_result_at_exactly_the_cap_is_not_truncated() {
        let content = "x".repeat(40); // 10 tokens at 4 chars/token
        let messages = vec![Message::tool_results(vec![ToolResult::success(
            "id-1", content,
        )])];
        let (out, truncated) = minimize_messages(&messages, 5, 10, true);
        assert_eq!(truncated, 0);
        assert_eq!(out[0].tool_results[0].content.len(), 40);
    }

    #[test]
    fn tool_result_over_the_cap_is_truncated_with_marker() {
        let content = "x".repeat(400); // 100 tokens
        let messages = vec![Message::tool_results(vec![ToolResult::success(
            "id-1", content,
        )])];
        let (out, truncated) = minimize_messages(&messages, 5, 10, true);
        assert_eq!(truncated, 1);
        assert!(out[0].tool_results[0].content.contains("[TRUNCATED: ~90 tokens omitted]"));
    }

    #[test]
    fn truncation_duplicates_tool_result_slice_without_mutating_caller() {
        let content = "x".repeat(400);
        let original = vec![Message::tool_results(vec![ToolResult::success(
            "id-1",
            content.clone(),
        )])];
        let (_, _) = minimize_messages(&original, 5, 10, true);
        assert_eq!(original[0].tool_results[0].content, content);
    }

    #[test]
    fn fs_paths_rewritten_under_project_root_marker() {
        let text = "see /Users/alice/GolandProjects/foo/bar.rs for details";
        let redacted = redact_fs_paths(text);
        assert_eq!(redacted, "see ./foo/bar.rs for details");
    }

    #[test]
    fn fs_paths_fallback_strips_two_leading_segments() {
        let text = "open /home/bob/scratch/note.txt now";
        let redacted = redact_fs_paths(text);
        assert_eq!(redacted, "open ./scratch/note.txt now");
    }

    #[test]
    fn fs_paths_untouched_when_provider_can_receive_them() {
        let messages = vec![Message::user("/Users/alice/secret.txt")];
        let (out, _) = minimize_messages(&messages, 5, 0, true);
        assert_eq!(out[0].content, "/Users/alice/secret.txt");
    }

    #[test]
    fn fs_paths_redacted_in_message_content_when_forbidden() {
        let messages = vec![Message::user("/Users/alice/secret.txt")];
        let (out, _) = minimize_messages(&messages, 5, 0, false);
        assert_eq!(out[0].content, "./secret.txt");
    }
}
