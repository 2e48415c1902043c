//! Stage 2 — tool-definition filtering, driven by the tool-choice directive.

use egress_llm::{ToolChoice, ToolDefinition};

/// Select which tool definitions to emit for a given tool-choice directive.
///
/// - `None` (the directive) -> no tools are emitted.
/// - `Tool(name)` -> only the matching tool; if no tool matches, all tools
///   are retained (the caller's directive is undeliverable, but the
///   minimizer favors a working request over a strictly-correct empty one).
/// - `Auto`, `Any`, or an absent directive -> every tool is retained.
#[must_use]
pub fn filter_tools(tools: &[ToolDefinition], tool_choice: Option<&ToolChoice>) -> Vec<ToolDefinition> {
    match tool_choice {
        Some(ToolChoice::None) => Vec::new(),
        Some(ToolChoice::Tool(name)) => {
            let matched: Vec<ToolDefinition> =
                tools.iter().filter(|t| &t.name == name).cloned().collect();
            if matched.is_empty() {
                tools.to_vec()
            } else {
                matched
            }
        },
        Some(ToolChoice::Auto | ToolChoice::Any) | None => tools.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> Vec<ToolDefinition> {
        vec![ToolDefinition::new("search"), ToolDefinition::new("fetch")]
    }

    #[test]
    fn none_directive_emits_no_tools() {
        assert!(filter_tools(&tools(), Some(&ToolChoice::None)).is_empty());
    }

    #[test]
    fn auto_and_any_and_absent_emit_all() {
        assert_eq!(filter_tools(&tools(), Some(&ToolChoice::Auto)).len(), 2);
        assert_eq!(filter_tools(&tools(), Some(&ToolChoice::Any)).len(), 2);
        assert_eq!(filter_tools(&tools(), None).len(), 2);
    }

    #[test]
    fn forced_tool_emits_only_the_match() {
        let filtered = filter_tools(&tools(), Some(&ToolChoice::Tool("search".to_string())));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "search");
    }

    #[test]
    fn forced_tool_with_no_match_retains_all() {
        let filtered = filter_tools(&tools(), Some(&ToolChoice::Tool("missing".to_string())));
        assert_eq!(filtered.len(), 2);
    }
}
