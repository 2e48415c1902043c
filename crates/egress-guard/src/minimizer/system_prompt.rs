//! Stage 1 — system prompt filtering.
//!
//! Splits the prompt on `"## "` section headers and drops sections whose
//! header matches the internal routing registry, retaining the
//! introduction (text before the first header) and every other section.

/// Section headers that never need to leave the process: internal routing
/// instructions meaningful only to the agent loop, not to an external model.
pub const ROUTING_REGISTRY: &[&str] = &[
    "MANDATORY",
    "STOPPING CRITERIA",
    "GROUNDING RULES",
    "RESPONSE PATTERN",
];

struct Section<'a> {
    header: &'a str,
    body_lines: Vec<&'a str>,
}

fn header_matches_registry(header: &str, registry: &[&str]) -> bool {
    let normalized = header.trim().to_ascii_uppercase();
    registry
        .iter()
        .any(|entry| normalized.starts_with(&entry.to_ascii_uppercase()))
}

/// Filter out routing-registry sections from `prompt`, then collapse any
/// run of three or more blank lines down to two.
#[must_use]
pub fn filter_system_prompt(prompt: &str, registry: &[&str]) -> String {
    let mut lines = prompt.split('\n').peekable();
    let mut intro_lines: Vec<&str> = Vec::new();
    while let Some(line) = lines.peek() {
        if line.starts_with("## ") {
            break;
        }
        intro_lines.push(lines.next().unwrap());
    }

    let mut sections: Vec<Section> = Vec::new();
    while let Some(header_line) = lines.next() {
        let header = header_line.trim_start_matches("## ");
        let mut body_lines = Vec::new();
        while let Some(line) = lines.peek() {
            if line.starts_with("## ") {
                break;
            }
            body_lines.push(lines.next().unwrap());
        }
        sections.push(Section { header, body_lines });
    }

    let mut out_lines: Vec<String> = intro_lines.iter().map(|s| (*s).to_string()).collect();
    for section in sections {
        if header_matches_registry(section.header, registry) {
            continue;
        }
        out_lines.push(format!("## {}", section.header));
        out_lines.extend(section.body_lines.iter().map(|s| (*s).to_string()));
    }

    collapse_blank_runs(&out_lines.join("\n"))
}

/// Collapse runs of three or more consecutive blank lines to exactly two.
fn collapse_blank_runs(text: &str) -> String {
    let mut result: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= 2 {
                result.push("");
            }
        } else {
            blank_run = 0;
            result.push(line);
        }
    }
    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_intro_and_non_routing_sections() {
        let prompt = "You are an assistant.\n\n## Tools\nUse tools wisely.\n\n## MANDATORY\nInternal rule.";
        let filtered = filter_system_prompt(prompt, ROUTING_REGISTRY);
        assert!(filtered.contains("You are an assistant."));
        assert!(filtered.contains("## Tools"));
        assert!(filtered.contains("Use tools wisely."));
        assert!(!filtered.contains("## MANDATORY"));
        assert!(!filtered.contains("Internal rule."));
    }

    #[test]
    fn drops_every_registry_section() {
        let prompt = "\n## STOPPING CRITERIA\nstop here\n## GROUNDING RULES\nground here\n## RESPONSE PATTERN\npattern here\n## Visible\nkeep";
        let filtered = filter_system_prompt(prompt, ROUTING_REGISTRY);
        assert!(!filtered.contains("stop here"));
        assert!(!filtered.contains("ground here"));
        assert!(!filtered.contains("pattern here"));
        assert!(filtered.contains("## Visible"));
        assert!(filtered.contains("keep"));
    }

    #[test]
    fn no_headers_returns_prompt_unchanged_modulo_blank_collapse() {
        let prompt = "Just an intro with no sections.";
        assert_eq!(filter_system_prompt(prompt, ROUTING_REGISTRY), prompt);
    }

    #[test]
    fn collapses_three_or_more_blank_lines_to_two() {
        let prompt = "a\n\n\n\nb";
        let filtered = filter_system_prompt(prompt, ROUTING_REGISTRY);
        assert_eq!(filtered, "a\n\n\nb");
    }

    #[test]
    fn preserves_one_or_two_blank_lines() {
        let prompt = "a\n\nb\n\n\nc";
        let filtered = filter_system_prompt(prompt, ROUTING_REGISTRY);
        assert_eq!(filtered, "a\n\nb\n\n\nc");
    }
}
