//! Post-processing of folded requirements
//!
//! Runs after the fold, in this order: MCP extraction, free-text append,
//! comment stripping. Comment stripping is always last.

use folio_sdk::AgentModelRequirements;
use regex::Regex;
use std::sync::LazyLock;

const FENCE: &str = "```";

static MCP_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^MCP[ \t]+(\S.*?)[ \t\r]*$").expect("mcp pattern is valid"));

/// `MCP <value>` references in the raw source, in order, without duplicates
pub fn extract_mcp_servers(source: &str) -> Vec<String> {
    let mut servers: Vec<String> = Vec::new();
    for cap in MCP_LINE_PATTERN.captures_iter(source) {
        if let Some(value) = cap.get(1) {
            let value = value.as_str().to_string();
            if !servers.contains(&value) {
                servers.push(value);
            }
        }
    }
    servers
}

/// Attach MCP servers found in `source`
pub fn apply_mcp_servers(
    mut requirements: AgentModelRequirements,
    source: &str,
) -> AgentModelRequirements {
    for server in extract_mcp_servers(source) {
        if !requirements.mcp_servers.contains(&server) {
            requirements.mcp_servers.push(server);
        }
    }
    requirements
}

/// Append leftover free text as one section, paragraphs separated by a
/// blank line. Fenced lines are kept verbatim. Nothing happens when every
/// line is blank.
pub fn append_free_text(
    requirements: AgentModelRequirements,
    lines: &[String],
) -> AgentModelRequirements {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in lines {
        if toggles_fence(line) {
            in_fence = !in_fence;
            current.push(line.trim_end());
        } else if in_fence {
            current.push(line);
        } else if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let text = paragraphs
        .iter()
        .map(|p| p.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n");

    requirements.with_system_section(text.trim())
}

/// Remove single-hash comment lines (`# ...`) outside fenced blocks.
///
/// `## headings` and `#hashtags` are kept. Leading blank lines are dropped
/// and runs of blank lines collapse to one. Applying it twice changes nothing.
pub fn strip_comment_lines(message: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in message.lines() {
        let trimmed = line.trim_start();
        if toggles_fence(line) {
            in_fence = !in_fence;
            kept.push(line);
            continue;
        }
        if in_fence {
            kept.push(line);
            continue;
        }
        if is_comment_line(trimmed) {
            continue;
        }
        if line.trim().is_empty() && kept.last().map_or(true, |prev| prev.trim().is_empty()) {
            continue;
        }
        kept.push(line);
    }

    kept.join("\n").trim_end().to_string()
}

/// A line with an odd number of fence markers opens or closes a block,
/// wherever on the line the marker sits
fn toggles_fence(line: &str) -> bool {
    line.matches(FENCE).count() % 2 == 1
}

fn is_comment_line(trimmed: &str) -> bool {
    match trimmed.strip_prefix('#') {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_mcp_servers() {
        let source = "Agent\nMCP https://mcp.example/a\nRULE x\nMCP  stdio:files  \nMCP https://mcp.example/a\n MCP indented";
        assert_eq!(
            extract_mcp_servers(source),
            vec!["https://mcp.example/a", "stdio:files"]
        );
    }

    #[test]
    fn test_bare_mcp_keyword_is_ignored() {
        assert!(extract_mcp_servers("Agent\nMCP\nMCPX foo").is_empty());
    }

    #[test]
    fn test_append_free_text() {
        let req = AgentModelRequirements::basic("Agent").with_system_section("Persona");
        let lines: Vec<String> = ["", "First line", "second line", "", "", "Next"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let req = append_free_text(req, &lines);
        assert_eq!(
            req.system_message,
            "Persona\n\nFirst line\nsecond line\n\nNext"
        );
    }

    #[test]
    fn test_blank_free_text_is_ignored() {
        let req = AgentModelRequirements::basic("Agent").with_system_section("Persona");
        let req = append_free_text(req, &["  ".to_string(), String::new()]);
        assert_eq!(req.system_message, "Persona");
    }

    #[test]
    fn test_strip_comment_lines() {
        let message = "Hello\n# internal note\n## Heading\n#hashtag\n#\nBye";
        assert_eq!(
            strip_comment_lines(message),
            "Hello\n## Heading\n#hashtag\nBye"
        );
    }

    #[test]
    fn test_strip_keeps_fenced_comments() {
        let message = "Run:\n```bash\n# install\nmake\n```\n  # indented comment";
        assert_eq!(
            strip_comment_lines(message),
            "Run:\n```bash\n# install\nmake\n```"
        );
    }

    #[test]
    fn test_strip_tracks_fence_after_prefix() {
        let message = "Rule: ```bash\n# install deps\nmake\n```\n\nHelpful\n# maintainer note";
        assert_eq!(
            strip_comment_lines(message),
            "Rule: ```bash\n# install deps\nmake\n```\n\nHelpful"
        );
    }

    #[test]
    fn test_inline_code_does_not_open_fence() {
        let message = "Use ```ls``` here\n# gone";
        assert_eq!(strip_comment_lines(message), "Use ```ls``` here");
    }

    #[test]
    fn test_fenced_free_text_is_verbatim() {
        let req = AgentModelRequirements::basic("Agent").with_system_section("x");
        let lines: Vec<String> = ["```", "a", "", "", "b", "```", "", "", "after"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let req = append_free_text(req, &lines);
        assert_eq!(req.system_message, "x\n\n```\na\n\n\nb\n```\n\nafter");
    }

    #[test]
    fn test_strip_collapses_blank_runs() {
        let message = "A\n\n# gone\n\nB";
        assert_eq!(strip_comment_lines(message), "A\n\nB");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let message = "A\n# x\n\n\n## y\n```\n# z\n\n\n```\n#q";
        let once = strip_comment_lines(message);
        assert_eq!(strip_comment_lines(&once), once);
    }
}
