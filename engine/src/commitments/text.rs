//! Text commitments
//!
//! PERSONA, RULE, NOTE, GOAL, STYLE, SAMPLE, MODEL, META and INITIAL MESSAGE.
//! Content is kept verbatim, fenced code blocks included.

use folio_sdk::{AgentModelRequirements, EngineError};
use serde_json::Value;

pub fn apply_persona(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let persona = non_empty("PERSONA", content)?;
    Ok(requirements.with_system_section(persona))
}

pub fn apply_rule(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let rule = non_empty("RULE", content)?;
    Ok(requirements.with_system_section(&format!("Rule: {}", rule)))
}

/// Notes are for humans reading the book; they never reach the system message
pub fn apply_note(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let note = content.trim();
    if note.is_empty() {
        return Ok(requirements);
    }
    Ok(requirements.with_note(note))
}

pub fn apply_goal(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let goal = non_empty("GOAL", content)?;
    Ok(requirements.with_system_section(&format!("Goal: {}", goal)))
}

pub fn apply_style(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let style = non_empty("STYLE", content)?;
    Ok(requirements.with_system_section(&format!("Style: {}", style)))
}

pub fn apply_sample(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let sample = non_empty("SAMPLE", content)?;
    let mut next = requirements.with_system_section(&format!("Example interaction:\n{}", sample));
    next.samples.push(sample.to_string());
    Ok(next)
}

pub fn apply_model(
    mut requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let model = non_empty("MODEL", content)?;
    if model.contains(char::is_whitespace) {
        return Err(EngineError::commitment(
            "MODEL",
            format!("model name must be a single token, got '{}'", model),
        ));
    }
    requirements.model_name = Some(model.to_string());
    Ok(requirements)
}

/// `META <KEY> <value>` stores `metadata[<camelCased key>] = value`
pub fn apply_meta(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let content = non_empty("META", content)?;
    let (key, value) = match content.split_once(char::is_whitespace) {
        Some((key, value)) => (key, value.trim()),
        None => (content, ""),
    };
    if value.is_empty() {
        return Err(EngineError::commitment(
            "META",
            format!("META {} has no value", key),
        ));
    }
    Ok(requirements.with_metadata(meta_key(key), Value::String(value.to_string())))
}

pub fn apply_initial_message(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let message = non_empty("INITIAL MESSAGE", content)?;
    Ok(requirements.with_metadata("initialMessage", Value::String(message.to_string())))
}

/// `IMAGE` -> `image`, `DISPLAY_NAME` / `display-name` -> `displayName`
fn meta_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut upper_next = false;
    for c in raw.chars() {
        if c == '_' || c == '-' {
            upper_next = !key.is_empty();
            continue;
        }
        if upper_next {
            key.extend(c.to_uppercase());
            upper_next = false;
        } else {
            key.extend(c.to_lowercase());
        }
    }
    key
}

fn non_empty<'a>(commitment: &str, content: &'a str) -> Result<&'a str, EngineError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(EngineError::commitment(commitment, "content is empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AgentModelRequirements {
        AgentModelRequirements::basic("Agent")
    }

    #[test]
    fn test_persona_is_verbatim() {
        let req = apply_persona(base(), "A friendly librarian.").unwrap();
        assert_eq!(req.system_message, "A friendly librarian.");
    }

    #[test]
    fn test_empty_persona_fails() {
        let err = apply_persona(base(), "   ").unwrap_err();
        assert!(matches!(err, EngineError::Commitment { .. }));
    }

    #[test]
    fn test_rule_keeps_fenced_code() {
        let content = "Answer in this format:\n```json\n{\"ok\": true}\n```";
        let req = apply_rule(base(), content).unwrap();
        assert!(req.system_message.starts_with("Rule: Answer in this format:"));
        assert!(req.system_message.contains("```json\n{\"ok\": true}\n```"));
    }

    #[test]
    fn test_note_does_not_touch_system_message() {
        let req = apply_note(base(), "Remember to update pricing").unwrap();
        assert!(req.system_message.is_empty());
        assert_eq!(req.notes, Some(vec!["Remember to update pricing".to_string()]));
    }

    #[test]
    fn test_empty_note_is_noop() {
        let req = apply_note(base(), "").unwrap();
        assert!(req.notes.is_none());
    }

    #[test]
    fn test_sample_records_example() {
        let req = apply_sample(base(), "User: hi\nAgent: hello").unwrap();
        assert_eq!(req.samples, vec!["User: hi\nAgent: hello".to_string()]);
        assert!(req.system_message.starts_with("Example interaction:\n"));
    }

    #[test]
    fn test_model_sets_name() {
        let req = apply_model(base(), " gpt-4o ").unwrap();
        assert_eq!(req.model_name.as_deref(), Some("gpt-4o"));
        assert!(apply_model(base(), "two words").is_err());
        assert!(apply_model(base(), "").is_err());
    }

    #[test]
    fn test_meta_keys() {
        let req = apply_meta(base(), "IMAGE https://example.com/a.png").unwrap();
        assert_eq!(req.metadata["image"], "https://example.com/a.png");

        let req = apply_meta(base(), "DISPLAY_NAME Dr. Paul").unwrap();
        assert_eq!(req.metadata["displayName"], "Dr. Paul");

        assert!(apply_meta(base(), "LINK").is_err());
    }

    #[test]
    fn test_initial_message() {
        let req = apply_initial_message(base(), "Hello! How can I help?").unwrap();
        assert_eq!(req.metadata["initialMessage"], "Hello! How can I help?");
    }
}
