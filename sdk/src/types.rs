//! Compiled agent requirements and related types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator placed between system message sections
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Everything a downstream LLM runtime needs to run a compiled agent.
///
/// Values are replaced, never mutated in place: every builder method consumes
/// `self` and returns the updated requirements, so a failed commitment can be
/// discarded while the previous value stays intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentModelRequirements {
    /// Assembled system message
    pub system_message: String,

    /// Model to run the agent with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    /// Tools advertised to the model
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,

    /// Plain URLs or inline `data:` references
    #[serde(default)]
    pub knowledge_sources: Vec<String>,

    /// Free-form metadata (agent name, image generator hint, META values)
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,

    /// MCP server references extracted from the source
    #[serde(default)]
    pub mcp_servers: Vec<String>,

    /// `None` means open by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,

    /// NOTE contents, never shown to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,

    /// Agent this one inherits from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_agent_url: Option<String>,

    /// Delegated teammates (resolved URLs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team: Vec<String>,

    /// Example interactions from SAMPLE commitments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,

    /// References merged through IMPORT
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

impl AgentModelRequirements {
    /// Fresh requirements for one compilation call
    pub fn basic(agent_name: &str) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "agentName".to_string(),
            serde_json::Value::String(agent_name.to_string()),
        );

        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Agent display name stored at creation
    pub fn agent_name(&self) -> Option<&str> {
        self.metadata.get("agentName").and_then(|v| v.as_str())
    }

    /// Append a section to the system message.
    ///
    /// Blank sections are ignored so the message never gains stray separators.
    pub fn with_system_section(mut self, section: &str) -> Self {
        let section = section.trim_end();
        if section.trim().is_empty() {
            return self;
        }
        if !self.system_message.is_empty() {
            self.system_message.push_str(SECTION_SEPARATOR);
        }
        self.system_message.push_str(section);
        self
    }

    /// Add a tool unless one with the same name is already present
    pub fn with_tool(mut self, tool: ToolDescriptor) -> Self {
        if !self.has_tool(&tool.name) {
            self.tools.push(tool);
        }
        self
    }

    /// Check whether a tool is advertised
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// Set a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Append a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.get_or_insert_with(Vec::new).push(note.into());
        self
    }

    /// Convert to a pretty JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Tool advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool arguments
    pub parameters: serde_json::Value,
}

impl ToolDescriptor {
    /// Create a new tool descriptor with an empty object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Add a string parameter to the schema
    pub fn with_string_param(
        mut self,
        key: &str,
        description: &str,
        required: bool,
    ) -> Self {
        if let Some(obj) = self.parameters.as_object_mut() {
            if let Some(props) = obj
                .entry("properties")
                .or_insert_with(|| serde_json::json!({}))
                .as_object_mut()
            {
                props.insert(
                    key.to_string(),
                    serde_json::json!({ "type": "string", "description": description }),
                );
            }
            if required {
                if let Some(list) = obj
                    .entry("required")
                    .or_insert_with(|| serde_json::json!([]))
                    .as_array_mut()
                {
                    list.push(serde_json::Value::String(key.to_string()));
                }
            }
        }
        self
    }
}

/// Model offered by the hosting runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModelInfo {
    /// Create a model entry without a description
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_stores_agent_name() {
        let req = AgentModelRequirements::basic("Paul");
        assert_eq!(req.agent_name(), Some("Paul"));
        assert!(req.system_message.is_empty());
        assert!(req.is_closed.is_none());
    }

    #[test]
    fn test_system_sections_are_separated() {
        let req = AgentModelRequirements::basic("A")
            .with_system_section("First")
            .with_system_section("   ")
            .with_system_section("Second\n");
        assert_eq!(req.system_message, "First\n\nSecond");
    }

    #[test]
    fn test_tools_are_deduplicated() {
        let req = AgentModelRequirements::basic("A")
            .with_tool(ToolDescriptor::new("web_search", "Search"))
            .with_tool(ToolDescriptor::new("web_search", "Search again"));
        assert_eq!(req.tools.len(), 1);
        assert_eq!(req.tools[0].description, "Search");
    }

    #[test]
    fn test_tool_schema_builder() {
        let tool = ToolDescriptor::new("web_search", "Search the web")
            .with_string_param("query", "Search query", true)
            .with_string_param("locale", "Locale", false);
        assert_eq!(tool.parameters["properties"]["query"]["type"], "string");
        assert_eq!(tool.parameters["required"], json!(["query"]));
    }

    #[test]
    fn test_notes_accumulate() {
        let req = AgentModelRequirements::basic("A")
            .with_note("one")
            .with_note("two");
        assert_eq!(req.notes, Some(vec!["one".to_string(), "two".to_string()]));
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut req = AgentModelRequirements::basic("A");
        req.parent_agent_url = Some("https://agents.example/parent".into());
        let value: serde_json::Value = serde_json::from_str(&req.to_json()).unwrap();
        assert_eq!(value["parentAgentUrl"], "https://agents.example/parent");
        assert_eq!(value["metadata"]["agentName"], "A");
        assert!(value.get("isClosed").is_none());
    }
}
