//! Tool commitments: USE TIME, USE SEARCH ENGINE, USE IMAGE GENERATOR, USE BROWSER
//!
//! Each adds one tool descriptor and an instruction line. Repeating a USE
//! commitment keeps a single tool; extra instructions are still appended.

use folio_sdk::{AgentModelRequirements, EngineError, ToolDescriptor};
use serde_json::Value;

pub const TIME_TOOL: &str = "get_current_time";
pub const SEARCH_TOOL: &str = "web_search";
pub const IMAGE_TOOL: &str = "generate_image";
pub const BROWSER_TOOL: &str = "fetch_url_content";

pub fn apply_use_time(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let tool = ToolDescriptor::new(TIME_TOOL, "Get the current date and time").with_string_param(
        "timezone",
        "IANA timezone name, for example Europe/Prague",
        false,
    );
    Ok(with_tool_and_instructions(
        requirements,
        tool,
        "You can use the `get_current_time` tool to find out the current date and time.",
        content,
    ))
}

pub fn apply_use_search_engine(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let tool = ToolDescriptor::new(SEARCH_TOOL, "Search the web for up-to-date information")
        .with_string_param("query", "Search query", true);
    Ok(with_tool_and_instructions(
        requirements,
        tool,
        "You can search the internet with the `web_search` tool when you need fresh information.",
        content,
    ))
}

/// The optional content is a style hint kept under `metadata.useImageGenerator`
pub fn apply_use_image_generator(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let tool = ToolDescriptor::new(IMAGE_TOOL, "Generate an image from a text prompt")
        .with_string_param("prompt", "Description of the image to generate", true);
    let hint = content.trim();
    let value = if hint.is_empty() {
        Value::Bool(true)
    } else {
        Value::String(hint.to_string())
    };

    let next = with_tool_and_instructions(
        requirements,
        tool,
        "You can create images with the `generate_image` tool.",
        "",
    );
    let next = if hint.is_empty() {
        next
    } else {
        next.with_system_section(&format!("Preferred image style: {}", hint))
    };
    Ok(next.with_metadata("useImageGenerator", value))
}

pub fn apply_use_browser(
    requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let tool = ToolDescriptor::new(BROWSER_TOOL, "Fetch the readable content of a web page")
        .with_string_param("url", "Absolute URL of the page", true);
    Ok(with_tool_and_instructions(
        requirements,
        tool,
        "You can read web pages with the `fetch_url_content` tool.",
        content,
    ))
}

fn with_tool_and_instructions(
    requirements: AgentModelRequirements,
    tool: ToolDescriptor,
    instruction: &str,
    extra: &str,
) -> AgentModelRequirements {
    let already_present = requirements.has_tool(&tool.name);
    let mut next = requirements.with_tool(tool);
    if !already_present {
        next = next.with_system_section(instruction);
    }
    next.with_system_section(extra.trim())
}
