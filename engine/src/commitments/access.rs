//! CLOSED / OPEN
//!
//! Content is ignored. The terminal placement rule for CLOSED lives in the
//! fold engine, not here.

use folio_sdk::{AgentModelRequirements, EngineError};

pub fn apply_closed(
    mut requirements: AgentModelRequirements,
    _content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    requirements.is_closed = Some(true);
    Ok(requirements)
}

pub fn apply_open(
    mut requirements: AgentModelRequirements,
    _content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    requirements.is_closed = Some(false);
    Ok(requirements)
}
