//! Default model selection
//!
//! Used only when a book does not name a model and the caller offers a list
//! of available models.

use async_trait::async_trait;
use folio_sdk::{EngineError, ModelInfo, ModelSelector};
use std::collections::HashSet;

/// Picks the model whose name or description shares the most words with the
/// system message, or the first model when nothing overlaps
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailableModelSelector;

#[async_trait]
impl ModelSelector for FirstAvailableModelSelector {
    async fn select_model(
        &self,
        system_message: &str,
        models: &[ModelInfo],
    ) -> Result<String, EngineError> {
        let persona = words(system_message);

        let mut best: Option<(&ModelInfo, usize)> = None;
        for model in models {
            let mut model_words = words(&model.name);
            if let Some(description) = &model.description {
                model_words.extend(words(description));
            }
            let score = model_words.intersection(&persona).count();
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((model, score));
            }
        }

        best.map(|(model, _)| model)
            .or_else(|| models.first())
            .map(|model| model.name.clone())
            .ok_or_else(|| EngineError::ModelSelection("no models available".to_string()))
    }
}

/// Lowercased words of three or more letters
fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}
