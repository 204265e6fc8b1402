//! Static catalog of the models a session can use.

use std::sync::OnceLock;

use echochat_types::model::{AiModel, DEFAULT_MODEL_ID};

static CATALOG: OnceLock<Vec<AiModel>> = OnceLock::new();

fn model(id: &str, name: &str, description: &str, context_length: u32, tag: &str) -> AiModel {
    AiModel {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        context_length: Some(context_length),
        tags: vec![tag.to_string()],
    }
}

/// All models the client offers, default first.
pub fn available_models() -> &'static [AiModel] {
    CATALOG.get_or_init(|| {
        vec![
            model(
                DEFAULT_MODEL_ID,
                "Llama 3",
                "General purpose model with strong reasoning capabilities",
                8192,
                "general",
            ),
            model(
                "mistral",
                "Mistral",
                "Balanced performance for general tasks",
                4096,
                "general",
            ),
            model(
                "codellama",
                "CodeLlama",
                "Specialized for coding tasks and technical questions",
                16384,
                "code",
            ),
        ]
    })
}

/// Look up a catalog entry by id.
pub fn model_by_id(model_id: &str) -> Option<&'static AiModel> {
    available_models().iter().find(|m| m.id == model_id)
}

/// The catalog default model.
pub fn default_model() -> &'static AiModel {
    &available_models()[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_is_first_entry() {
        assert_eq!(default_model().id, DEFAULT_MODEL_ID);
        assert_eq!(default_model().context_length, Some(8192));
    }

    #[test]
    fn test_model_by_id() {
        assert_eq!(model_by_id("codellama").unwrap().name, "CodeLlama");
        assert!(model_by_id("gpt-17").is_none());
    }

    #[test]
    fn test_catalog_ids_unique() {
        let models = available_models();
        for (i, a) in models.iter().enumerate() {
            assert!(models[i + 1..].iter().all(|b| b.id != a.id));
        }
    }
}
