use std::sync::Arc;
use press_core::{Error, GenerativeModel, Result};
use crate::Config;

pub mod dummy;
pub mod gemini;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;

/// Builds the generative backend named on the command line.
pub fn create_model(name: &str, config: Config) -> Result<Arc<dyn GenerativeModel>> {
    match name.to_lowercase().as_str() {
        "gemini" => {
            let model = GeminiModel::new(config)?;
            tracing::info!("🧠 Using Gemini model {}", model.text_model());
            Ok(Arc::new(model))
        }
        "dummy" => {
            tracing::info!("🧠 Using offline dummy model");
            Ok(Arc::new(DummyModel::new()))
        }
        other => Err(Error::Inference(format!(
            "Unknown model: {}. Available models: gemini, dummy",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model() {
        let model = create_model("dummy", Config::default()).unwrap();
        assert_eq!(model.name(), "Dummy");

        let model = create_model("Gemini", Config::default().with_api_key("test-key")).unwrap();
        assert_eq!(model.name(), "Gemini");

        let err = create_model("ollama", Config::default()).unwrap_err();
        assert!(err.to_string().contains("Unknown model: ollama"));
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let err = create_model("gemini", Config::default()).unwrap_err();
        assert!(err.to_string().contains("API key is required"));
    }
}
