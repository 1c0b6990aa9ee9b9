use std::sync::Arc;

use crate::llm::Generator;
use crate::prompt::build_review_prompt;

pub const EMPTY_CODE_MESSAGE: &str = "Error: Empty code submitted";

/// Review client. Failures come back as text, never as errors.
#[derive(Clone)]
pub struct Reviewer {
    generator: Arc<dyn Generator>,
}

impl Reviewer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub async fn review(&self, code: &str, language: &str) -> String {
        if code.trim().is_empty() {
            return EMPTY_CODE_MESSAGE.to_string();
        }

        let prompt = build_review_prompt(code, language);
        match self.generator.generate(&prompt).await {
            Ok(text) => {
                tracing::debug!(language, chars = text.len(), "review generated");
                text
            }
            Err(err) => {
                tracing::warn!(language, error = %err, "review generation failed");
                format!("Error analyzing code: {err}")
            }
        }
    }
}
