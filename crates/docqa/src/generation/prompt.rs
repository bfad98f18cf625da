//! Prompt templates

/// Builds prompts sent to the model
pub struct PromptBuilder;

impl PromptBuilder {
    /// Context block, a blank line, then the question
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!("Context:\n{}\n\nQuestion: {}", context, question)
    }
}
