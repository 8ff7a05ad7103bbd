//! Fixed instruction prefix sent with every question.

/// Role and directives for the assistant.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert electrical engineer assistant. Your role is to provide accurate, \
helpful, and safe information about electrical systems, components, and best practices.

When answering questions:
1. Always prioritize safety
2. Provide technical details when relevant
3. Include warnings about potential hazards
4. Recommend consulting licensed professionals for complex issues";

/// Builds the full prompt for `question`.
///
/// The question is inserted verbatim; no length checks or escaping.
pub fn build_prompt(question: &str) -> String {
    format!("{SYSTEM_INSTRUCTION}\n\nQuestion: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_starts_with_instruction_and_ends_with_question() {
        let prompt = build_prompt("What gauge wire for a 20A circuit?");

        assert!(prompt.starts_with("You are an expert electrical engineer assistant."));
        assert!(prompt.contains("1. Always prioritize safety"));
        assert!(prompt.ends_with("Question: What gauge wire for a 20A circuit?"));
    }
}
