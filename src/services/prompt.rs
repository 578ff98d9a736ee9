//! Prompt template for Chinese -> English translation

const PREAMBLE: &str = "You are a professional translator who specializes in translating \
Chinese to natural, authentic American English.";

const REQUIREMENTS: [&str; 6] = [
    "Provide 3-5 different translation options",
    "Translations must be natural and authentic, but not overly casual or artificial",
    "If applicable, include commonly used slang with a note",
    "If there are differences in usage context (formal/informal) or audience, please indicate",
    "Format: Each translation on a new line, followed by context notes in parentheses if needed",
    "Do not include explanations or numbering, only the translations and optional notes",
];

/// Build the completion prompt for `text`, optionally steering it with `context`.
///
/// A blank context is treated the same as no context.
pub fn build_prompt(text: &str, context: Option<&str>) -> String {
    let mut prompt = String::with_capacity(1024 + text.len());
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\nRequirements:\n");

    for (i, requirement) in REQUIREMENTS.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, requirement));
    }

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!(
            "{}. IMPORTANT: The translation should be appropriate for the context: {}\n",
            REQUIREMENTS.len() + 1,
            context
        ));
    }

    prompt.push_str(&format!("\nChinese: {}\nEnglish:", text));
    prompt
}
