//! Prompt templates for the generation endpoints and parsing of their output.

use crate::models::api::RegexResponse;

/// Separator the regex prompt asks the model to place between pattern and explanation.
pub const REGEX_SEPARATOR: &str = "|||";

/// Explanation returned when the model omits the separator.
pub const MISSING_EXPLANATION: &str = "AI did not provide an explanation.";

pub fn regex_prompt(description: &str) -> String {
    format!(
        "You are a regular expression expert. Based on the following description, generate a valid PCRE-compatible regex pattern. \
         Then, on a new line, provide a brief, step-by-step explanation of how the regex works. \
         Use '{REGEX_SEPARATOR}' as a separator between the regex and the explanation. \
         Respond with ONLY the regex, the separator, and the explanation. \
         Example: `^[a-zA-Z0-9]+$|||Asserts position at the start of the string. Matches one or more alphanumeric characters. Asserts position at the end.` \
         Description: \"{description}\""
    )
}

pub fn sql_prompt(schema: &str, description: &str) -> String {
    format!(
        "You are an expert SQL developer. Based on the provided database schema and the user's request, generate a single, valid SQL query. \
         The query should be formatted for PostgreSQL. \
         Do not add any explanation or markdown formatting like ```sql. Respond with ONLY the raw SQL query. \
         Schema:\n{schema}\n\nUser Request: \"{description}\""
    )
}

/// Split a model answer of the form `<regex>|||<explanation>`.
///
/// Only the first separator counts; both halves are trimmed. Without a
/// separator the whole answer is taken as the regex, untrimmed.
pub fn split_regex_response(text: &str) -> RegexResponse {
    match text.split_once(REGEX_SEPARATOR) {
        Some((regex, explanation)) => RegexResponse {
            regex: regex.trim().to_string(),
            explanation: explanation.trim().to_string(),
        },
        None => RegexResponse {
            regex: text.to_string(),
            explanation: MISSING_EXPLANATION.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_separator_and_trims() {
        let out = split_regex_response("^[0-9]+$|||digits only");
        assert_eq!(out.regex, "^[0-9]+$");
        assert_eq!(out.explanation, "digits only");

        let out = split_regex_response("  ^a$ |||\n starts and ends with a \n");
        assert_eq!(out.regex, "^a$");
        assert_eq!(out.explanation, "starts and ends with a");
    }

    #[test]
    fn only_first_separator_splits() {
        let out = split_regex_response("a|||b|||c");
        assert_eq!(out.regex, "a");
        assert_eq!(out.explanation, "b|||c");
    }

    #[test]
    fn missing_separator_falls_back() {
        let out = split_regex_response("abc");
        assert_eq!(out.regex, "abc");
        assert_eq!(out.explanation, MISSING_EXPLANATION);
    }

    #[test]
    fn prompts_embed_inputs() {
        let p = regex_prompt("email addresses");
        assert!(p.contains("Description: \"email addresses\""));
        assert!(p.contains("'|||'"));

        let p = sql_prompt("CREATE TABLE users (id int);", "count users");
        assert!(p.contains("Schema:\nCREATE TABLE users (id int);\n\n"));
        assert!(p.contains("User Request: \"count users\""));
        assert!(p.contains("PostgreSQL"));
    }
}
