//! System prompt assembly and response post-processing.

use crate::core::dataset::{Message, Role};

/// Separator between previous user messages in the context block.
const CONTEXT_SEPARATOR: &str = "\n---\n";

/// At most this many earlier user messages are given as context.
const MAX_CONTEXT_MESSAGES: usize = 3;

/// Marker the model is asked to put before its final answer.
const ANSWER_MARKER: &str = "# Improved answer";

const CONTEXT_HEADER: &str = "\nHere I will give you the previous user messages as context:\n";

const SYSTEM_TEMPLATE: &str = "I will give you an answer, fix it. First, reason about the errors and the improvements \
you would make, based on the instruction. Then, fix the errors and improve the answer.\n\n\
Please use correct grammar, punctuation, and capitalization. If you find that the used \
lexicon is not appropriate, please change it to something more suitable.\n\
Do the best you can to make the answer sound natural and fluent. Always use $$ for block \
math and $ for inline math, and write using GitHub Markdown syntax.\
Always answer in Italian.\n\n\
Do the best fix possible, as you will be evaluated on the quality of your work.\n\n\
If you are not sure about the answer, please leave it as it is.{user_messages}\n\n\
Here is the question being answered:\n{question}\n\n\
Instruction to follow while editing:\n{instruction}\n\n\
You should use the following format:\n\
```markdown\n\
## Reasoning\n\
[reasoning on errors and possible improvements]\n\n\
## Improved answer\n\
[improved answer in Italian]\n\
```";

/// Earlier user messages as a context block: every user message except the last
/// (the question itself), first three kept, each followed by `---`.
/// Empty when there is nothing before the question.
pub fn context_block(conversation: &[Message]) -> String {
    let mut user_messages: Vec<&str> = conversation
        .iter()
        .filter(|m| m.role() == Role::User)
        .map(Message::content)
        .collect();
    user_messages.pop();
    user_messages.truncate(MAX_CONTEXT_MESSAGES);
    if user_messages.is_empty() {
        return String::new();
    }
    format!("{}\n---", user_messages.join(CONTEXT_SEPARATOR))
}

/// Fill the system template. Substitution is single pass, so braces inside the
/// inserted texts are left alone.
pub fn system_prompt(question: &str, instruction: &str, context: &str) -> String {
    let user_messages = if context.is_empty() {
        String::new()
    } else {
        format!("{}{}", CONTEXT_HEADER, context)
    };
    let mut out = String::with_capacity(SYSTEM_TEMPLATE.len() + question.len() + context.len());
    let mut rest = SYSTEM_TEMPLATE;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let (value, consumed) = if after.starts_with("{user_messages}") {
            (user_messages.as_str(), "{user_messages}".len())
        } else if after.starts_with("{question}") {
            (question, "{question}".len())
        } else if after.starts_with("{instruction}") {
            (instruction, "{instruction}".len())
        } else {
            ("{", 1)
        };
        out.push_str(value);
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

/// Keep only what follows the "Improved answer" heading, without surrounding
/// whitespace or code fence backticks. Without the heading, the trimmed text.
pub fn extract_answer(text: &str) -> String {
    let mut sections = text.split(ANSWER_MARKER);
    let _reasoning = sections.next();
    match sections.next() {
        Some(answer) => answer.trim().trim_matches('`').trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Vec<Message> {
        vec![
            Message::new(Role::User, "a"),
            Message::new(Role::Assistant, "b"),
            Message::new(Role::User, "c"),
            Message::new(Role::Assistant, "d"),
            Message::new(Role::User, "e"),
        ]
    }

    #[test]
    fn context_block_excludes_question_and_keeps_order() {
        assert_eq!(context_block(&conversation()), "a\n---\nc\n---");
    }

    #[test]
    fn context_block_caps_at_three_oldest() {
        let conv: Vec<Message> = ["1", "2", "3", "4", "5", "q"]
            .into_iter()
            .map(|s| Message::new(Role::User, s))
            .collect();
        assert_eq!(context_block(&conv), "1\n---\n2\n---\n3\n---");
    }

    #[test]
    fn context_block_empty_with_single_user_message() {
        let conv = vec![
            Message::new(Role::System, "sys"),
            Message::new(Role::User, "q"),
            Message::new(Role::Assistant, "a"),
        ];
        assert_eq!(context_block(&conv), "");
        assert_eq!(context_block(&[]), "");
    }

    #[test]
    fn system_prompt_fills_fields() {
        let prompt = system_prompt("Che ore sono?", "Sii breve.", "a\n---");
        assert!(prompt.contains("Here is the question being answered:\nChe ore sono?\n\n"));
        assert!(prompt.contains("Instruction to follow while editing:\nSii breve.\n\n"));
        assert!(prompt.contains(
            "leave it as it is.\nHere I will give you the previous user messages as context:\na\n---\n\n"
        ));
        assert!(prompt.contains("Always answer in Italian."));
        assert!(prompt.ends_with("## Improved answer\n[improved answer in Italian]\n```"));
    }

    #[test]
    fn system_prompt_without_context_has_no_header() {
        let prompt = system_prompt("q", "i", "");
        assert!(!prompt.contains("previous user messages"));
        assert!(prompt.contains("leave it as it is.\n\nHere is the question"));
    }

    #[test]
    fn system_prompt_does_not_expand_placeholders_in_inputs() {
        let prompt = system_prompt("{instruction} {x}", "fai {question}", "");
        assert!(prompt.contains("answered:\n{instruction} {x}\n"));
        assert!(prompt.contains("editing:\nfai {question}\n"));
    }

    #[test]
    fn extract_answer_after_marker() {
        assert_eq!(extract_answer("...# Improved answer\nFoo\n"), "Foo");
    }

    #[test]
    fn extract_answer_strips_code_fence() {
        let response = "```markdown\n## Reasoning\nTypos.\n\n## Improved answer\nCiao, mondo!\n```";
        assert_eq!(extract_answer(response), "Ciao, mondo!");
    }

    #[test]
    fn extract_answer_without_marker_is_trimmed_text() {
        assert_eq!(extract_answer("no marker here"), "no marker here");
        assert_eq!(extract_answer("  spaced \n"), "spaced");
    }
}
