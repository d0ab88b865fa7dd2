//! Context builder: constructs the system instructions and the outbound
//! message list for one exchange.
//!
//! No history is carried between exchanges: every list is system
//! instruction(s) followed by exactly one user message.

use gemora_core::types::Message;

/// Fixed identity and scope instruction.
pub const SYSTEM_PROMPT: &str = "You are Gemora Kop. You only answer questions about Gemora/Talmud and related classic mefarshim. If the user asks anything else, refuse briefly and ask for a Gemora question.";

const IN_DOMAIN_HINT: &str =
    "The user's message looks Gemora-related. Answer it within your scope.";

const OFF_DOMAIN_HINT: &str = "The user's message does not look Gemora-related. Unless it is in fact a question about Gemora/Talmud, refuse briefly and ask for a Gemora question.";

/// Builds message lists for the reply generator.
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    system_prompt: String,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(SYSTEM_PROMPT)
    }
}

impl ContextBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// Assemble the message list.
    ///
    /// `relevance` is the classifier verdict to fold in as a second system
    /// instruction, or `None` to send the fixed instruction alone.
    pub fn build_messages(&self, user_message: &str, relevance: Option<bool>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(3);
        messages.push(Message::system(&self.system_prompt));

        match relevance {
            Some(true) => messages.push(Message::system(IN_DOMAIN_HINT)),
            Some(false) => messages.push(Message::system(OFF_DOMAIN_HINT)),
            None => {}
        }

        messages.push(Message::user(user_message));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_hint() {
        let messages = ContextBuilder::default().build_messages("Who was Rashi?", None);
        assert_eq!(
            messages,
            vec![Message::system(SYSTEM_PROMPT), Message::user("Who was Rashi?")]
        );
    }

    #[test]
    fn test_off_domain_hint_precedes_user() {
        let messages = ContextBuilder::default().build_messages("Tell me a joke", Some(false));
        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[1], Message::System { .. }));
        assert!(messages[1].content().contains("does not look Gemora-related"));
        assert_eq!(messages[2], Message::user("Tell me a joke"));
    }

    #[test]
    fn test_in_domain_hint() {
        let messages = ContextBuilder::default().build_messages("Explain the sugya", Some(true));
        assert_eq!(messages.len(), 3);
        assert!(messages[1].content().contains("looks Gemora-related"));
    }

    #[test]
    fn test_custom_prompt() {
        let builder = ContextBuilder::new("Custom scope.");
        let messages = builder.build_messages("hi", None);
        assert_eq!(messages[0].content(), "Custom scope.");
    }
}
