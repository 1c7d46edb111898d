use std::collections::HashMap;

use crate::chain::error::ChainError;

/// Conversation role attached to a message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Instruction-setting message.
    System,
    /// End-user message.
    Human,
    /// Model-generated message.
    Ai,
}

impl Role {
    /// Wire-format role name used by chat-completions APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Human => "user",
            Self::Ai => "assistant",
        }
    }
}

/// Single role-tagged message template.
///
/// Content may contain `{name}` placeholders resolved at render time.
/// `{{` and `}}` produce literal braces; a `{` without a matching `}` and
/// the empty `{}` pass through as literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub role: Role,
    pub content: String,
}

impl MessageTemplate {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// Placeholder-name to value map supplied per render call.
pub type Bindings = HashMap<String, String>;

/// Fully substituted message, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered, fully substituted message sequence.
pub type RenderedPrompt = Vec<RenderedMessage>;

/// Ordered sequence of message templates defining a conversation.
///
/// Immutable after construction and safe to reuse across invocations;
/// rendering is a pure function of the template and the supplied bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    messages: Vec<MessageTemplate>,
}

impl PromptTemplate {
    pub fn from_messages(messages: Vec<MessageTemplate>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[MessageTemplate] {
        &self.messages
    }

    /// Substitutes bindings into every message, preserving order and roles.
    ///
    /// Fails with [`ChainError::MissingBinding`] naming the first unresolved
    /// placeholder. Bindings without a matching placeholder are ignored.
    pub fn render(&self, bindings: &Bindings) -> Result<RenderedPrompt, ChainError> {
        self.messages
            .iter()
            .map(|message| {
                Ok(RenderedMessage {
                    role: message.role,
                    content: substitute(&message.content, bindings)?,
                })
            })
            .collect()
    }
}

fn substitute(template: &str, bindings: &Bindings) -> Result<String, ChainError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    out.push('{');
                    out.push_str(&name);
                } else if name.is_empty() {
                    out.push_str("{}");
                } else {
                    match bindings.get(&name) {
                        Some(value) => out.push_str(value),
                        None => return Err(ChainError::MissingBinding { placeholder: name }),
                    }
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{Bindings, MessageTemplate, PromptTemplate, Role};
    use crate::chain::error::ChainError;

    fn capital_template() -> PromptTemplate {
        PromptTemplate::from_messages(vec![
            MessageTemplate::system("You are a helpful assistant."),
            MessageTemplate::human("What is the capital of {country}?"),
        ])
    }

    fn bindings(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn render_substitutes_placeholders_and_preserves_roles() {
        let rendered = capital_template()
            .render(&bindings(&[("country", "India")]))
            .expect("complete bindings should render");

        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].role, Role::System);
        assert_eq!(rendered[0].content, "You are a helpful assistant.");
        assert_eq!(rendered[1].role, Role::Human);
        assert_eq!(rendered[1].content, "What is the capital of India?");
    }

    #[test]
    fn render_without_required_binding_names_the_placeholder() {
        let err = capital_template()
            .render(&Bindings::new())
            .expect_err("missing binding should fail");

        match err {
            ChainError::MissingBinding { placeholder } => assert_eq!(placeholder, "country"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn render_ignores_extra_bindings() {
        let rendered = capital_template()
            .render(&bindings(&[("country", "India"), ("city", "Delhi")]))
            .expect("extra bindings should be ignored");
        assert_eq!(rendered[1].content, "What is the capital of India?");
    }

    #[test]
    fn template_without_placeholders_renders_for_any_bindings() {
        let template =
            PromptTemplate::from_messages(vec![MessageTemplate::human("No variables here.")]);

        let empty = template.render(&Bindings::new()).expect("should render");
        let extra = template
            .render(&bindings(&[("unused", "value")]))
            .expect("should render");
        assert_eq!(empty, extra);
        assert_eq!(empty[0].content, "No variables here.");
    }

    #[test]
    fn render_is_idempotent() {
        let template = capital_template();
        let vars = bindings(&[("country", "India")]);

        let first = template.render(&vars).expect("should render");
        let second = template.render(&vars).expect("should render");
        assert_eq!(first, second);
    }

    #[test]
    fn doubled_braces_are_literal() {
        let template = PromptTemplate::from_messages(vec![MessageTemplate::human(
            "Literal {{braces}} around {name}",
        )]);
        let rendered = template
            .render(&bindings(&[("name", "value")]))
            .expect("should render");
        assert_eq!(rendered[0].content, "Literal {braces} around value");
    }

    #[test]
    fn unterminated_and_empty_braces_pass_through() {
        let template = PromptTemplate::from_messages(vec![MessageTemplate::human("{} and {tail")]);
        let rendered = template.render(&Bindings::new()).expect("should render");
        assert_eq!(rendered[0].content, "{} and {tail");
    }

    #[test]
    fn same_placeholder_can_appear_in_multiple_messages() {
        let template = PromptTemplate::from_messages(vec![
            MessageTemplate::system("Speak only about {topic}."),
            MessageTemplate::human("Tell me about {topic}."),
        ]);
        let rendered = template
            .render(&bindings(&[("topic", "rivers")]))
            .expect("should render");
        assert_eq!(rendered[0].content, "Speak only about rivers.");
        assert_eq!(rendered[1].content, "Tell me about rivers.");
    }

    #[test]
    fn role_wire_names_match_chat_api_conventions() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::Human.as_str(), "user");
        assert_eq!(Role::Ai.as_str(), "assistant");
    }
}
