use crate::chain::backend::{ChatBackend, ChatResult};
use crate::chain::error::ChainError;
use crate::chain::prompt::{Bindings, PromptTemplate};

/// Template-then-generate pipeline: render bindings into the prompt, then
/// make exactly one backend call.
///
/// Errors from either stage propagate unchanged; a render failure means the
/// backend is never called. The embedding path has no template stage, so
/// callers hand their input straight to an
/// [`EmbeddingBackend`](crate::chain::backend::EmbeddingBackend).
#[derive(Debug)]
pub struct ChatPipeline<B: ChatBackend> {
    template: PromptTemplate,
    backend: B,
}

impl<B: ChatBackend + Sync> ChatPipeline<B> {
    pub fn new(template: PromptTemplate, backend: B) -> Self {
        Self { template, backend }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub async fn invoke(&self, bindings: &Bindings) -> Result<ChatResult, ChainError> {
        let prompt = self.template.render(bindings)?;
        self.backend.invoke(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::ChatPipeline;
    use crate::chain::backend::{ChatBackend, ChatResult};
    use crate::chain::error::ChainError;
    use crate::chain::prompt::{Bindings, MessageTemplate, PromptTemplate, RenderedPrompt, Role};

    #[derive(Default)]
    struct RecordingBackend {
        calls: AtomicUsize,
        last_prompt: Mutex<Option<RenderedPrompt>>,
    }

    #[async_trait]
    impl ChatBackend for RecordingBackend {
        async fn invoke(&self, prompt: &RenderedPrompt) -> Result<ChatResult, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().expect("lock") = Some(prompt.clone());
            Ok(ChatResult {
                content: "New Delhi.".to_string(),
                usage: None,
            })
        }
    }

    fn capital_template() -> PromptTemplate {
        PromptTemplate::from_messages(vec![
            MessageTemplate::system("You are a helpful assistant."),
            MessageTemplate::human("What is the capital of {country}?"),
        ])
    }

    #[tokio::test]
    async fn invoke_renders_then_calls_the_backend_once() {
        let pipeline = ChatPipeline::new(capital_template(), RecordingBackend::default());
        let bindings: Bindings = [("country".to_string(), "India".to_string())].into();

        let result = pipeline.invoke(&bindings).await.expect("should succeed");
        assert_eq!(result.content, "New Delhi.");
        assert_eq!(pipeline.backend.calls.load(Ordering::SeqCst), 1);

        let prompt = pipeline
            .backend
            .last_prompt
            .lock()
            .expect("lock")
            .clone()
            .expect("backend should have seen a prompt");
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[1].role, Role::Human);
        assert_eq!(prompt[1].content, "What is the capital of India?");
    }

    #[tokio::test]
    async fn render_failure_short_circuits_before_the_backend() {
        let pipeline = ChatPipeline::new(capital_template(), RecordingBackend::default());

        let err = pipeline
            .invoke(&Bindings::new())
            .await
            .expect_err("missing binding should fail");
        match err {
            ChainError::MissingBinding { placeholder } => assert_eq!(placeholder, "country"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(pipeline.backend.calls.load(Ordering::SeqCst), 0);
    }
}
