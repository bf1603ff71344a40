//! Completion client: asks a hosted chat model to improve an assistant answer.
//!
//! One non-streaming request per attempt, a bounded number of attempts with a fixed
//! wait in between, and the "Improved answer" section extracted from the reply.

mod error;
mod prompt;

use std::future::Future;
use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use serde_json::{Value, json};

use crate::core::config::{Config, RetryPolicy};
use crate::core::dataset::Message;

pub use error::{CompletionError, map_api_error};
pub use prompt::{context_block, extract_answer, system_prompt};

/// Everything needed to rewrite one answer.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The user message the answer replies to.
    pub question: String,
    /// The answer to fix (the staged edit buffer).
    pub answer: String,
    /// The whole conversation the answer belongs to.
    pub conversation: Vec<Message>,
    /// Free-form editing instruction.
    pub instruction: String,
}

/// A chat model that turns a system prompt and one user turn into text.
pub trait ChatBackend: Send + Sync {
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

/// OpenAI-compatible chat-completions endpoint (Together by default).
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl OpenAiBackend {
    pub fn from_config(config: &Config) -> Result<Self, CompletionError> {
        Ok(Self {
            client: Client::with_config(config.openai_config()?).with_backoff(no_backoff()),
            model: config.model_id.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

/// The client's built-in backoff retries 5xx and 429 for minutes; every error is
/// returned at once instead, so `RetryPolicy` alone bounds the attempts.
fn no_backoff() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

impl ChatBackend for OpenAiBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let response: Value = self
            .client
            .chat()
            .create_byot(json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
            }))
            .await
            .map_err(map_api_error)?;
        response_text(&response)
    }
}

/// Pull the first choice's text out of a chat-completions response body.
fn response_text(response: &Value) -> Result<String, CompletionError> {
    if let Some(err) = response.get("error") {
        let msg = err
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        return Err(CompletionError::ApiMessage(msg.to_string()));
    }
    response
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
        .ok_or(CompletionError::EmptyResponse)
}

/// Builds prompts, retries the backend, and post-processes the reply.
pub struct CompletionClient<B> {
    backend: B,
    retry: RetryPolicy,
}

impl CompletionClient<OpenAiBackend> {
    pub fn from_config(config: &Config) -> Result<Self, CompletionError> {
        Ok(Self::new(OpenAiBackend::from_config(config)?, config.retry))
    }
}

impl<B: ChatBackend> CompletionClient<B> {
    pub fn new(backend: B, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// Return an improved version of `request.answer`.
    pub async fn improve(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let context = context_block(&request.conversation);
        let system = system_prompt(&request.question, &request.instruction, &context);
        let user = request.answer.trim();
        let reply = with_retry(self.retry, || self.backend.complete(&system, user)).await?;
        Ok(extract_answer(&reply))
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` attempts have failed,
/// sleeping `policy.wait` between attempts.
async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, CompletionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CompletionError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        log::debug!("Completion attempt {}/{}", attempt, max_attempts);
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                log::warn!(
                    "Completion attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    policy.wait
                );
                tokio::time::sleep(policy.wait).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!("Completion failed after {} attempts: {}", attempt, e);
                return Err(CompletionError::Exhausted {
                    attempts: attempt,
                    last: Box::new(e),
                });
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::testing::{ScriptedBackend, failure};
    use super::*;
    use crate::core::dataset::Role;

    const NO_WAIT: RetryPolicy = RetryPolicy {
        max_attempts: 3,
        wait: Duration::ZERO,
    };

    fn request() -> CompletionRequest {
        CompletionRequest {
            question: "Quanto fa 2+2?".to_string(),
            answer: "  fa 4  \n".to_string(),
            conversation: vec![
                Message::new(Role::User, "Ciao"),
                Message::new(Role::Assistant, "Ciao!"),
                Message::new(Role::User, "Quanto fa 2+2?"),
                Message::new(Role::Assistant, "fa 4"),
            ],
            instruction: "Migliora la grammatica.".to_string(),
        }
    }

    #[tokio::test]
    async fn improve_sends_prompt_and_trimmed_answer() {
        let client = CompletionClient::new(
            ScriptedBackend::new(vec![Ok(
                "## Reasoning\nManca il soggetto.\n\n## Improved answer\nFa 4.".to_string(),
            )]),
            NO_WAIT,
        );
        let out = client.improve(&request()).await.unwrap();
        assert_eq!(out, "Fa 4.");

        let calls = client.backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (system, user) = &calls[0];
        assert_eq!(user, "fa 4");
        assert!(system.contains("answered:\nQuanto fa 2+2?\n"));
        assert!(system.contains("editing:\nMigliora la grammatica.\n"));
        assert!(system.contains("as context:\nCiao\n---\n"));
    }

    #[tokio::test]
    async fn retry_succeeds_on_third_attempt() {
        let client = CompletionClient::new(
            ScriptedBackend::new(vec![failure(), failure(), Ok("Fatto".to_string())]),
            NO_WAIT,
        );
        assert_eq!(client.improve(&request()).await.unwrap(), "Fatto");
        assert_eq!(client.backend.call_count(), 3);
    }

    #[tokio::test]
    async fn retry_gives_up_after_three_failures() {
        let client = CompletionClient::new(
            ScriptedBackend::new(vec![failure(), failure(), failure(), Ok("late".to_string())]),
            NO_WAIT,
        );
        let err = client.improve(&request()).await.unwrap_err();
        match err {
            CompletionError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, CompletionError::ApiMessage(_)));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(client.backend.call_count(), 3);
    }

    #[tokio::test]
    async fn retry_waits_between_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            wait: Duration::from_millis(20),
        };
        let started = std::time::Instant::now();
        let client = CompletionClient::new(
            ScriptedBackend::new(vec![failure(), Ok("ok".to_string())]),
            policy,
        );
        client.improve(&request()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn response_text_reads_first_choice() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "ciao"}}]});
        assert_eq!(response_text(&body).unwrap(), "ciao");
    }

    #[test]
    fn response_text_reports_api_error_and_empty_reply() {
        let body = json!({"error": {"message": "model not found"}});
        assert!(matches!(
            response_text(&body),
            Err(CompletionError::ApiMessage(m)) if m == "model not found"
        ));
        let body = json!({"choices": [{"message": {"content": "  "}}]});
        assert!(matches!(
            response_text(&body),
            Err(CompletionError::EmptyResponse)
        ));
        assert!(matches!(
            response_text(&json!({"choices": []})),
            Err(CompletionError::EmptyResponse)
        ));
    }

    /// Local endpoint that answers every request with 503. Returns the base URL and
    /// the number of requests served so far.
    fn overloaded_endpoint() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let served = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&served);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let _ = answer_unavailable(stream, &counter);
            }
        });
        (base_url, served)
    }

    fn answer_unavailable(mut stream: TcpStream, served: &AtomicUsize) -> std::io::Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body)?;
        served.fetch_add(1, Ordering::SeqCst);

        let reply = r#"{"error":{"message":"overloaded","type":"server_error"}}"#;
        write!(
            stream,
            "HTTP/1.1 503 Service Unavailable\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            reply.len(),
            reply
        )?;
        stream.flush()
    }

    #[tokio::test]
    async fn server_errors_are_retried_only_by_retry_policy() {
        let (base_url, served) = overloaded_endpoint();
        let config = Config {
            base_url,
            api_key: Some("test-key".to_string()),
            model_id: "test-model".to_string(),
            max_tokens: 64,
            retry: NO_WAIT,
        };
        let client = CompletionClient::from_config(&config).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(10), client.improve(&request()))
            .await
            .expect("completion kept retrying past the retry policy");
        match result {
            Err(CompletionError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(served.load(Ordering::SeqCst), 3);
    }
}
