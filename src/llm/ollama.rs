use crate::llm::client::{LLMClient, LLMError, ShellCommand};
use crate::llm::context::PromptContext;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local Ollama server. Requests carry a hard timeout so the
/// core never waits on the model indefinitely.
pub struct OllamaClient {
    base_url: String,
    model: String,
    http_client: Client,
}

impl OllamaClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    pub fn with_endpoint(base_url: &str, model: &str) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            http_client,
        }
    }

    async fn call_api(&self, prompt: String) -> Result<String, LLMError> {
        let request_body = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LLMError::ApiError(format!(
                "Ollama returned status {status}: {error_text}"
            )));
        }

        let api_response: GenerateResponse = response.json().await?;
        Ok(api_response.response)
    }

    fn build_prompt(query: &str, context: &PromptContext) -> String {
        format!(
            "You are an assistant that proposes a single shell command for a Linux system.

{}

User request: {}

CRITICAL INSTRUCTIONS:
- Respond with ONLY the shell command itself
- Do NOT include explanations, reasoning, or commentary
- Do NOT use markdown code blocks or backticks
- Output exactly one line containing just the command
- Always use full absolute paths; never use ~ or sudo
- Only propose commands that create directories or small text files
- Example good response: mkdir /home/user/Documents/projects
- Example good response: touch /home/user/Documents/notes.txt
- Example bad response: rm -rf /

Your response:",
            context.render(),
            query
        )
    }

    /// Reduce a raw model reply to a single command line: strip markdown
    /// fences and keep only the first line.
    fn clean_response(response: &str) -> String {
        let mut cleaned = response.trim();

        if cleaned.starts_with("```") {
            if let Some(first_newline) = cleaned.find('\n') {
                cleaned = &cleaned[first_newline + 1..];
            }
            if let Some(last_backticks) = cleaned.rfind("```") {
                cleaned = &cleaned[..last_backticks];
            }
            cleaned = cleaned.trim();
        }

        if let Some(first_line) = cleaned.lines().next() {
            cleaned = first_line.trim();
        }

        cleaned.to_string()
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn propose(
        &self,
        query: &str,
        context: &PromptContext,
    ) -> Result<ShellCommand, LLMError> {
        let prompt = Self::build_prompt(query, context);
        let response = self.call_api(prompt).await?;

        let command = Self::clean_response(&response);
        if command.is_empty() {
            return Err(LLMError::InvalidResponse(
                "model returned no command".to_string(),
            ));
        }

        Ok(ShellCommand { command })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_clean_response_simple() {
        assert_eq!(
            OllamaClient::clean_response("mkdir /tmp/dir"),
            "mkdir /tmp/dir"
        );
    }

    #[test]
    fn test_clean_response_with_whitespace() {
        assert_eq!(
            OllamaClient::clean_response("  touch /tmp/a.txt  \n"),
            "touch /tmp/a.txt"
        );
    }

    #[test]
    fn test_clean_response_markdown_bash() {
        assert_eq!(
            OllamaClient::clean_response("```bash\nmkdir /tmp/dir\n```"),
            "mkdir /tmp/dir"
        );
    }

    #[test]
    fn test_clean_response_markdown_plain() {
        assert_eq!(
            OllamaClient::clean_response("```\nmkdir /tmp/dir\n```"),
            "mkdir /tmp/dir"
        );
    }

    #[test]
    fn test_clean_response_multiline_with_explanation() {
        let response = "mkdir /tmp/dir\n\nThis creates the directory.";
        assert_eq!(OllamaClient::clean_response(response), "mkdir /tmp/dir");
    }

    #[test]
    fn test_default_endpoint() {
        let client = OllamaClient::new();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model, "llama3.2");
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = OllamaClient::with_endpoint("http://myhost:11434/", "mistral");
        assert_eq!(client.base_url, "http://myhost:11434");
    }

    #[test]
    fn test_build_prompt_includes_context_and_query() {
        let context = PromptContext {
            base_dir: PathBuf::from("/home/user"),
            directories: vec!["/home/user/Documents".to_string()],
        };
        let prompt = OllamaClient::build_prompt("create a notes file", &context);
        assert!(prompt.contains("/home/user/Documents"));
        assert!(prompt.contains("create a notes file"));
        assert!(prompt.contains("never use ~ or sudo"));
    }

    #[test]
    fn test_request_serializes_without_streaming() {
        let request = GenerateRequest {
            model: "llama3.2".to_string(),
            prompt: "hello".to_string(),
            stream: false,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("llama3.2"));
    }

    #[test]
    fn test_response_deserializes() {
        let json = r#"{"model":"llama3.2","response":"mkdir /tmp/dir","done":true}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.response, "mkdir /tmp/dir");
    }
}
