//! OpenAI-compatible chat-completions summarizer.

use crate::traits::Summarizer;
use crate::types::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shape of the requested summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSettings {
    pub keyword_length: u32,
    pub summary_length: u32,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
    prompt: PromptSettings,
}

impl OpenAiSummarizer {
    pub fn new(api_key: String, base_url: &str, proxy: Option<&str>, prompt: PromptSettings) -> Result<Self> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(proxy) = proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            prompt,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_messages(&self, text: &str, language: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "user",
                content: text.to_string(),
            },
            ChatMessage {
                role: "assistant",
                content: instruction(language, self.prompt),
            },
        ]
    }
}

/// Summary instruction sent after the article.
pub fn instruction(language: &str, prompt: PromptSettings) -> String {
    let PromptSettings {
        keyword_length,
        summary_length,
    } = prompt;

    if language == "zh" {
        format!(
            "请用中文总结这篇文章，先提取出{keyword_length}个关键词，在同一行内输出，然后换行，用中文在{summary_length}字内写一个包含所有要点的总结，按顺序分要点输出，并按照以下格式输出'<br><br>总结:'，<br>是HTML的换行符，输出时必须保留2个，并且必须在'总结:'二字之前"
        )
    } else {
        format!(
            "Please summarize this article in {language} language, first extract {keyword_length} keywords, output in the same line, then line break, write a summary containing all the points in {summary_length} words in {language}, output in order by points, and output in the following format '<br><br>Summary:' , <br> is the line break of HTML, 2 must be retained when output, and must be before the word 'Summary:'"
        )
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    fn summarizer_name(&self) -> String {
        format!("OpenAI ({})", self.base_url)
    }

    async fn summarize(&self, text: &str, model: &str, language: &str) -> Result<String> {
        let messages = self.build_messages(text, language);
        let request = ChatRequest {
            model,
            messages: &messages,
        };

        debug!("Sending {} chars to {} using {}", text.chars().count(), self.endpoint(), model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Summarization(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Summarization(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::Summarization(format!("failed to read response: {}", e)))?;

        completion_text(&body)
    }
}

/// First non-empty choice of a chat-completions response body.
fn completion_text(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::Summarization(format!("malformed response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| PipelineError::Summarization("empty completion".to_string()))
}
