use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::ProviderError;
use crate::provider::{ChatRequest, ChunkSink, CompletionProvider};

pub struct DeepSeekClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl DeepSeekClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// One decoded line of a server-sent event stream.
#[derive(Debug, PartialEq)]
pub(crate) enum StreamLine {
    Delta(String),
    Done,
    Skip,
}

pub(crate) fn parse_stream_line(line: &str) -> Result<StreamLine, ProviderError> {
    let line = line.trim();
    // Blank separators, `event:` fields and `: keep-alive` comments carry no text
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(StreamLine::Skip);
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return Ok(StreamLine::Done);
    }

    let chunk: StreamChunk = serde_json::from_str(data)?;
    if let Some(err) = chunk.error {
        return Err(ProviderError::Stream(err.message));
    }

    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty());

    Ok(match text {
        Some(text) => StreamLine::Delta(text),
        None => StreamLine::Skip,
    })
}

/// Feed one raw line through the parser. Returns `true` once the stream is finished.
fn consume_line(
    raw: &[u8],
    on_chunk: &mut ChunkSink<'_>,
    full_response: &mut String,
) -> Result<bool, ProviderError> {
    match parse_stream_line(&String::from_utf8_lossy(raw))? {
        StreamLine::Delta(text) => {
            on_chunk(&text);
            full_response.push_str(&text);
            Ok(false)
        }
        StreamLine::Done => Ok(true),
        StreamLine::Skip => Ok(false),
    }
}

#[async_trait]
impl CompletionProvider for DeepSeekClient {
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<String, ProviderError> {
        let api_url = format!("{}/chat/completions", self.base_url);

        debug!(
            "Sending request to DeepSeek API: model={}, messages={}",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("API request failed with status {}: {}", status, body);
            return Err(ProviderError::Api { status, body });
        }

        let mut stream = response.bytes_stream();
        // Raw bytes are split on newlines before decoding so that a multi-byte
        // character split across frames is reassembled first.
        let mut buffer: Vec<u8> = Vec::new();
        let mut full_response = String::new();

        while let Some(bytes) = stream.next().await {
            buffer.extend_from_slice(&bytes?);

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                if consume_line(&line, on_chunk, &mut full_response)? {
                    debug!("Stream finished with [DONE], {} bytes", full_response.len());
                    return Ok(full_response);
                }
            }
        }

        if !buffer.is_empty() {
            consume_line(&buffer, on_chunk, &mut full_response)?;
        }

        debug!("Stream closed without [DONE], {} bytes", full_response.len());
        Ok(full_response)
    }
}
