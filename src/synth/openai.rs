use std::time::Duration;

use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use crate::foundation::error::{ReelError, ReelResult};
use crate::synth::ImageSynthesizer;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";
const DEFAULT_MODEL: &str = "dall-e-3";

/// Options for [`OpenAiSynthesizer`].
#[derive(Clone, Debug)]
pub struct OpenAiOpts {
    pub api_key: String,
    /// Any OpenAI-compatible `images/generations` endpoint.
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    /// Prepended to every scene prompt, e.g. a style hint.
    pub prompt_prefix: Option<String>,
}

impl OpenAiOpts {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: Duration::from_secs(120),
            prompt_prefix: None,
        }
    }
}

/// Network-backed synthesizer for OpenAI-style image generation APIs.
///
/// Calls are blocking; the renderer provides any parallelism.
pub struct OpenAiSynthesizer {
    opts: OpenAiOpts,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiSynthesizer {
    pub fn new(opts: OpenAiOpts) -> ReelResult<Self> {
        if opts.api_key.trim().is_empty() {
            return Err(ReelError::validation("image API key must be non-empty"));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(opts.timeout)
            .build()
            .map_err(|e| ReelError::validation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { opts, client })
    }

    fn full_prompt(&self, prompt: &str) -> String {
        match self.opts.prompt_prefix.as_deref() {
            Some(prefix) if !prefix.trim().is_empty() => format!("{} {prompt}", prefix.trim()),
            _ => prompt.to_owned(),
        }
    }

    fn download(&self, url: &str) -> ReelResult<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ReelError::synthesis(format!("download generated image: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReelError::synthesis(format!(
                "download generated image: HTTP {status}"
            )));
        }
        let bytes = resp
            .bytes()
            .map_err(|e| ReelError::synthesis(format!("read generated image body: {e}")))?;
        Ok(bytes.to_vec())
    }
}

impl ImageSynthesizer for OpenAiSynthesizer {
    fn name(&self) -> &str {
        &self.opts.model
    }

    fn synthesize(&self, prompt: &str, width: u32, height: u32) -> ReelResult<Vec<u8>> {
        let body = json!({
            "model": self.opts.model,
            "prompt": self.full_prompt(prompt),
            "n": 1,
            "size": format!("{width}x{height}"),
        });

        tracing::debug!(model = %self.opts.model, width, height, "requesting image");
        let resp = self
            .client
            .post(&self.opts.endpoint)
            .bearer_auth(&self.opts.api_key)
            .json(&body)
            .send()
            .map_err(|e| ReelError::synthesis(format!("image request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ReelError::synthesis(format!("read image response: {e}")))?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ReelError::synthesis(format!(
                "image API returned HTTP {status}: {}",
                detail.trim()
            )));
        }

        decode_generation(&text, |url| self.download(url))
    }
}

/// Pull the first image out of a generation response, either inline or by URL.
fn decode_generation(
    body: &str,
    fetch: impl FnOnce(&str) -> ReelResult<Vec<u8>>,
) -> ReelResult<Vec<u8>> {
    let parsed: GenerationResponse = serde_json::from_str(body)
        .map_err(|e| ReelError::synthesis(format!("malformed image response: {e}")))?;
    let first = parsed
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ReelError::synthesis("image response contained no images"))?;

    if let Some(b64) = first.b64_json {
        return base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|e| ReelError::synthesis(format!("invalid base64 image payload: {e}")));
    }
    match first.url {
        Some(url) => fetch(&url),
        None => Err(ReelError::synthesis(
            "image response had neither 'b64_json' nor 'url'",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/openai.rs"]
mod tests;
