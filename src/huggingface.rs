use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{GenerationParameters, GenieConfig};
use crate::model::Transport;
use crate::{GenieError, Result};

#[derive(Serialize)]
struct InferenceParameters<'a> {
    max_length: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
    stop: &'a [String],
    repetition_penalty: f32,
    num_return_sequences: u32,
    do_sample: bool,
    use_cache: bool,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
}

impl<'a> InferenceRequest<'a> {
    fn new(inputs: &'a str, parameters: &'a GenerationParameters) -> Self {
        Self {
            inputs,
            parameters: InferenceParameters {
                max_length: parameters.max_length,
                temperature: parameters.temperature,
                top_p: parameters.top_p,
                return_full_text: false,
                stop: &parameters.stop,
                repetition_penalty: parameters.repetition_penalty,
                num_return_sequences: 1,
                do_sample: true,
                use_cache: true,
            },
        }
    }
}

#[derive(Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

impl InferenceResponse {
    fn into_text(self) -> Option<String> {
        let generation = match self {
            Self::Batch(generations) => generations.into_iter().next(),
            Self::Single(generation) => Some(generation),
        };
        generation
            .and_then(|generation| generation.generated_text)
            .filter(|text| !text.trim().is_empty())
    }
}

fn setup_error(err: reqwest::Error) -> GenieError {
    GenieError::Config(format!("could not build the HTTP client: {err}"))
}

fn parse_generated_text(body: &str) -> Result<String> {
    let response: InferenceResponse =
        serde_json::from_str(body).map_err(|err| GenieError::Decode(err.to_string()))?;
    response.into_text().ok_or(GenieError::EmptyGeneration)
}

/// Client for a hosted text-generation endpoint speaking the Hugging Face
/// inference API.
pub struct InferenceClient {
    client: Client,
    endpoint: String,
    token: String,
    parameters: GenerationParameters,
}

impl InferenceClient {
    pub fn new(config: &GenieConfig) -> Result<Self> {
        let token = config.token()?.to_string();
        let mut builder = ClientBuilder::new();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(setup_error)?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token,
            parameters: config.parameters.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Checks that `token` is accepted by the endpoint.
    pub async fn validate_token(&self, token: &str) -> Result<()> {
        tracing::debug!(endpoint = %self.endpoint, "validating access token");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "inputs": "test" }))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            tracing::warn!(status = status.as_u16(), "access token rejected");
            Err(GenieError::InvalidToken(status.as_u16()))
        }
    }

    pub async fn validate(&self) -> Result<()> {
        self.validate_token(&self.token).await
    }
}

#[async_trait]
impl Transport for InferenceClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "sending prompt");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .json(&InferenceRequest::new(prompt, &self.parameters))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "inference request failed");
            return Err(GenieError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = parse_generated_text(&body)?;
        tracing::debug!(generated_len = text.len(), "received generated text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_generated_text, setup_error, InferenceClient, InferenceRequest};
    use crate::config::{GenerationParameters, GenieConfig};
    use crate::ErrorKind;

    #[test]
    fn request_body_shape() {
        let parameters = GenerationParameters::default();
        let body = serde_json::to_value(InferenceRequest::new("hello", &parameters)).unwrap();
        assert_eq!(body["inputs"], "hello");
        let parameters = &body["parameters"];
        assert_eq!(parameters["max_length"], 1024);
        assert_eq!(parameters["return_full_text"], false);
        assert_eq!(parameters["stop"], serde_json::json!(["</s>", "[INST]"]));
        assert_eq!(parameters["num_return_sequences"], 1);
        assert_eq!(parameters["do_sample"], true);
        assert_eq!(parameters["use_cache"], true);
        assert!(parameters.get("top_p").is_some());
        assert!(parameters.get("repetition_penalty").is_some());
        assert!(parameters.get("temperature").is_some());
    }

    #[test]
    fn parses_array_and_object_responses() {
        assert_eq!(
            parse_generated_text(r#"[{"generated_text": "print(1)"}]"#).unwrap(),
            "print(1)"
        );
        assert_eq!(
            parse_generated_text(r#"{"generated_text": "print(2)"}"#).unwrap(),
            "print(2)"
        );
    }

    #[test]
    fn missing_text_is_empty_result() {
        for body in [
            "[]",
            r#"[{"generated_text": ""}]"#,
            r#"{"generated_text": "   "}"#,
            r#"{"error": "Model is loading"}"#,
        ] {
            let err = parse_generated_text(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EmptyResult, "{body}");
        }
    }

    #[test]
    fn garbage_is_a_transport_error() {
        let err = parse_generated_text("<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn client_setup_failures_are_configuration_errors() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err = setup_error(err);
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("could not build the HTTP client"));
    }

    #[test]
    fn client_requires_token() {
        assert!(InferenceClient::new(&GenieConfig::default()).is_err());
        let config = GenieConfig {
            token: Some("hf_token".into()),
            ..GenieConfig::default()
        };
        let client = InferenceClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), config.endpoint);
    }
}
