//! LLM question-answering client
//!
//! Forwards a student question (optionally with lesson context) to the
//! configured model endpoint and returns the answer text.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{check_status, Result};

pub struct TutorClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    model: &'a str,
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    answer: String,
}

impl TutorClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Ask the model a question, optionally scoped to lesson content
    #[instrument(skip(self, context))]
    pub async fn ask(&self, question: &str, context: Option<&str>) -> Result<String> {
        let request = AnswerRequest {
            model: &self.model,
            question,
            context,
        };

        let response = self
            .client
            .post(format!("{}/v1/answers", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let parsed: AnswerResponse = response.json().await?;
        Ok(parsed.answer)
    }
}
