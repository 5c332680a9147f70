//! Transactional email client

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{check_status, Result};

pub struct Mailer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl Mailer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    /// Send one email
    #[instrument(skip(self, body))]
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = OutboundMessage {
            from: &self.from,
            to,
            subject,
            body,
        };

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await?;

        check_status(response).await?;
        info!(to, subject, "Email dispatched");
        Ok(())
    }

    /// Welcome email sent right after registration
    pub async fn send_welcome(&self, to: &str, username: &str) -> Result<()> {
        let body = format!(
            "Hi {username},\n\nYour account is ready. Browse the catalog and pick \
             a package to start learning.\n"
        );
        self.send(to, "Welcome to Lektora", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_posts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_partial_json(serde_json::json!({
                "to": "alice@example.com",
                "subject": "Welcome to Lektora",
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = Mailer::new(server.uri(), "key", "noreply@lektora.dev");
        mailer.send_welcome("alice@example.com", "alice").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_message_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad recipient"))
            .mount(&server)
            .await;

        let mailer = Mailer::new(server.uri(), "key", "noreply@lektora.dev");
        let err = mailer.send("not-an-address", "s", "b").await.unwrap_err();
        assert!(matches!(err, crate::Error::Api { status: 422, .. }));
    }
}
