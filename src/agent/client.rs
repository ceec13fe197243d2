// src/agent/client.rs — HTTP design agent client

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{extract, AgentTurn, DesignBackend};
use crate::infra::config::BackendConfig;
use crate::infra::errors::DecoraError;
use crate::session::ChatContextEntry;

pub struct HttpDesignAgent {
    client: reqwest::Client,
    config: BackendConfig,
    /// Bearer token from the auth store; `None` means every call fails
    /// with `AuthRequired` before touching the network.
    token: Option<String>,
}

impl HttpDesignAgent {
    pub fn new(config: BackendConfig, token: Option<String>) -> Result<Self, DecoraError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DecoraError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// POST `body` to `{base}{path}`, optionally once more against the
    /// backup mirror when the primary fails in a retriable way.
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, DecoraError> {
        let token = self.token.as_deref().ok_or(DecoraError::AuthRequired)?;

        let primary = format!("{}{}", self.config.base_url, path);
        match self.post_once(&primary, token, body).await {
            Ok(payload) => Ok(payload),
            Err(e) if e.is_retriable() && self.config.retry_backup => {
                let Some(ref backup) = self.config.backup_url else {
                    return Err(e);
                };
                warn!("Primary backend failed ({e}), trying backup");
                let backup_url = format!("{backup}{path}");
                self.post_once(&backup_url, token, body).await
            }
            Err(e) => Err(e),
        }
    }

    async fn post_once(
        &self,
        url: &str,
        token: &str,
        body: &Value,
    ) -> Result<Value, DecoraError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| DecoraError::Transport {
                message: e.to_string(),
                retriable: e.is_timeout() || e.is_connect(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DecoraError::AuthRequired);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DecoraError::Backend {
                status: status.as_u16(),
                message: error_body,
                retriable: status.is_server_error(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DecoraError::MalformedResponse(format!("invalid JSON body: {e}")))
    }
}

#[async_trait]
impl DesignBackend for HttpDesignAgent {
    async fn design_turn(
        &self,
        context: &[ChatContextEntry],
        prompt: &str,
        user_image: Option<&str>,
    ) -> Result<AgentTurn, DecoraError> {
        let body = serde_json::json!({
            "context": context,
            "user_prompt": prompt,
            "user_image": user_image.unwrap_or(""),
        });

        let payload = self.post_json("/api/v1/design-agent", &body).await?;

        Ok(AgentTurn {
            assistant_text: extract::assistant_text(&payload),
            products: extract::products(&payload),
        })
    }

    async fn render_image(
        &self,
        context: &[ChatContextEntry],
        product_image_urls: &[String],
    ) -> Result<String, DecoraError> {
        let trimmed = extract::strip_image_parts(context);
        let user_image = extract::first_user_image(context).unwrap_or_default();

        let body = serde_json::json!({
            "context": trimmed,
            "user_image": user_image,
            "product_image_urls": product_image_urls,
        });

        let payload = self
            .post_json("/api/v1/design-agent/generate-image", &body)
            .await?;

        payload
            .get("data")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                DecoraError::MalformedResponse("generate-image response missing 'data'".into())
            })
    }
}
