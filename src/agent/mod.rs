// src/agent/mod.rs — Remote design agent layer

pub mod client;
pub mod extract;

use async_trait::async_trait;

use crate::infra::errors::DecoraError;
use crate::session::{ChatContextEntry, Product};

/// One completed design-agent round trip: the assistant's reply plus any
/// product recommendations worth showing.
#[derive(Debug, Clone)]
pub struct AgentTurn {
    pub assistant_text: String,
    pub products: Vec<Product>,
}

/// Seam between the turn engine and the backend. The production
/// implementation is [`client::HttpDesignAgent`]; tests substitute stubs.
#[async_trait]
pub trait DesignBackend: Send + Sync {
    /// Send the accumulated conversation plus a new user turn; returns the
    /// assistant reply and extracted products.
    async fn design_turn(
        &self,
        context: &[ChatContextEntry],
        prompt: &str,
        user_image: Option<&str>,
    ) -> Result<AgentTurn, DecoraError>;

    /// Ask the backend to composite the user's space photo with the
    /// selected product reference images. Returns one base64 image payload
    /// per call.
    async fn render_image(
        &self,
        context: &[ChatContextEntry],
        product_image_urls: &[String],
    ) -> Result<String, DecoraError>;
}
