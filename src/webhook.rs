// Gastos Bot - Webhook Transport
// Inbound event extraction and outbound reaction acknowledgements

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::sheets::REQUEST_TIMEOUT;

/// Reaction glyphs sent back through the transport
pub const ACK_OK: &str = "✓";
pub const ACK_FAIL: &str = "✗";

// ============================================================================
// INBOUND EVENTS
// ============================================================================

/// IncomingMessage - what the core needs from a raw webhook event
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub text: String,
    pub group_id: String,
    /// Message key, kept only so an acknowledgement can point back at it
    pub message_id: Option<String>,
}

/// Pull the message text and origin out of a raw event.
///
/// Event shape (the chat gateway's message-upsert payload):
///   data.message.conversation  -> text
///   data.key.remoteJid         -> origin group
///   data.key.id                -> message key (for acknowledgements)
///
/// Any missing path returns None: an unexpected shape means the event is
/// ignored, never a hard error.
pub fn extract_event(event: &Value) -> Option<IncomingMessage> {
    let text = event
        .pointer("/data/message/conversation")?
        .as_str()?
        .to_string();
    let group_id = event
        .pointer("/data/key/remoteJid")?
        .as_str()?
        .to_string();
    let message_id = event
        .pointer("/data/key/id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Some(IncomingMessage {
        text,
        group_id,
        message_id,
    })
}

/// Apply the configured group filter.
///
/// Only events from the target group are processed; no configured target
/// means the filter is off.
pub fn is_from_target_group(message: &IncomingMessage, target: Option<&str>) -> bool {
    match target {
        Some(target) => message.group_id == target,
        None => true,
    }
}

// ============================================================================
// OUTBOUND ACKNOWLEDGEMENTS
// ============================================================================

#[derive(Debug, Serialize)]
struct ReactionRequest<'a> {
    #[serde(rename = "remoteJid")]
    remote_jid: &'a str,
    #[serde(rename = "messageId")]
    message_id: &'a str,
    reaction: &'a str,
}

/// ReactionSender - posts a ✓/✗ reaction back through the chat gateway
///
/// Acknowledgements are best-effort: callers log failures and carry on, a
/// lost reaction never affects the webhook response.
pub struct ReactionSender {
    client: reqwest::blocking::Client,
    endpoint: String,
    token: Option<String>,
}

impl ReactionSender {
    pub fn new(endpoint: String, token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ReactionSender {
            client,
            endpoint,
            token,
        })
    }

    /// React to a message with the given glyph
    pub fn send(&self, message: &IncomingMessage, glyph: &str) -> Result<()> {
        let Some(message_id) = message.message_id.as_deref() else {
            bail!("Event carried no message id to react to");
        };

        let body = ReactionRequest {
            remote_jid: &message.group_id,
            message_id,
            reaction: glyph,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.header("apikey", token);
        }

        let response = request.send().context("Reaction request failed")?;
        if !response.status().is_success() {
            bail!("Reaction request returned {}", response.status());
        }

        Ok(())
    }
}
