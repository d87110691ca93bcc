use crate::discord;
use crate::notify::Deliver;
use crate::telegram;
use anyhow::{bail, Result};
use reqwest::blocking::RequestBuilder;
use reqwest::Url;
use serde::Deserialize;
use std::fmt::Formatter;
use std::str::FromStr;
use tracing::debug;

/// The wire format a webhook expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// `POST` with a JSON `{"content": ...}` body.
    Discord,
    /// `GET` with `text` and `parse_mode=markdown` query parameters.
    Telegram,
}

impl FromStr for Channel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "discord" => Ok(Channel::Discord),
            "telegram" => Ok(Channel::Telegram),
            _ => bail!("Unknown notification channel: {}", s),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Discord => write!(f, "discord"),
            Channel::Telegram => write!(f, "telegram"),
        }
    }
}

pub struct Webhook {
    channel: Channel,
    url: Url,
    client: reqwest::blocking::Client,
}

impl Webhook {
    pub fn new(channel: Channel, url: &str) -> Result<Self> {
        // Redirects are followed so an `http://` URL still reaches its `https://` endpoint.
        let client = reqwest::blocking::Client::builder().build()?;

        Ok(Self {
            channel,
            url: Url::parse(url)?,
            client,
        })
    }

    pub fn discord(url: &str) -> Result<Self> {
        Self::new(Channel::Discord, url)
    }

    pub fn telegram(url: &str) -> Result<Self> {
        Self::new(Channel::Telegram, url)
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn build_request(&self, message: &str) -> RequestBuilder {
        match self.channel {
            Channel::Discord => discord::build_request(&self.client, self.url.clone(), message),
            Channel::Telegram => telegram::build_request(&self.client, self.url.clone(), message),
        }
    }
}

impl Deliver for Webhook {
    fn deliver(&self, message: &str) -> Result<()> {
        debug!(channel = %self.channel, length = message.len(), "Delivering message");

        let response = self.build_request(message).send()?.error_for_status()?;

        // A redirect we could not follow means the message never arrived.
        if !response.status().is_success() {
            bail!("Unexpected webhook response: {}", response.status());
        }

        Ok(())
    }
}
