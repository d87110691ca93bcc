use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;

const PARSE_MODE: &str = "markdown";

// Telegram bot URLs usually already carry `chat_id`; the message is appended to it.
pub(crate) fn build_request(client: &Client, webhook_url: Url, message: &str) -> RequestBuilder {
    client
        .get(webhook_url)
        .query(&[("text", message), ("parse_mode", PARSE_MODE)])
}
