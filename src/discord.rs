use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde_json::json;

pub(crate) fn build_request(client: &Client, webhook_url: Url, message: &str) -> RequestBuilder {
    client.post(webhook_url).json(&json!({ "content": message }))
}
