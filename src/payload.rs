use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Formatter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("missing field `{0}`")]
    Missing(&'static str),

    #[error("malformed field `{field}`: {reason}")]
    Malformed {
        field: &'static str,
        reason: String,
    },
}

impl PayloadError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) fn required<'a, T>(
    value: &'a Option<T>,
    field: &'static str,
) -> Result<&'a T, PayloadError> {
    value.as_ref().ok_or(PayloadError::Missing(field))
}

fn from_json<T: DeserializeOwned>(json: &str, kind: &str) -> Result<T> {
    serde_json::from_str(json).with_context(|| format!("Unable to parse {} payload", kind))
}

/// A value the lottery service sends either as a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub fn is_text(&self, text: &str) -> bool {
        matches!(self, Scalar::Text(t) if t == text)
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Text(text) => write!(f, "{}", text),
            Scalar::Number(number) => write!(f, "{}", number),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LottoPurchase {
    #[serde(default)]
    pub result: LottoPurchaseResult,
    pub balance: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LottoPurchaseResult {
    pub result_msg: Option<String>,
    pub buy_round: Option<Scalar>,
    /// One entry per game, e.g. `A|01|02|03|04|05|063`. The trailing character is a
    /// selection-mode flag, not part of the numbers.
    pub arr_game_choice_num: Option<Vec<String>>,
}

impl LottoPurchase {
    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json, "lotto purchase")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Win720Purchase {
    pub result_code: Option<Scalar>,
    /// Pipe-delimited on success; the purchase round is the fourth segment.
    pub result_msg: Option<String>,
    /// Comma-separated ticket groups, e.g. `4123456,5123456`.
    pub sale_ticket: Option<String>,
    pub balance: Option<Scalar>,
}

impl Win720Purchase {
    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json, "win720 purchase")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LottoWinning {
    pub round: Option<Scalar>,
    pub money: Option<Scalar>,
    pub lotto_details: Option<Vec<LottoLine>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LottoLine {
    pub label: Option<String>,
    pub status: Option<String>,
    pub result: Option<Vec<String>>,
}

impl LottoWinning {
    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json, "lotto winning")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Win720Winning {
    pub round: Option<Scalar>,
    pub money: Option<Vec<u64>>,
}

impl Win720Winning {
    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json, "win720 winning")
    }
}
