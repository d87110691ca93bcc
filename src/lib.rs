//! Formats lotto and win720 (pension lottery) purchase and winning results into chat messages
//! and delivers them to Discord or Telegram webhooks.
//!
//! ```no_run
//! use lotto_notifier::{Notifier, Webhook, Win720Winning};
//!
//! # fn main() -> anyhow::Result<()> {
//! let notifier = Notifier::new(Webhook::telegram(
//!     "https://api.telegram.org/bot<token>/sendMessage?chat_id=1",
//! )?);
//! let winning = Win720Winning::from_json(r#"{"round": 215, "money": [1000000]}"#)?;
//! notifier.win720_winning(&winning)?;
//! # Ok(())
//! # }
//! ```

mod config;
mod discord;
mod format;
mod notify;
mod payload;
mod telegram;

pub use config::{Channel, Webhook};
pub use format::{format_lotto_numbers, format_win720_tickets, format_won};
pub use notify::{
    render_lotto_purchase, render_lotto_winning, render_win720_purchase, render_win720_winning,
    Deliver, Notice, Notifier, LOTTO_FALLBACK, WIN720_FALLBACK,
};
pub use payload::{
    LottoLine, LottoPurchase, LottoPurchaseResult, LottoWinning, PayloadError, Scalar,
    Win720Purchase, Win720Winning,
};
