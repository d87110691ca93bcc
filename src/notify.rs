use crate::format::{format_lotto_lines, format_lotto_numbers, format_win720_tickets, format_won};
use crate::payload::{
    required, LottoPurchase, LottoWinning, PayloadError, Win720Purchase, Win720Winning,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

pub const LOTTO_FALLBACK: &str = "로또 - 다음 기회에... 🫠";
pub const WIN720_FALLBACK: &str = "연금복권 - 다음 기회에... 🫠";

const PURCHASE_SUCCESS: &str = "SUCCESS";
const PURCHASE_FAILURE: &str = "FAILURE";
const WIN720_SUCCESS_CODE: &str = "100";
const WIN720_ROUND_SEGMENT: usize = 3;
const NO_WIN: &str = "-";

/// Something that can push a finished message to a chat.
pub trait Deliver {
    fn deliver(&self, message: &str) -> Result<()>;
}

impl<D: Deliver + ?Sized> Deliver for &D {
    fn deliver(&self, message: &str) -> Result<()> {
        (**self).deliver(message)
    }
}

/// What was sent, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A formatted purchase or winning message.
    Message(String),
    /// The service reported a failure; its message is forwarded as-is.
    Upstream(String),
    /// The winning payload lacked data, so a fixed "better luck next time" line is used.
    Fallback(&'static str),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Message(text) | Notice::Upstream(text) => text.as_str(),
            Notice::Fallback(text) => *text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Notice::Fallback(_))
    }
}

fn or_fallback(result: Result<String, PayloadError>, fallback: &'static str) -> Result<Notice> {
    match result {
        Ok(message) => Ok(Notice::Message(message)),
        Err(PayloadError::Missing(field)) => {
            warn!(field, "Winning data incomplete, using fallback message");
            Ok(Notice::Fallback(fallback))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn render_lotto_purchase(purchase: &LottoPurchase) -> Result<Notice> {
    let result = &purchase.result;
    let status = result.result_msg.as_deref().unwrap_or(PURCHASE_FAILURE);

    // ASCII case folding only: the service sends plain ASCII status words, so non-ASCII
    // lookalikes such as `ſuccess` are treated as failures.
    if !status.eq_ignore_ascii_case(PURCHASE_SUCCESS) {
        return Ok(Notice::Upstream(status.to_string()));
    }

    let choices = required(&result.arr_game_choice_num, "arrGameChoiceNum")?;
    let numbers = format_lotto_numbers(choices.as_slice());
    let round = required(&result.buy_round, "buyRound")?;
    let balance = required(&purchase.balance, "balance")?;

    Ok(Notice::Message(format!(
        "{}회 로또 구매 완료\n남은잔액 : {}\n```{}```",
        round, balance, numbers
    )))
}

pub fn render_win720_purchase(purchase: &Win720Purchase) -> Result<Notice> {
    let succeeded = purchase
        .result_code
        .as_ref()
        .is_some_and(|code| code.is_text(WIN720_SUCCESS_CODE));

    if !succeeded {
        let message = purchase.result_msg.as_deref().unwrap_or(PURCHASE_FAILURE);
        return Ok(Notice::Upstream(message.to_string()));
    }

    let result_msg = required(&purchase.result_msg, "resultMsg")?;
    let round = result_msg
        .split('|')
        .nth(WIN720_ROUND_SEGMENT)
        .with_context(|| format!("No round in purchase message: {}", result_msg))?;

    let tickets = format_win720_tickets(required(&purchase.sale_ticket, "saleTicket")?)?;
    let balance = required(&purchase.balance, "balance")?;

    Ok(Notice::Message(format!(
        "{}회 연금복권 구매 완료\n남은잔액 : {}\n```\n{}```",
        round, balance, tickets
    )))
}

fn lotto_winning_message(winning: &LottoWinning) -> Result<String, PayloadError> {
    let round = required(&winning.round, "round")?;
    let money = required(&winning.money, "money")?;
    let lines = format_lotto_lines(required(&winning.lotto_details, "lotto_details")?)?;

    let outcome = if money.is_text(NO_WIN) {
        format!("로또 *{}회* - 다음 기회에... 🫠", round)
    } else {
        format!("로또 *{}회* - *{}* 당첨 되었습니다 🎉", round, money)
    };

    Ok(format!("```ini\n{}```\n{}", lines, outcome))
}

fn win720_winning_message(winning: &Win720Winning) -> Result<String, PayloadError> {
    let round = required(&winning.round, "round")?;
    let money = required(&winning.money, "money")?;

    // No prizes is reported the same way as no data.
    if money.is_empty() {
        return Err(PayloadError::Missing("money"));
    }

    let total = money
        .iter()
        .try_fold(0u64, |sum, amount| sum.checked_add(*amount))
        .ok_or_else(|| PayloadError::malformed("money", "total overflows"))?;

    let amounts = money.iter().map(|m| format_won(*m)).collect::<Vec<_>>().join(", ");

    Ok(format!(
        "연금복권 *{}회* - {},\n총 *{}* 당첨 되었습니다 🎉",
        round,
        amounts,
        format_won(total)
    ))
}

pub fn render_lotto_winning(winning: &LottoWinning) -> Result<Notice> {
    or_fallback(lotto_winning_message(winning), LOTTO_FALLBACK)
}

pub fn render_win720_winning(winning: &Win720Winning) -> Result<Notice> {
    or_fallback(win720_winning_message(winning), WIN720_FALLBACK)
}

/// Formats lottery results and hands them to a single delivery target.
pub struct Notifier<D> {
    target: D,
}

impl<D: Deliver> Notifier<D> {
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn lotto_purchase(&self, purchase: &LottoPurchase) -> Result<Notice> {
        self.send(render_lotto_purchase(purchase)?)
    }

    pub fn win720_purchase(&self, purchase: &Win720Purchase) -> Result<Notice> {
        self.send(render_win720_purchase(purchase)?)
    }

    pub fn lotto_winning(&self, winning: &LottoWinning) -> Result<Notice> {
        self.send(render_lotto_winning(winning)?)
    }

    pub fn win720_winning(&self, winning: &Win720Winning) -> Result<Notice> {
        self.send(render_win720_winning(winning)?)
    }

    fn send(&self, notice: Notice) -> Result<Notice> {
        match &notice {
            Notice::Message(_) => info!("Sending notification"),
            Notice::Upstream(message) => warn!(upstream = %message, "Forwarding upstream failure"),
            Notice::Fallback(_) => {}
        }

        self.target.deliver(notice.text())?;

        Ok(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<String>>,
    }

    impl Deliver for Recorder {
        fn deliver(&self, message: &str) -> Result<()> {
            self.sent.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    struct Unreachable;

    impl Deliver for Unreachable {
        fn deliver(&self, _message: &str) -> Result<()> {
            bail!("connection refused")
        }
    }

    fn sent(recorder: &Recorder) -> Vec<String> {
        recorder.sent.borrow().clone()
    }

    #[test]
    fn test_lotto_purchase_success() {
        let recorder = Recorder::default();
        let purchase = LottoPurchase::from_json(
            r#"{
                "balance": "5,000",
                "result": {
                    "resultMsg": "success",
                    "buyRound": 1100,
                    "arrGameChoiceNum": ["A|01|02|03|04|05|063", "B|07|11|19|23|38|453"]
                }
            }"#,
        )
        .unwrap();

        let notice = Notifier::new(&recorder).lotto_purchase(&purchase).unwrap();

        let expected = "1100회 로또 구매 완료\n남은잔액 : 5,000\n\
                        ```A 01 02 03 04 05 06\nB 07 11 19 23 38 45```";
        assert_eq!(notice, Notice::Message(expected.to_string()));
        assert_eq!(sent(&recorder), vec![expected]);
    }

    #[test]
    fn test_lotto_purchase_failure_is_forwarded() {
        let recorder = Recorder::default();
        let purchase =
            LottoPurchase::from_json(r#"{"result": {"resultMsg": "구매 가능 시간이 아닙니다"}}"#)
                .unwrap();
        let notice = Notifier::new(&recorder).lotto_purchase(&purchase).unwrap();

        assert_eq!(notice, Notice::Upstream("구매 가능 시간이 아닙니다".to_string()));
        assert_eq!(sent(&recorder), vec!["구매 가능 시간이 아닙니다"]);
    }

    #[test]
    fn test_lotto_purchase_status_folds_ascii_case_only() {
        let mut purchase = LottoPurchase::default();
        purchase.result.result_msg = Some("ſuccess".to_string());

        assert_eq!(
            render_lotto_purchase(&purchase).unwrap(),
            Notice::Upstream("ſuccess".to_string())
        );
    }

    #[test]
    fn test_lotto_purchase_without_status_is_a_failure() {
        let notice = render_lotto_purchase(&LottoPurchase::default()).unwrap();

        assert_eq!(notice, Notice::Upstream("FAILURE".to_string()));
    }

    #[test]
    fn test_lotto_purchase_success_missing_balance_is_an_error() {
        let purchase = LottoPurchase::from_json(
            r#"{"result": {"resultMsg": "SUCCESS", "buyRound": 1100, "arrGameChoiceNum": []}}"#,
        )
        .unwrap();
        let recorder = Recorder::default();

        assert!(Notifier::new(&recorder).lotto_purchase(&purchase).is_err());
        assert!(sent(&recorder).is_empty());
    }

    #[test]
    fn test_win720_purchase_success() {
        let purchase = Win720Purchase::from_json(
            r#"{
                "resultCode": "100",
                "resultMsg": "SUCCESS|2|5000|215|",
                "saleTicket": "4123456,5654321",
                "balance": 10000
            }"#,
        )
        .unwrap();

        let notice = render_win720_purchase(&purchase).unwrap();

        assert_eq!(
            notice.text(),
            "215회 연금복권 구매 완료\n남은잔액 : 10000\n\
             ```\n4조 1 2 3 4 5 6\n5조 6 5 4 3 2 1```"
        );
    }

    #[test]
    fn test_win720_purchase_other_code_is_forwarded() {
        let purchase =
            Win720Purchase::from_json(r#"{"resultCode": "200", "resultMsg": "잔액 부족"}"#)
                .unwrap();
        assert_eq!(
            render_win720_purchase(&purchase).unwrap(),
            Notice::Upstream("잔액 부족".to_string())
        );

        // The success code is the string "100", not the number.
        let purchase =
            Win720Purchase::from_json(r#"{"resultCode": 100, "resultMsg": "a|b|c|1"}"#).unwrap();
        assert_eq!(
            render_win720_purchase(&purchase).unwrap(),
            Notice::Upstream("a|b|c|1".to_string())
        );
    }

    #[test]
    fn test_win720_purchase_without_round_segment_is_an_error() {
        let purchase = Win720Purchase::from_json(
            r#"{
                "resultCode": "100",
                "resultMsg": "SUCCESS|2",
                "saleTicket": "4123456",
                "balance": 0
            }"#,
        )
        .unwrap();

        assert!(render_win720_purchase(&purchase).is_err());
    }

    #[test]
    fn test_lotto_winning_table_with_prize() {
        let winning = LottoWinning::from_json(
            r#"{
                "round": 1100,
                "money": "5,000원",
                "lotto_details": [
                    {
                        "label": "A",
                        "status": "5등",
                        "result": ["✨1", "✨12", "✨33", "40", "41", "45"]
                    },
                    {"label": "B", "status": "낙첨", "result": ["2", "3", "4", "5", "6", "7"]}
                ]
            }"#,
        )
        .unwrap();

        let notice = render_lotto_winning(&winning).unwrap();

        let line_a = [
            "A 5등", "  [01]", "  [12]", "  [33]", "   40 ", "   41 ", "   45 ",
        ]
        .join(" ");
        let line_b = [
            "B 낙첨", "   02 ", "   03 ", "   04 ", "   05 ", "   06 ", "   07 ",
        ]
        .join(" ");
        assert_eq!(
            notice,
            Notice::Message(format!(
                "```ini\n{}\n{}```\n로또 *1100회* - *5,000원* 당첨 되었습니다 🎉",
                line_a, line_b
            ))
        );
    }

    #[test]
    fn test_lotto_winning_no_win() {
        let winning = LottoWinning::from_json(
            r#"{
                "round": "1100",
                "money": "-",
                "lotto_details": [{"label": "A", "status": "낙첨", "result": ["1"]}]
            }"#,
        )
        .unwrap();

        let notice = render_lotto_winning(&winning).unwrap();

        assert!(notice.text().ends_with("\n로또 *1100회* - 다음 기회에... 🫠"));
        assert!(!notice.is_fallback());
    }

    #[test]
    fn test_lotto_winning_missing_round_falls_back() {
        let recorder = Recorder::default();
        let winning = LottoWinning::from_json(
            r#"{
                "money": "5,000원",
                "lotto_details": [{"label": "A", "status": "5등", "result": ["✨1"]}]
            }"#,
        )
        .unwrap();

        let notice = Notifier::new(&recorder).lotto_winning(&winning).unwrap();

        assert_eq!(notice, Notice::Fallback(LOTTO_FALLBACK));
        assert_eq!(sent(&recorder), vec![LOTTO_FALLBACK]);
    }

    #[test]
    fn test_lotto_winning_missing_detail_key_falls_back() {
        let winning = LottoWinning::from_json(
            r#"{"round": 1100, "money": "-", "lotto_details": [{"label": "A", "result": ["1"]}]}"#,
        )
        .unwrap();

        assert_eq!(render_lotto_winning(&winning).unwrap(), Notice::Fallback(LOTTO_FALLBACK));
    }

    #[test]
    fn test_lotto_winning_malformed_number_is_an_error() {
        let winning = LottoWinning::from_json(
            r#"{
                "round": 1100,
                "money": "-",
                "lotto_details": [{"label": "A", "status": "낙첨", "result": ["?"]}]
            }"#,
        )
        .unwrap();

        assert!(render_lotto_winning(&winning).is_err());
    }

    #[test]
    fn test_win720_winning() {
        let winning =
            Win720Winning::from_json(r#"{"round": 215, "money": [1000000, 100000]}"#).unwrap();

        let notice = render_win720_winning(&winning).unwrap();

        assert_eq!(
            notice.text(),
            "연금복권 *215회* - 1,000,000원, 100,000원,\n\
             총 *1,100,000원* 당첨 되었습니다 🎉"
        );
    }

    #[test]
    fn test_win720_winning_empty_money_falls_back() {
        let winning = Win720Winning::from_json(r#"{"round": 215, "money": []}"#).unwrap();

        assert_eq!(render_win720_winning(&winning).unwrap(), Notice::Fallback(WIN720_FALLBACK));
    }

    #[test]
    fn test_win720_winning_missing_round_falls_back() {
        let winning = Win720Winning::from_json(r#"{"money": [1000]}"#).unwrap();

        assert!(render_win720_winning(&winning).unwrap().is_fallback());
    }

    #[test]
    fn test_delivery_errors_propagate() {
        let winning = Win720Winning::from_json(r#"{"round": 215, "money": [1000]}"#).unwrap();

        let err = Notifier::new(Unreachable).win720_winning(&winning).unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_fallback_delivery_errors_propagate() {
        let winning = Win720Winning::default();

        assert!(Notifier::new(Unreachable).win720_winning(&winning).is_err());
    }
}
