use crate::payload::{required, LottoLine, PayloadError};
use regex::Regex;
use std::sync::LazyLock;

const MATCHED_MARKER: char = '✨';
const NUMBER_CELL_WIDTH: usize = 6;
const TICKET_GROUP_UNIT: &str = "조";
const CURRENCY_SUFFIX: &str = "원";

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Drops each line's trailing selection flag and turns `|` separators into spaces.
pub fn format_lotto_numbers<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| {
            let mut chars = line.as_ref().chars();
            chars.next_back();
            chars.as_str().replace('|', " ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `4123456` becomes `4조 1 2 3 4 5 6`, one group per line.
pub fn format_win720_tickets(tickets: &str) -> Result<String, PayloadError> {
    let groups = tickets
        .split(',')
        .map(|group| {
            let mut chars = group.chars();

            let Some(unit) = chars.next() else {
                return Err(PayloadError::malformed("saleTicket", "empty ticket group"));
            };

            let digits = chars.map(String::from).collect::<Vec<_>>().join(" ");

            Ok(format!("{}{} {}", unit, TICKET_GROUP_UNIT, digits))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(groups.join("\n"))
}

// Unicode decimal digits come in contiguous runs starting at zero, so a digit's value is its
// distance from the start of its run, modulo ten.
fn digit_value(c: char) -> u64 {
    if let Some(d) = c.to_digit(10) {
        return d.into();
    }

    let mut offset = 0;
    let mut code = u32::from(c);
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !NUMBER_REGEX.is_match(prev.encode_utf8(&mut [0; 4])) {
            break;
        }
        offset += 1;
        code -= 1;
    }

    offset % 10
}

// A token such as `✨07` is a matched number.
fn format_lotto_cell(token: &str) -> Result<String, PayloadError> {
    let Some(raw) = NUMBER_REGEX.find(token) else {
        return Err(PayloadError::malformed("result", format!("no number in `{}`", token)));
    };

    let number = raw
        .as_str()
        .chars()
        .try_fold(0u64, |n, c| n.checked_mul(10)?.checked_add(digit_value(c)))
        .ok_or_else(|| PayloadError::malformed("result", format!("`{}` is too large", token)))?;

    let cell = if token.contains(MATCHED_MARKER) {
        format!("[{:02}]", number)
    } else {
        format!(" {:02} ", number)
    };

    Ok(format!("{:>width$}", cell, width = NUMBER_CELL_WIDTH))
}

/// Renders the per-game result table. The `label status` column is padded to the widest
/// entry so the number columns line up.
pub fn format_lotto_lines(details: &[LottoLine]) -> Result<String, PayloadError> {
    let headings = details
        .iter()
        .map(|line| {
            let label = required(&line.label, "label")?;
            let status = required(&line.status, "status")?;
            Ok(format!("{} {}", label, status))
        })
        .collect::<Result<Vec<_>, PayloadError>>()?;

    let Some(width) = headings.iter().map(|h| h.chars().count()).max() else {
        return Err(PayloadError::malformed("lotto_details", "no lines"));
    };

    let mut formatted_lines = vec![];

    for (line, heading) in details.iter().zip(&headings) {
        let cells = required(&line.result, "result")?
            .iter()
            .map(|token| format_lotto_cell(token))
            .collect::<Result<Vec<_>, _>>()?;

        formatted_lines.push(format!("{:<width$} {}", heading, cells.join(" "), width = width));
    }

    Ok(formatted_lines.join("\n"))
}

/// `1000000` becomes `1,000,000원`.
pub fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut formatted =
        String::with_capacity(digits.len() + digits.len() / 3 + CURRENCY_SUFFIX.len());

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(c);
    }

    formatted.push_str(CURRENCY_SUFFIX);
    formatted
}
