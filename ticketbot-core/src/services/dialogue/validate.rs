// File: ticketbot-core/src/services/dialogue/validate.rs

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;
use ticketbot_common::models::EVENT_DATE_FORMAT;

/// A rejected answer. The dialogue stays where it is and the message is
/// shown to the user as the re-prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a positive number, for example 1500 or 1500.50.")]
    Price,

    #[error("Please enter the date as YYYY-MM-DD HH:MM, for example 2025-05-17 19:00.")]
    Date,

    #[error("Please answer 'Yes' or 'No'.")]
    SaleFlag,

    #[error("Please send a link starting with http:// or https://.")]
    Link,

    #[error("This field cannot be empty.")]
    Empty,

    #[error("Please send a text message.")]
    Text,

    #[error("Please send a photo.")]
    Photo,

    #[error("Please share your own contact using the button below.")]
    OwnContact,
}

const YES_TOKENS: [&str; 4] = ["да", "yes", "true", "1"];
const NO_TOKENS: [&str; 4] = ["нет", "no", "false", "0"];
const NO_ALBUM_TOKENS: [&str; 2] = ["no", "нет"];

/// The reserved word that abandons a text dialogue.
pub const CANCEL_TOKEN: &str = "cancel";

pub fn is_cancel(input: &str) -> bool {
    input.trim().to_lowercase() == CANCEL_TOKEN
}

pub fn non_empty(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(trimmed.to_string())
}

pub fn parse_price(input: &str) -> Result<Decimal, ValidationError> {
    let price: Decimal = input
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| ValidationError::Price)?;
    if price <= Decimal::ZERO {
        return Err(ValidationError::Price);
    }
    Ok(price)
}

/// `YYYY-MM-DD HH:MM`, calendar-checked.
pub fn parse_event_date(input: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(input.trim(), EVENT_DATE_FORMAT).map_err(|_| ValidationError::Date)
}

pub fn parse_sale_flag(input: &str) -> Result<bool, ValidationError> {
    let token = input.trim().to_lowercase();
    if YES_TOKENS.contains(&token.as_str()) {
        Ok(true)
    } else if NO_TOKENS.contains(&token.as_str()) {
        Ok(false)
    } else {
        Err(ValidationError::SaleFlag)
    }
}

/// `None` when the admin answers that there is no album.
pub fn parse_album_link(input: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = input.trim();
    if NO_ALBUM_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
        return Ok(None);
    }
    parse_link(trimmed).map(Some)
}

pub fn parse_link(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|_| ValidationError::Link)?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(trimmed.to_string()),
        _ => Err(ValidationError::Link),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_price_accepts_positive_decimals() {
        assert_eq!(parse_price("1500").unwrap(), Decimal::new(1500, 0));
        assert_eq!(parse_price(" 99.90 ").unwrap(), Decimal::new(9990, 2));
        assert_eq!(parse_price("12,5").unwrap(), Decimal::new(125, 1));
    }

    #[test]
    fn test_price_rejects_zero_negative_and_text() {
        assert_eq!(parse_price("0"), Err(ValidationError::Price));
        assert_eq!(parse_price("-10"), Err(ValidationError::Price));
        assert_eq!(parse_price("free"), Err(ValidationError::Price));
        assert_eq!(parse_price(""), Err(ValidationError::Price));
    }

    #[test]
    fn test_date_parses_fixed_pattern() {
        let dt = parse_event_date("2025-05-17 19:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 5, 17));
        assert_eq!((dt.hour(), dt.minute()), (19, 0));
    }

    #[test]
    fn test_date_rejects_invalid_month() {
        assert_eq!(parse_event_date("2025-13-01 10:00"), Err(ValidationError::Date));
    }

    #[test]
    fn test_date_rejects_other_shapes() {
        assert_eq!(parse_event_date("17.05.2025 19:00"), Err(ValidationError::Date));
        assert_eq!(parse_event_date("2025-05-17"), Err(ValidationError::Date));
        assert_eq!(parse_event_date("2025-02-30 10:00"), Err(ValidationError::Date));
    }

    #[test]
    fn test_sale_flag_vocabulary_is_case_insensitive() {
        for yes in ["Да", "YES", "true", "1"] {
            assert_eq!(parse_sale_flag(yes), Ok(true), "{yes}");
        }
        for no in ["нет", "No", "FALSE", "0"] {
            assert_eq!(parse_sale_flag(no), Ok(false), "{no}");
        }
        assert_eq!(parse_sale_flag("maybe"), Err(ValidationError::SaleFlag));
    }

    #[test]
    fn test_album_link_no_means_none() {
        assert_eq!(parse_album_link("No"), Ok(None));
        assert_eq!(parse_album_link("нет"), Ok(None));
        assert_eq!(
            parse_album_link("https://photos.example.com/a/1"),
            Ok(Some("https://photos.example.com/a/1".to_string()))
        );
        assert_eq!(parse_album_link("later"), Err(ValidationError::Link));
    }

    #[test]
    fn test_link_requires_http_scheme() {
        assert!(parse_link("https://pay.example.com/donate").is_ok());
        assert_eq!(parse_link("ftp://pay.example.com"), Err(ValidationError::Link));
        assert_eq!(parse_link("pay.example.com"), Err(ValidationError::Link));
    }

    #[test]
    fn test_cancel_token() {
        assert!(is_cancel("Cancel"));
        assert!(is_cancel("  CANCEL "));
        assert!(!is_cancel("cancelled"));
    }
}
