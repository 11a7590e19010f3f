use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref COUNTRY_CODE: Regex = Regex::new(r"^[A-Z]{2}$").unwrap();
}

/// 筛选控件输入的验证错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("Value {value} is out of range ({min}..={max})")]
    OutOfRange { value: u32, min: u32, max: u32 },

    #[error("Range minimum {min} is above maximum {max}")]
    InvertedRange { min: u32, max: u32 },

    #[error("Invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid country code: {0} (must be ISO 3166-1 format)")]
    InvalidCountryCode(String),

    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),

    #[error("Unknown release type: {0}")]
    UnknownReleaseType(String),
}

/// 数值输入解析：控件的值总是字符串，比较之前必须先转换成数字
pub struct NumberValidator;

impl NumberValidator {
    pub fn parse_bounded(input: &str, min: u32, max: u32) -> Result<u32, ValidationError> {
        let value: u32 = input
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidNumber(input.to_string()))?;

        if value < min || value > max {
            return Err(ValidationError::OutOfRange { value, min, max });
        }

        Ok(value)
    }
}

/// 日期输入解析，空字符串表示未设置
pub struct DateValidator;

impl DateValidator {
    pub fn parse_optional(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::InvalidDate(input.to_string()))
    }
}

pub struct StringValidator;

impl StringValidator {
    /// 规范化国家代码（大写），空字符串视为未选择
    pub fn normalize_country_code(code: &str) -> Result<Option<String>, ValidationError> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let upper = trimmed.to_ascii_uppercase();
        if !COUNTRY_CODE.is_match(&upper) {
            return Err(ValidationError::InvalidCountryCode(code.to_string()));
        }

        Ok(Some(upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounded() {
        assert_eq!(NumberValidator::parse_bounded("7", 0, 10), Ok(7));
        assert_eq!(NumberValidator::parse_bounded(" 400 ", 0, 400), Ok(400));
        assert_eq!(
            NumberValidator::parse_bounded("11", 0, 10),
            Err(ValidationError::OutOfRange { value: 11, min: 0, max: 10 })
        );
        assert!(matches!(
            NumberValidator::parse_bounded("abc", 0, 10),
            Err(ValidationError::InvalidNumber(_))
        ));
        assert!(NumberValidator::parse_bounded("-1", 0, 10).is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(DateValidator::parse_optional(""), Ok(None));
        assert_eq!(
            DateValidator::parse_optional("2020-02-29"),
            Ok(NaiveDate::from_ymd_opt(2020, 2, 29))
        );
        assert!(DateValidator::parse_optional("2021-02-29").is_err());
        assert!(DateValidator::parse_optional("29/02/2020").is_err());
    }

    #[test]
    fn test_normalize_country_code() {
        assert_eq!(
            StringValidator::normalize_country_code("fr"),
            Ok(Some("FR".to_string()))
        );
        assert_eq!(StringValidator::normalize_country_code(""), Ok(None));
        assert!(StringValidator::normalize_country_code("FRA").is_err());
        assert!(StringValidator::normalize_country_code("1A").is_err());
    }
}
