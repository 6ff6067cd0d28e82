//! Numeric value matchers.
//!
//! Both matchers return the first left-to-right match in the whole text and
//! perform no range or unit validation.

use std::sync::LazyLock;

use regex::Regex;

/// Unsigned decimal immediately followed by `%`.
static PERCENTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("percentage pattern is valid"));

/// `$` or `₹` immediately followed by a digit group with optional thousands
/// separators and decimal portion.
static CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$₹](\d+(?:,\d+)*(?:\.\d+)?)").expect("currency pattern is valid")
});

/// First percentage in `text`, without the `%` sign.
pub fn extract_percentage(text: &str) -> Option<String> {
    PERCENTAGE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First currency amount in `text`, with thousands separators removed.
pub fn extract_currency(text: &str) -> Option<String> {
    CURRENCY
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace(',', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_first_match_wins() {
        assert_eq!(
            extract_percentage("efficacy was 85% in group a and 90% in group b"),
            Some("85".to_string())
        );
    }

    #[test]
    fn test_percentage_decimal() {
        assert_eq!(
            extract_percentage("sensitivity of 92.5% (95% ci)"),
            Some("92.5".to_string())
        );
    }

    #[test]
    fn test_percentage_no_range_validation() {
        assert_eq!(extract_percentage("a 500% increase"), Some("500".to_string()));
    }

    #[test]
    fn test_percentage_doubled_sign() {
        assert_eq!(extract_percentage("100%% sure"), Some("100".to_string()));
    }

    #[test]
    fn test_percentage_requires_adjacent_sign() {
        assert_eq!(extract_percentage("85 % of girls"), None);
        assert_eq!(extract_percentage("no numbers here"), None);
        assert_eq!(extract_percentage(""), None);
    }

    #[test]
    fn test_percentage_trailing_dot_not_consumed() {
        // "7.%" is not a match: the sign must follow a digit.
        assert_eq!(extract_percentage("7.% then 12%"), Some("12".to_string()));
    }

    #[test]
    fn test_currency_strips_separators() {
        assert_eq!(
            extract_currency("cost of $1,200.50 per dose"),
            Some("1200.50".to_string())
        );
    }

    #[test]
    fn test_currency_rupee() {
        assert_eq!(
            extract_currency("priced at ₹4,500 per course"),
            Some("4500".to_string())
        );
    }

    #[test]
    fn test_currency_first_match_wins() {
        assert_eq!(
            extract_currency("₹250 per session versus $12 abroad"),
            Some("250".to_string())
        );
    }

    #[test]
    fn test_currency_requires_adjacent_digits() {
        assert_eq!(extract_currency("cost in $ was high"), None);
        assert_eq!(extract_currency("usd 1,200"), None);
        assert_eq!(extract_currency(""), None);
    }
}
