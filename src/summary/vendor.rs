use std::sync::OnceLock;

use regex::Regex;

/// How many trailing words survive as the vendor label.
pub const VENDOR_TOKENS: usize = 3;

fn e_transfer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"E-TRANSFER\d+").expect("invalid e-transfer regex"))
}

fn masked_card_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}\*+\d*").expect("invalid masked card regex"))
}

fn numeric_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{6,}\s*").expect("invalid numeric prefix regex"))
}

fn memo_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"MEMO EMPTX-\d+\s*").expect("invalid memo id regex"))
}

/// Derives a short vendor label from a company/memo field.
///
/// Transfer codes, masked card numbers, a leading numeric prefix and memo
/// transaction IDs are stripped in that order, each rule seeing the output of
/// the previous one. The last three remaining words are the label. Text that
/// cleans down to nothing gives the empty label.
pub fn extract_vendor(company: &str) -> String {
    let company = e_transfer_re().replace_all(company, "");
    let company = masked_card_re().replace_all(&company, "");
    let company = numeric_prefix_re().replace(&company, "");
    let company = memo_id_re().replace_all(&company, "");

    let tokens: Vec<&str> = company.split_whitespace().collect();
    let keep_from = tokens.len().saturating_sub(VENDOR_TOKENS);

    tokens[keep_from..].join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_numeric_prefix_and_memo_id() {
        assert_eq!(
            extract_vendor("1234567 MEMO EMPTX-998877 PAYROLL DEPOSIT CO"),
            "PAYROLL DEPOSIT CO"
        );
    }

    #[test]
    fn test_masked_card_then_last_three_words() {
        assert_eq!(
            extract_vendor("4506****8888547 COFFEE SHOP DOWNTOWN LOCATION"),
            "SHOP DOWNTOWN LOCATION"
        );
    }

    #[test]
    fn test_e_transfer_code() {
        assert_eq!(extract_vendor("SEND E-TRANSFER1234567 JANE DOE"), "SEND JANE DOE");
        assert_eq!(extract_vendor("E-TRANSFER99 RENT"), "RENT");
    }

    #[test]
    fn test_masked_card_without_trailing_digits() {
        assert_eq!(extract_vendor("GROCER 4506*** MARKET"), "GROCER MARKET");
    }

    #[test]
    fn test_numeric_prefix_only_at_start() {
        assert_eq!(extract_vendor("ACME 12345678 WIDGETS"), "ACME 12345678 WIDGETS");
        // Five digits is too short to be a prefix.
        assert_eq!(extract_vendor("12345 ACME WIDGETS"), "12345 ACME WIDGETS");
    }

    #[test]
    fn test_rules_see_previous_output() {
        // The prefix rule has already run when the memo ID is removed.
        assert_eq!(extract_vendor("MEMO EMPTX-5 1234567 GYM"), "1234567 GYM");
        // Removing the transfer code leaves a space, so the digits are not leading.
        assert_eq!(extract_vendor("E-TRANSFER12 123456789 HYDRO"), "123456789 HYDRO");
    }

    #[test]
    fn test_fewer_than_three_words() {
        assert_eq!(extract_vendor("NETFLIX"), "NETFLIX");
        assert_eq!(extract_vendor("  UBER   EATS  "), "UBER EATS");
    }

    #[test]
    fn test_cleans_down_to_empty() {
        assert_eq!(extract_vendor(""), "");
        assert_eq!(extract_vendor("12345678"), "");
        assert_eq!(extract_vendor("MEMO EMPTX-1 "), "");
    }

    #[test]
    fn test_deterministic() {
        let company = "999999 MEMO EMPTX-12 ONLINE BANKING TRANSFER FEE";
        assert_eq!(extract_vendor(company), extract_vendor(company));
        assert_eq!(extract_vendor(company), "BANKING TRANSFER FEE");
    }
}
