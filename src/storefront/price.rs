//! Price text normalization for yen-formatted strings.

/// Yen glyphs used by the storefront (fullwidth and halfwidth).
const YEN_SIGNS: [char; 2] = ['￥', '¥'];

/// Parses a yen price like "￥1,234" into a whole number.
///
/// Currency glyphs and thousands separators are dropped, then the first
/// run of ASCII digits is read. Returns `None` for empty text, text without
/// digits, or a digit run that does not fit in a `u64`.
pub fn parse_price(text: &str) -> Option<u64> {
    let cleaned: String =
        text.chars().filter(|c| !YEN_SIGNS.contains(c) && *c != ',').collect();

    let digits: String = cleaned
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}
