//! SSN validity classification against the SSA issuance rules named in the
//! design. Returns `"0"` for valid, `"1"` for invalid — the design
//! standardizes on this polarity (0 = valid) rather than the historically
//! inconsistent `valid_ssn`/`ssn_invalid` naming.

const ADVERTISING_SSNS: [&str; 2] = ["078051120", "219099999"];

pub const VALID: &str = "0";
pub const INVALID: &str = "1";

/// Normalize `raw` to its digits and classify it. Any non-digit characters
/// (dashes, spaces, etc.) are removed before classification.
pub fn validate_ssn(raw: &str) -> &'static str {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 9 {
        return INVALID;
    }
    let area = &digits[0..3];
    let group = &digits[3..5];
    let serial = &digits[5..9];

    if area == "000" || area == "666" || area.starts_with('9') {
        return INVALID;
    }
    if group == "00" {
        return INVALID;
    }
    if serial == "0000" {
        return INVALID;
    }
    if ADVERTISING_SSNS.contains(&digits.as_str()) {
        return INVALID;
    }
    VALID
}

/// Strip every non-digit character from a raw SSN cell, as the splitter does
/// before retaining a field for post-pass validation.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
