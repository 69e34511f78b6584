//! Date normalization: parse a raw value against one or more `strptime`-style
//! templates and re-render it in the single canonical output format used
//! across an entire release.

use chrono::NaiveDate;

/// The date format every output file uses, regardless of how a field's own
/// input format was declared.
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Render an already-parsed date in the canonical output format.
pub fn render(date: NaiveDate) -> String {
    date.format(OUTPUT_DATE_FORMAT).to_string()
}

/// Parse `raw` against each `|`-separated alternate in `format`, in order,
/// returning the first successful parse re-rendered as `YYYY-MM-DD`. Returns
/// an empty string (not an error) on total failure, matching the
/// "recoverable, logged at debug" parse-error semantics of the pipeline: a
/// field that failed to parse still needs its column emitted, just empty.
pub fn parse_and_render(raw: &str, format: &str) -> String {
    for alt in format.split('|') {
        if let Some(date) = try_parse(raw, alt) {
            return render(date);
        }
    }
    log::debug!("unable to parse {raw:?} as date with any of {format:?}");
    String::new()
}

fn try_parse(raw: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, fmt).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_matching_alternate() {
        assert_eq!(
            parse_and_render("03/02/1970", "%m/%d/%Y|%Y%m%d"),
            "1970-03-02"
        );
        assert_eq!(
            parse_and_render("19700302", "%m/%d/%Y|%Y%m%d"),
            "1970-03-02"
        );
    }

    #[test]
    fn unparseable_value_yields_empty_string() {
        assert_eq!(parse_and_render("not-a-date", "%m/%d/%Y|%Y%m%d"), "");
    }

    #[test]
    fn default_format_is_compact_iso_basic() {
        assert_eq!(parse_and_render("20030115", "%Y%m%d"), "2003-01-15");
    }
}
