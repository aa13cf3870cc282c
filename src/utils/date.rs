use std::sync::OnceLock;

use regex::Regex;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::{date, format_description};

/// Orange Book date text, e.g. `Jan 1, 1982` or `Aug 13, 2015`.
const ORANGE_BOOK_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// Approval dates before this are not recorded by the Orange Book.
pub(crate) const APPROVAL_DATE_FLOOR: Date = date!(1982 - 01 - 01);

/// How an approval date was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApprovalDateSource {
    Parsed,
    PriorTo1982,
    Fallback,
}

fn prior_to_1982_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)approved\s+prior\s+to\s+jan\s+1,\s*1982").expect("valid regex")
    })
}

pub(crate) fn parse_orange_book_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), ORANGE_BOOK_DATE).ok()
}

/// Parses a product approval date. Text that cannot be read is pinned to
/// [`APPROVAL_DATE_FLOOR`]; callers must surface [`ApprovalDateSource::Fallback`].
pub(crate) fn parse_approval_date(value: &str) -> (Date, ApprovalDateSource) {
    if prior_to_1982_re().is_match(value) {
        return (APPROVAL_DATE_FLOOR, ApprovalDateSource::PriorTo1982);
    }
    match parse_orange_book_date(value) {
        Some(parsed) => (parsed, ApprovalDateSource::Parsed),
        None => (APPROVAL_DATE_FLOOR, ApprovalDateSource::Fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unpadded_and_padded_days() {
        assert_eq!(parse_orange_book_date("Aug 3, 2015"), Some(date!(2015 - 08 - 03)));
        assert_eq!(parse_orange_book_date("Aug 13, 2015"), Some(date!(2015 - 08 - 13)));
        assert_eq!(
            parse_orange_book_date("  Dec 31, 2030 \r"),
            Some(date!(2030 - 12 - 31))
        );
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(parse_orange_book_date("2015-08-13"), None);
        assert_eq!(parse_orange_book_date(""), None);
        assert_eq!(parse_orange_book_date("Feb 30, 2015"), None);
    }

    #[test]
    fn floor_date_and_sentinel_agree() {
        assert_eq!(
            parse_approval_date("Jan 1, 1982"),
            (APPROVAL_DATE_FLOOR, ApprovalDateSource::Parsed)
        );
        assert_eq!(
            parse_approval_date("Approved Prior to Jan 1, 1982"),
            (APPROVAL_DATE_FLOOR, ApprovalDateSource::PriorTo1982)
        );
    }

    #[test]
    fn unparsable_approval_date_falls_back_to_floor() {
        assert_eq!(
            parse_approval_date("not a date"),
            (APPROVAL_DATE_FLOOR, ApprovalDateSource::Fallback)
        );
    }
}
