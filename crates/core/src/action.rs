//! Front-desk actions.
//!
//! The four verbs a desk agent can apply to a booking. Raw request strings
//! are normalized (trimmed, lowercased) before matching, so `" Paid "` and
//! `"paid"` are the same action. Anything else is rejected up front by the
//! executor, before any storage work.

use std::fmt;

/// One of the four recognized front-desk verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Paid,
    CheckIn,
    CheckOut,
    Cancel,
}

impl Action {
    /// Parse a raw action string. Trims and lowercases before matching.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "paid" => Some(Action::Paid),
            "checkin" => Some(Action::CheckIn),
            "checkout" => Some(Action::CheckOut),
            "cancel" => Some(Action::Cancel),
            _ => None,
        }
    }

    /// The wire verb as accepted in request bodies.
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Paid => "paid",
            Action::CheckIn => "checkin",
            Action::CheckOut => "checkout",
            Action::Cancel => "cancel",
        }
    }

    /// Human label recorded in the audit log's `last_action` column.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Paid => "Paid",
            Action::CheckIn => "Check-in",
            Action::CheckOut => "Check-out",
            Action::Cancel => "Cancel",
        }
    }

    /// All four actions, in lifecycle order.
    pub const ALL: [Action; 4] = [Action::Paid, Action::CheckIn, Action::CheckOut, Action::Cancel];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_four_verbs() {
        assert_eq!(Action::parse("paid"), Some(Action::Paid));
        assert_eq!(Action::parse("checkin"), Some(Action::CheckIn));
        assert_eq!(Action::parse("checkout"), Some(Action::CheckOut));
        assert_eq!(Action::parse("cancel"), Some(Action::Cancel));
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(Action::parse("  PAID "), Some(Action::Paid));
        assert_eq!(Action::parse("CheckIn"), Some(Action::CheckIn));
        assert_eq!(Action::parse("\tcancel\n"), Some(Action::Cancel));
    }

    #[test]
    fn rejects_unknown_verbs() {
        assert_eq!(Action::parse("refund"), None);
        assert_eq!(Action::parse("check-in"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn labels_match_audit_log_values() {
        assert_eq!(Action::Paid.label(), "Paid");
        assert_eq!(Action::CheckIn.label(), "Check-in");
        assert_eq!(Action::CheckOut.label(), "Check-out");
        assert_eq!(Action::Cancel.label(), "Cancel");
    }

    #[test]
    fn verbs_round_trip_through_parse() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.verb()), Some(action));
        }
    }
}
