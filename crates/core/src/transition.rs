//! The status/payment transition table.
//!
//! Maps an action to the next `(status, payment)` pair. Deliberately
//! unconditional on the booking's prior state: the admin UI restricts
//! which actions it offers per state, but the engine applies any of the
//! four verbs from any state. Only the four cells this table produces are
//! ever written by the engine; other combinations found in storage are
//! legacy/external and survive untouched until the next recognized action.

use crate::action::Action;
use crate::status::{BookingStatus, PaymentStatus};

/// Effect of a transition on the payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEffect {
    /// Write this canonical value (subject to the schema shim's label mapping).
    Set(PaymentStatus),
    /// Carry the booking's current stored payment label forward verbatim,
    /// including legacy or unknown labels.
    Unchanged,
}

/// Outcome of the transition table for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: BookingStatus,
    pub payment: PaymentEffect,
}

/// The transition table.
///
/// | action   | status      | payment             |
/// |----------|-------------|---------------------|
/// | paid     | Confirmed   | Partial Payment     |
/// | checkin  | Checked-in  | Partial Payment     |
/// | checkout | Checked-out | Payment Complete    |
/// | cancel   | Cancelled   | unchanged           |
pub fn transition(action: Action) -> Transition {
    match action {
        Action::Paid => Transition {
            status: BookingStatus::Confirmed,
            payment: PaymentEffect::Set(PaymentStatus::PartialPayment),
        },
        Action::CheckIn => Transition {
            status: BookingStatus::CheckedIn,
            payment: PaymentEffect::Set(PaymentStatus::PartialPayment),
        },
        Action::CheckOut => Transition {
            status: BookingStatus::CheckedOut,
            payment: PaymentEffect::Set(PaymentStatus::PaymentComplete),
        },
        Action::Cancel => Transition {
            status: BookingStatus::Cancelled,
            payment: PaymentEffect::Unchanged,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_confirms_with_partial_payment() {
        let t = transition(Action::Paid);
        assert_eq!(t.status, BookingStatus::Confirmed);
        assert_eq!(t.payment, PaymentEffect::Set(PaymentStatus::PartialPayment));
    }

    #[test]
    fn checkin_keeps_partial_payment() {
        let t = transition(Action::CheckIn);
        assert_eq!(t.status, BookingStatus::CheckedIn);
        assert_eq!(t.payment, PaymentEffect::Set(PaymentStatus::PartialPayment));
    }

    #[test]
    fn checkout_completes_payment() {
        let t = transition(Action::CheckOut);
        assert_eq!(t.status, BookingStatus::CheckedOut);
        assert_eq!(t.payment, PaymentEffect::Set(PaymentStatus::PaymentComplete));
    }

    #[test]
    fn cancel_leaves_payment_untouched() {
        let t = transition(Action::Cancel);
        assert_eq!(t.status, BookingStatus::Cancelled);
        assert_eq!(t.payment, PaymentEffect::Unchanged);
    }

    #[test]
    fn table_is_total_over_actions() {
        // Every recognized action maps to exactly one of the four cells.
        for action in Action::ALL {
            let t = transition(action);
            assert!(matches!(
                (t.status, t.payment),
                (BookingStatus::Confirmed, PaymentEffect::Set(PaymentStatus::PartialPayment))
                    | (BookingStatus::CheckedIn, PaymentEffect::Set(PaymentStatus::PartialPayment))
                    | (
                        BookingStatus::CheckedOut,
                        PaymentEffect::Set(PaymentStatus::PaymentComplete)
                    )
                    | (BookingStatus::Cancelled, PaymentEffect::Unchanged)
            ));
        }
    }
}
