//! Display helpers for audit log snapshots.

/// Sentinel shown when a booking has neither a room number nor a room type.
pub const ROOM_SENTINEL: &str = "—";

/// Trim and collapse internal whitespace runs (spaces, tabs, newlines) to
/// single spaces.
///
/// Guest names occasionally arrive with embedded newlines from the booking
/// form; logs render one row per line, so the name must stay single-line.
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

/// Display label for a booking's room.
///
/// Prefers the assigned room number (`"Room {n}"`), falls back to the room
/// type name, then to [`ROOM_SENTINEL`] when the booking has neither (room
/// assignment may be deferred).
pub fn room_label(room_number: Option<&str>, room_type: Option<&str>) -> String {
    match room_number {
        Some(n) if !n.is_empty() => format!("Room {}", n),
        _ => match room_type {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => ROOM_SENTINEL.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_newlines_and_tabs_to_single_spaces() {
        assert_eq!(collapse_whitespace("Maria\ndel  Carmen\tRuiz"), "Maria del Carmen Ruiz");
    }

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        assert_eq!(collapse_whitespace("  John Smith \n"), "John Smith");
    }

    #[test]
    fn collapsed_names_never_contain_newlines_or_double_spaces() {
        let inputs = ["a\n\nb", "a \r\n b", "\t\ta\t\tb\t\t", "a", ""];
        for input in inputs {
            let out = collapse_whitespace(input);
            assert!(!out.contains('\n'), "{:?}", out);
            assert!(!out.contains("  "), "{:?}", out);
        }
    }

    #[test]
    fn room_label_prefers_room_number() {
        assert_eq!(room_label(Some("204"), Some("Deluxe")), "Room 204");
    }

    #[test]
    fn room_label_falls_back_to_room_type() {
        assert_eq!(room_label(None, Some("Deluxe")), "Deluxe");
        assert_eq!(room_label(Some(""), Some("Deluxe")), "Deluxe");
    }

    #[test]
    fn room_label_sentinel_when_nothing_assigned() {
        assert_eq!(room_label(None, None), ROOM_SENTINEL);
        assert_eq!(room_label(Some(""), Some("")), ROOM_SENTINEL);
    }
}
