//! Read-side filtering, sorting, and pagination over the audit log.
//!
//! The log table is small enough to filter in memory; all semantics live
//! here so the HTTP surface stays a thin adapter.

use frontdesk_storage::BookingLogRecord;

/// Fixed page size for log listings.
pub const PAGE_SIZE: usize = 10;

/// Normalize a raw filter query value: trimmed, with empty strings and the
/// UI's `All` placeholder treated as unset.
pub fn filter_value(raw: Option<String>) -> Option<String> {
    let value = raw?.trim().to_string();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value)
    }
}

/// Filter over audit log rows. All fields are conjunctive; `None` matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Case-insensitive substring over log id, booking id, guest name,
    /// room label, and room number.
    pub search: Option<String>,
    /// Exact booking status label.
    pub status: Option<String>,
    /// Exact payment status label, matched against the stored label.
    pub payment_status: Option<String>,
    /// Case-insensitive substring over the room label.
    pub room_type: Option<String>,
    /// Inclusive lower bound on the check-in date (`YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Inclusive upper bound on the check-in date.
    pub date_to: Option<String>,
}

/// The check-in value may be a bare date or a full timestamp; range
/// filtering compares the date part only.
fn check_in_date(row: &BookingLogRecord) -> &str {
    let s = row.check_in.as_str();
    if s.len() > 10 {
        &s[..10]
    } else {
        s
    }
}

impl LogFilter {
    pub fn matches(&self, row: &BookingLogRecord) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = row.log_id.to_string().contains(&needle)
                || row.booking_id.to_lowercase().contains(&needle)
                || row.guest_name.to_lowercase().contains(&needle)
                || row.room.to_lowercase().contains(&needle)
                || row
                    .room_number
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if row.status != *status {
                return false;
            }
        }
        if let Some(payment) = &self.payment_status {
            if row.payment_status != *payment {
                return false;
            }
        }
        if let Some(room_type) = &self.room_type {
            if !row
                .room
                .to_lowercase()
                .contains(&room_type.to_lowercase())
            {
                return false;
            }
        }
        if let Some(from) = &self.date_from {
            if check_in_date(row) < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.date_to {
            if check_in_date(row) > to.as_str() {
                return false;
            }
        }
        true
    }
}

/// A sortable log column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    LogId,
    BookingId,
    GuestName,
    PaymentStatus,
    Status,
    Room,
    CheckIn,
    CheckOut,
    LastAction,
    ActionTimestamp,
    PerformedBy,
}

impl SortField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "log_id" => Some(SortField::LogId),
            "booking_id" => Some(SortField::BookingId),
            "guest_name" => Some(SortField::GuestName),
            "payment_status" => Some(SortField::PaymentStatus),
            "status" => Some(SortField::Status),
            "room" => Some(SortField::Room),
            "check_in" => Some(SortField::CheckIn),
            "check_out" => Some(SortField::CheckOut),
            "last_action" => Some(SortField::LastAction),
            "action_timestamp" => Some(SortField::ActionTimestamp),
            "performed_by" => Some(SortField::PerformedBy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "asc" => Some(SortDir::Asc),
            "desc" => Some(SortDir::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LogSort {
    pub field: SortField,
    pub dir: SortDir,
}

impl Default for LogSort {
    /// Newest activity first.
    fn default() -> Self {
        LogSort {
            field: SortField::ActionTimestamp,
            dir: SortDir::Desc,
        }
    }
}

fn compare(a: &BookingLogRecord, b: &BookingLogRecord, field: SortField) -> std::cmp::Ordering {
    match field {
        SortField::LogId => a.log_id.cmp(&b.log_id),
        SortField::BookingId => a.booking_id.cmp(&b.booking_id),
        SortField::GuestName => a.guest_name.cmp(&b.guest_name),
        SortField::PaymentStatus => a.payment_status.cmp(&b.payment_status),
        SortField::Status => a.status.cmp(&b.status),
        SortField::Room => a.room.cmp(&b.room),
        SortField::CheckIn => a.check_in.cmp(&b.check_in),
        SortField::CheckOut => a.check_out.cmp(&b.check_out),
        SortField::LastAction => a.last_action.cmp(&b.last_action),
        SortField::ActionTimestamp => a.action_timestamp.cmp(&b.action_timestamp),
        SortField::PerformedBy => a.performed_by.cmp(&b.performed_by),
    }
}

/// Apply filter then sort. Ties break by log id so equal keys keep
/// insertion order regardless of direction.
pub fn filter_and_sort(
    rows: Vec<BookingLogRecord>,
    filter: &LogFilter,
    sort: LogSort,
) -> Vec<BookingLogRecord> {
    let mut rows: Vec<BookingLogRecord> = rows.into_iter().filter(|r| filter.matches(r)).collect();
    rows.sort_by(|a, b| {
        let ord = compare(a, b, sort.field);
        let ord = match sort.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        ord.then(a.log_id.cmp(&b.log_id))
    });
    rows
}

/// One page of log rows plus totals for the pager.
#[derive(Debug, Clone)]
pub struct LogPage {
    pub rows: Vec<BookingLogRecord>,
    /// 1-based, clamped into range.
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slice one page out of filtered, sorted rows. Pages are 1-based; a page
/// beyond the end is clamped to the last page, and an empty result set
/// still reports one (empty) page.
pub fn paginate(rows: Vec<BookingLogRecord>, page: usize) -> LogPage {
    let total = rows.len();
    let total_pages = std::cmp::max(1, total.div_ceil(PAGE_SIZE));
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * PAGE_SIZE;
    let rows: Vec<BookingLogRecord> = rows
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .collect();
    LogPage {
        rows,
        page,
        page_size: PAGE_SIZE,
        total,
        total_pages,
    }
}
