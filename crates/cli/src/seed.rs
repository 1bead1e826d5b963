//! Demo bookings for local development and integration tests.

use frontdesk_storage::{BookingRecord, BookingStorage, MemoryStorage, StorageError};
use rust_decimal::Decimal;

fn booking(
    booking_id: &str,
    guest_name: &str,
    email: &str,
    room_number: Option<&str>,
    room_type: Option<&str>,
    status: &str,
    payment_status: &str,
    check_in: &str,
    check_out: &str,
    total_price: Decimal,
    created_at: &str,
) -> BookingRecord {
    BookingRecord {
        booking_id: booking_id.to_string(),
        user_id: format!("user-{}", &booking_id[2..]),
        guest_name: guest_name.to_string(),
        email: email.to_string(),
        room_number: room_number.map(|r| r.to_string()),
        room_type: room_type.map(|r| r.to_string()),
        status: status.to_string(),
        payment_status: payment_status.to_string(),
        check_in: check_in.to_string(),
        check_out: check_out.to_string(),
        check_in_time: None,
        check_out_time: None,
        total_price,
        adults: 2,
        children: 0,
        created_at: created_at.to_string(),
    }
}

/// The demo data set. On the legacy profile the partial-payment booking
/// carries the pre-migration `Paid` label, since that is what the narrower
/// column accepts.
pub fn demo_bookings(legacy: bool) -> Vec<BookingRecord> {
    let partial = if legacy { "Paid" } else { "Partial Payment" };
    vec![
        booking(
            "BK1001",
            "Alice Moore",
            "alice@example.com",
            Some("101"),
            Some("Standard"),
            "Confirmed",
            "Pending",
            "2025-09-01",
            "2025-09-04",
            Decimal::new(36000, 2),
            "2025-08-20T09:15:00Z",
        ),
        booking(
            "BK1002",
            "Bob Stone",
            "bob@example.com",
            Some("204"),
            Some("Deluxe"),
            "Confirmed",
            partial,
            "2025-09-02",
            "2025-09-06",
            Decimal::new(78000, 2),
            "2025-08-21T11:40:00Z",
        ),
        booking(
            "BK1003",
            "Carol Reyes",
            "carol@example.com",
            None,
            Some("Suite"),
            "Confirmed",
            "Pending",
            "2025-09-03",
            "2025-09-05",
            Decimal::new(52000, 2),
            "2025-08-22T16:05:00Z",
        ),
    ]
}

/// Load the demo set into the store, one transaction for the batch.
pub async fn seed_demo(storage: &MemoryStorage, legacy: bool) -> Result<usize, StorageError> {
    let records = demo_bookings(legacy);
    let count = records.len();
    let mut snap = storage.begin_snapshot().await?;
    for record in records {
        storage.create_booking(&mut snap, record).await?;
    }
    storage.commit_snapshot(snap).await?;
    Ok(count)
}
