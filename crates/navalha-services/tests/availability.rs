//! Availability calculator tests over the in-memory store

mod support;

use chrono::{NaiveDate, NaiveTime as Time, Utc, Weekday};
use navalha_core::{
    models::{Appointment, AppointmentStatus, DayHours, NewAppointment, WeeklySchedule},
    AppError,
};
use navalha_services::AvailabilityService;
use std::sync::Arc;
use support::MemoryStore;
use uuid::Uuid;

fn service(store: &Arc<MemoryStore>) -> AvailabilityService<MemoryStore, MemoryStore> {
    AvailabilityService::new(store.clone(), store.clone())
}

fn appointment(staff_id: Uuid, date: &str, time: (u32, u32), status: AppointmentStatus) -> Appointment {
    let mut a = Appointment::new(
        NewAppointment {
            client_id: Uuid::new_v4(),
            staff_id,
            service_type: "corte".to_string(),
            date: date.parse::<NaiveDate>().unwrap(),
            start_time: Time::from_hms_opt(time.0, time.1, 0).unwrap(),
            notes: None,
            price: None,
        },
        Utc::now(),
    );
    a.status = status;
    a
}

// 2025-06-02 is a Monday, 2025-06-08 a Sunday.

#[tokio::test]
async fn test_default_monday_has_twenty_slots() {
    let store = Arc::new(MemoryStore::new());
    let slots = service(&store)
        .available_slots("2025-06-02", None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 20);
    assert_eq!(slots[0], Time::from_hms_opt(8, 0, 0).unwrap());
    assert_eq!(*slots.last().unwrap(), Time::from_hms_opt(17, 30, 0).unwrap());
}

#[tokio::test]
async fn test_default_saturday_closes_earlier() {
    let store = Arc::new(MemoryStore::new());
    let slots = service(&store)
        .available_slots("2025-06-07", None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 16);
    assert_eq!(*slots.last().unwrap(), Time::from_hms_opt(15, 30, 0).unwrap());
}

#[tokio::test]
async fn test_closed_day_is_empty() {
    let store = Arc::new(MemoryStore::new());
    let slots = service(&store)
        .available_slots("2025-06-08", None)
        .await
        .unwrap();

    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_malformed_date_rejected() {
    let store = Arc::new(MemoryStore::new());
    let err = service(&store)
        .available_slots("06/02/2025", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_active_bookings_hide_slots() {
    let store = Arc::new(MemoryStore::new());
    let staff_id = Uuid::new_v4();

    store.insert_appointment(appointment(
        staff_id,
        "2025-06-02",
        (9, 0),
        AppointmentStatus::Scheduled,
    ));
    store.insert_appointment(appointment(
        staff_id,
        "2025-06-02",
        (9, 30),
        AppointmentStatus::Confirmed,
    ));

    let slots = service(&store)
        .available_slots("2025-06-02", None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 18);
    assert!(!slots.contains(&Time::from_hms_opt(9, 0, 0).unwrap()));
    assert!(!slots.contains(&Time::from_hms_opt(9, 30, 0).unwrap()));
}

#[tokio::test]
async fn test_cancelled_booking_frees_its_slot() {
    let store = Arc::new(MemoryStore::new());

    store.insert_appointment(appointment(
        Uuid::new_v4(),
        "2025-06-02",
        (9, 0),
        AppointmentStatus::Cancelled,
    ));

    let slots = service(&store)
        .available_slots("2025-06-02", None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 20);
}

#[tokio::test]
async fn test_staff_filter_ignores_other_staff() {
    let store = Arc::new(MemoryStore::new());
    let mine = Uuid::new_v4();
    let other = Uuid::new_v4();

    store.insert_appointment(appointment(
        other,
        "2025-06-02",
        (9, 0),
        AppointmentStatus::Scheduled,
    ));

    // Unfiltered, the 09:00 slot is taken
    let all = service(&store)
        .available_slots("2025-06-02", None)
        .await
        .unwrap();
    assert!(!all.contains(&Time::from_hms_opt(9, 0, 0).unwrap()));

    // For this staff member it is still open
    let filtered = service(&store)
        .available_slots("2025-06-02", Some(mine))
        .await
        .unwrap();
    assert!(filtered.contains(&Time::from_hms_opt(9, 0, 0).unwrap()));
}

#[tokio::test]
async fn test_configured_schedule_overrides_default() {
    let store = Arc::new(MemoryStore::new());

    let mut schedule = WeeklySchedule::closed();
    schedule.set(
        Weekday::Mon,
        Some(
            DayHours::new(
                Time::from_hms_opt(10, 0, 0).unwrap(),
                Time::from_hms_opt(12, 0, 0).unwrap(),
            )
            .unwrap(),
        ),
    );
    {
        use navalha_core::traits::BusinessHoursRepository;
        store.put(&schedule, Utc::now()).await.unwrap();
    }

    let monday = service(&store)
        .available_slots("2025-06-02", None)
        .await
        .unwrap();
    assert_eq!(monday.len(), 4);
    assert_eq!(monday[0], Time::from_hms_opt(10, 0, 0).unwrap());

    // Tuesday is closed under the configured schedule
    let tuesday = service(&store)
        .available_slots("2025-06-03", None)
        .await
        .unwrap();
    assert!(tuesday.is_empty());
}
