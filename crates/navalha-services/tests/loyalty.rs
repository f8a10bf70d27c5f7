//! Loyalty ledger tests over the in-memory store

mod support;

use chrono::{Duration, TimeZone, Utc};
use navalha_core::{
    models::{NewVoucherConfig, VoucherConfig, VoucherStatus},
    Clock, FixedClock,
};
use navalha_services::LoyaltyService;
use rust_decimal_macros::dec;
use std::sync::Arc;
use support::MemoryStore;
use uuid::Uuid;

fn config(services_required: i32, validity_days: i32) -> VoucherConfig {
    VoucherConfig::from_input(
        NewVoucherConfig {
            services_required,
            discount_percentage: 15,
            validity_days,
            description: Some("fidelidade".to_string()),
        },
        Utc::now(),
    )
}

fn fixture() -> (Arc<MemoryStore>, Arc<FixedClock>, LoyaltyService<MemoryStore, MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
    ));
    let service = LoyaltyService::new(store.clone(), store.clone(), clock.clone());
    (store, clock, service)
}

#[tokio::test]
async fn test_counter_created_lazily() {
    let (_, _, service) = fixture();
    let client_id = Uuid::new_v4();

    assert!(service.client_count(client_id).await.unwrap().is_none());

    let outcome = service
        .record_completed_service(client_id, dec!(40.00))
        .await
        .unwrap();

    assert_eq!(outcome.count.completed_services, 1);
    assert_eq!(outcome.count.total_spent, dec!(40.00));
    assert!(outcome.voucher.is_none());

    let stored = service.client_count(client_id).await.unwrap().unwrap();
    assert_eq!(stored.completed_services, 1);
}

#[tokio::test]
async fn test_no_active_config_still_counts() {
    let (_, _, service) = fixture();
    let client_id = Uuid::new_v4();

    for _ in 0..5 {
        let outcome = service
            .record_completed_service(client_id, dec!(10.00))
            .await
            .unwrap();
        assert!(outcome.voucher.is_none());
    }

    let count = service.client_count(client_id).await.unwrap().unwrap();
    assert_eq!(count.completed_services, 5);
    assert_eq!(count.total_spent, dec!(50.00));
}

#[tokio::test]
async fn test_voucher_issued_at_threshold() {
    let (store, clock, service) = fixture();
    store.activate_config(config(5, 30));
    let client_id = Uuid::new_v4();

    for i in 1..=4 {
        let outcome = service
            .record_completed_service(client_id, dec!(30.00))
            .await
            .unwrap();
        assert_eq!(outcome.count.completed_services, i);
        assert!(outcome.voucher.is_none());
    }

    let outcome = service
        .record_completed_service(client_id, dec!(30.00))
        .await
        .unwrap();
    let voucher = outcome.voucher.expect("fifth service mints a voucher");

    assert_eq!(voucher.client_id, client_id);
    assert_eq!(voucher.status, VoucherStatus::Active);
    assert_eq!(voucher.discount_percentage, 15);
    assert_eq!(voucher.expires_at, clock.now() + Duration::days(30));
    assert_eq!(store.vouchers_for(client_id).len(), 1);
}

#[tokio::test]
async fn test_every_multiple_mints_again() {
    let (store, _, service) = fixture();
    store.activate_config(config(5, 30));
    let client_id = Uuid::new_v4();

    for _ in 0..10 {
        service
            .record_completed_service(client_id, dec!(30.00))
            .await
            .unwrap();
    }

    // Multiples of five: services 5 and 10
    assert_eq!(store.vouchers_for(client_id).len(), 2);
}

#[tokio::test]
async fn test_threshold_change_applies_to_next_completion() {
    let (store, _, service) = fixture();
    store.activate_config(config(5, 30));
    let client_id = Uuid::new_v4();

    for _ in 0..3 {
        service
            .record_completed_service(client_id, dec!(30.00))
            .await
            .unwrap();
    }

    // Lowering the threshold does not reset the running count; the next
    // completion lands on 4, which is a multiple of the new threshold.
    store.activate_config(config(2, 30));

    let outcome = service
        .record_completed_service(client_id, dec!(30.00))
        .await
        .unwrap();
    assert!(outcome.voucher.is_some());
}

#[tokio::test]
async fn test_concurrent_completions_each_count() {
    let (store, _, service) = fixture();
    store.activate_config(config(2, 30));
    let client_id = Uuid::new_v4();

    // Neither completion may overwrite the other, even when both start
    // before the counter row exists.
    let (a, b) = tokio::join!(
        service.record_completed_service(client_id, dec!(30.00)),
        service.record_completed_service(client_id, dec!(30.00)),
    );
    a.unwrap();
    b.unwrap();

    let count = service.client_count(client_id).await.unwrap().unwrap();
    assert_eq!(count.completed_services, 2);
    assert_eq!(count.total_spent, dec!(60.00));

    // Threshold 2 crossed exactly once across the pair
    assert_eq!(store.vouchers_for(client_id).len(), 1);
}

#[tokio::test]
async fn test_separate_clients_have_separate_counters() {
    let (store, _, service) = fixture();
    store.activate_config(config(2, 30));
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    service.record_completed_service(alice, dec!(30.00)).await.unwrap();
    service.record_completed_service(bob, dec!(30.00)).await.unwrap();

    assert!(store.vouchers_for(alice).is_empty());
    assert!(store.vouchers_for(bob).is_empty());

    let outcome = service.record_completed_service(alice, dec!(30.00)).await.unwrap();
    assert!(outcome.voucher.is_some());
    assert!(store.vouchers_for(bob).is_empty());
}
