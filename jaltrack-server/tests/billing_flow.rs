//! End-to-end billing tests against an in-memory SQLite database.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use jaltrack_server::billing::generate::{self, AdjustmentPatch};
use jaltrack_server::db;
use shared::error::ErrorCode;

const BIZ: &str = "biz-1";

async fn test_pool() -> SqlitePool {
    // Single connection so every query sees the same in-memory db
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    db::businesses::create(&pool, BIZ, "Aqua Traders", "owner@example.com", 0)
        .await
        .unwrap();
    pool
}

async fn seed_customer(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    rate: &str,
    holiday_billing: bool,
    join_date: &str,
) {
    sqlx::query(
        "INSERT INTO customers (id, business_id, name, rate_per_jug, holiday_billing, join_date, active, created_at)
         VALUES (?, ?, ?, ?, ?, ?, 1, 0)",
    )
    .bind(id)
    .bind(BIZ)
    .bind(name)
    .bind(rate)
    .bind(holiday_billing)
    .bind(join_date)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_holiday(
    pool: &SqlitePool,
    start: &str,
    end: &str,
    scope: &str,
    customer_id: Option<i64>,
) {
    sqlx::query(
        "INSERT INTO holidays (business_id, start_date, end_date, reason, scope, customer_id, created_at)
         VALUES (?, ?, ?, 'test', ?, ?, 0)",
    )
    .bind(BIZ)
    .bind(start)
    .bind(end)
    .bind(scope)
    .bind(customer_id)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn full_month_no_holidays() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Asha", "10.00", false, "2024-06-01").await;

    let outcome = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.invoices.len(), 1);
    let inv = &outcome.invoices[0];
    assert_eq!(inv.total_days, 31);
    assert_eq!(inv.chargeable_days, 31);
    assert_eq!(inv.base_amount, "310.00");
    assert_eq!(inv.final_amount, "310.00");
    assert_eq!(inv.status, "pending");
}

#[tokio::test]
async fn supplier_holidays_reduce_chargeable_days() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Asha", "10.00", false, "2024-06-01").await;
    seed_holiday(&pool, "2025-01-10", "2025-01-14", "supplier", None).await;

    let outcome = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();
    let inv = &outcome.invoices[0];
    assert_eq!(inv.supplier_holiday_days, 5);
    assert_eq!(inv.chargeable_days, 26);
    assert_eq!(inv.final_amount, "260.00");
}

#[tokio::test]
async fn mid_month_join_bills_from_join_date() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Asha", "10.00", false, "2025-01-20").await;

    let outcome = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();
    let inv = &outcome.invoices[0];
    assert_eq!(inv.total_days, 12);
    assert_eq!(inv.chargeable_days, 12);
    assert_eq!(inv.final_amount, "120.00");
}

#[tokio::test]
async fn client_holiday_deducted_only_when_billing_flag_set() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Flag on", "10.00", true, "2024-06-01").await;
    seed_customer(&pool, 2, "Flag off", "10.00", false, "2024-06-01").await;
    seed_holiday(&pool, "2025-01-05", "2025-01-07", "client", None).await;

    let outcome = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();
    assert_eq!(outcome.invoices.len(), 2);

    let on = outcome.invoices.iter().find(|i| i.customer_id == 1).unwrap();
    let off = outcome.invoices.iter().find(|i| i.customer_id == 2).unwrap();

    assert_eq!(on.client_holiday_days, 3);
    assert_eq!(on.chargeable_days, 28);
    assert_eq!(off.client_holiday_days, 3);
    assert_eq!(off.chargeable_days, 31);
}

#[tokio::test]
async fn regeneration_is_idempotent() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Asha", "10.00", false, "2024-06-01").await;

    let first = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();
    let second = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();

    assert_eq!(second.invoices.len(), 1);
    assert_eq!(first.invoices[0].id, second.invoices[0].id);
    assert_eq!(first.invoices[0].created_at, second.invoices[0].created_at);
    assert_eq!(second.invoices[0].final_amount, "310.00");

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invoices")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[tokio::test]
async fn adjustments_survive_regeneration() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Ravi", "50.00", false, "2024-06-01").await;
    // April: 30 days, 5 off -> 25 chargeable at 50.00 = 1250.00
    seed_holiday(&pool, "2025-04-01", "2025-04-05", "supplier", None).await;

    let outcome = generate::generate(&pool, BIZ, 4, 2025, false).await.unwrap();
    let inv_id = outcome.invoices[0].id;
    assert_eq!(outcome.invoices[0].base_amount, "1250.00");

    let adjusted = generate::adjust(
        &pool,
        BIZ,
        inv_id,
        AdjustmentPatch {
            discount: Some(Decimal::new(10000, 2)),
            additional_charges: Some(Decimal::new(2000, 2)),
            remarks: Some("festival discount".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(adjusted.final_amount, "1170.00");
    assert_eq!(adjusted.remarks.as_deref(), Some("festival discount"));

    let regen = generate::generate(&pool, BIZ, 4, 2025, false).await.unwrap();
    let inv = &regen.invoices[0];
    assert_eq!(inv.id, inv_id);
    assert_eq!(inv.discount, "100.00");
    assert_eq!(inv.additional_charges, "20.00");
    assert_eq!(inv.final_amount, "1170.00");
    assert_eq!(inv.remarks.as_deref(), Some("festival discount"));
}

#[tokio::test]
async fn reset_flag_clears_adjustments() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Ravi", "50.00", false, "2024-06-01").await;

    let outcome = generate::generate(&pool, BIZ, 4, 2025, false).await.unwrap();
    let inv_id = outcome.invoices[0].id;
    generate::adjust(
        &pool,
        BIZ,
        inv_id,
        AdjustmentPatch {
            discount: Some(Decimal::new(10000, 2)),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let regen = generate::generate(&pool, BIZ, 4, 2025, true).await.unwrap();
    let inv = &regen.invoices[0];
    assert_eq!(inv.discount, "0.00");
    assert_eq!(inv.additional_charges, "0.00");
    assert_eq!(inv.final_amount, inv.base_amount);
}

#[tokio::test]
async fn paid_status_preserved_across_regeneration() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Asha", "10.00", false, "2024-06-01").await;

    let outcome = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();
    let inv_id = outcome.invoices[0].id;
    sqlx::query("UPDATE invoices SET status = 'paid' WHERE id = ?")
        .bind(inv_id)
        .execute(&pool)
        .await
        .unwrap();

    let regen = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();
    assert_eq!(regen.invoices[0].status, "paid");
}

#[tokio::test]
async fn malformed_customer_fails_without_aborting_batch() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Asha", "10.00", false, "2024-06-01").await;
    seed_customer(&pool, 2, "Broken", "10.00", false, "not-a-date").await;
    seed_customer(&pool, 3, "Meena", "20.00", false, "2024-06-01").await;

    let outcome = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();

    assert_eq!(outcome.invoices.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].customer_id, 2);
    assert!(outcome.failures[0].error.contains("join date"));
}

#[tokio::test]
async fn generate_rejects_invalid_period_and_unknown_business() {
    let pool = test_pool().await;

    let err = generate::generate(&pool, BIZ, 13, 2025, false).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidBillingPeriod);

    let err = generate::generate(&pool, "nope", 1, 2025, false).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BusinessNotFound);
}

#[tokio::test]
async fn adjust_rejects_missing_foreign_and_negative() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Asha", "10.00", false, "2024-06-01").await;
    let outcome = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();
    let inv_id = outcome.invoices[0].id;

    let err = generate::adjust(&pool, BIZ, 9999, AdjustmentPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvoiceNotFound);

    // Another business's token must not see this invoice
    db::businesses::create(&pool, "biz-2", "Other", "o@example.com", 0)
        .await
        .unwrap();
    let err = generate::adjust(&pool, "biz-2", inv_id, AdjustmentPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvoiceNotFound);

    let err = generate::adjust(
        &pool,
        BIZ,
        inv_id,
        AdjustmentPatch {
            discount: Some(Decimal::new(-100, 2)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::NegativeAdjustment);
}

#[tokio::test]
async fn discount_never_pushes_final_below_zero() {
    let pool = test_pool().await;
    seed_customer(&pool, 1, "Asha", "10.00", false, "2024-06-01").await;
    let outcome = generate::generate(&pool, BIZ, 1, 2025, false).await.unwrap();

    let adjusted = generate::adjust(
        &pool,
        BIZ,
        outcome.invoices[0].id,
        AdjustmentPatch {
            discount: Some(Decimal::new(100_000, 2)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(adjusted.final_amount, "0.00");
}
