//! Integration tests for two-factor challenge persistence.

use chrono::{Duration, Utc};
use dialcast_db::models::two_factor::method;
use dialcast_db::repositories::TwoFactorRepo;
use sqlx::PgPool;

#[sqlx::test]
async fn upsert_creates_and_replaces(pool: PgPool) {
    let expires = Utc::now() + Duration::minutes(10);

    let first = TwoFactorRepo::upsert(&pool, 1, "111111", method::SMS, expires)
        .await
        .unwrap();
    assert_eq!(first.code, "111111");
    assert_eq!(first.attempts, 0);

    // Burn some attempts, then re-send: the new challenge resets them.
    TwoFactorRepo::increment_attempts(&pool, 1).await.unwrap();
    TwoFactorRepo::increment_attempts(&pool, 1).await.unwrap();

    let second = TwoFactorRepo::upsert(&pool, 1, "222222", method::PHONE_CALL, expires)
        .await
        .unwrap();
    assert_eq!(second.code, "222222");
    assert_eq!(second.method, method::PHONE_CALL);
    assert_eq!(second.attempts, 0);
}

#[sqlx::test]
async fn increment_attempts_counts_up(pool: PgPool) {
    let expires = Utc::now() + Duration::minutes(10);
    TwoFactorRepo::upsert(&pool, 5, "123456", method::SMS, expires)
        .await
        .unwrap();

    assert_eq!(
        TwoFactorRepo::increment_attempts(&pool, 5).await.unwrap(),
        Some(1)
    );
    assert_eq!(
        TwoFactorRepo::increment_attempts(&pool, 5).await.unwrap(),
        Some(2)
    );
}

#[sqlx::test]
async fn increment_without_challenge_is_none(pool: PgPool) {
    // The challenge may be consumed by a concurrent verify between the load
    // and the increment; that must not surface as an error.
    assert_eq!(
        TwoFactorRepo::increment_attempts(&pool, 404).await.unwrap(),
        None
    );
}

#[sqlx::test]
async fn delete_consumes_the_challenge(pool: PgPool) {
    let expires = Utc::now() + Duration::minutes(10);
    TwoFactorRepo::upsert(&pool, 9, "654321", method::SMS, expires)
        .await
        .unwrap();

    assert!(TwoFactorRepo::delete(&pool, 9).await.unwrap());
    assert!(TwoFactorRepo::find(&pool, 9).await.unwrap().is_none());
    // Second delete is a no-op.
    assert!(!TwoFactorRepo::delete(&pool, 9).await.unwrap());
}

#[sqlx::test]
async fn expiry_window_is_checked_by_model_helper(pool: PgPool) {
    let expired = TwoFactorRepo::upsert(&pool, 2, "999999", method::SMS, Utc::now() - Duration::seconds(1))
        .await
        .unwrap();
    assert!(expired.is_expired(Utc::now()));

    let live = TwoFactorRepo::upsert(&pool, 3, "888888", method::SMS, Utc::now() + Duration::minutes(10))
        .await
        .unwrap();
    assert!(!live.is_expired(Utc::now()));
}
