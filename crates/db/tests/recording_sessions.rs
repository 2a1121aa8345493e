//! Integration tests for call-to-record session state transitions.

use dialcast_db::models::recording_session::status;
use dialcast_db::repositories::RecordingSessionRepo;
use sqlx::PgPool;

#[sqlx::test]
async fn new_session_starts_pending(pool: PgPool) {
    let session = RecordingSessionRepo::create(&pool, Some(1), "+15551234567")
        .await
        .unwrap();

    assert_eq!(session.status, status::PENDING);
    assert!(!session.is_terminal());
    assert!(session.call_sid.is_none());
}

#[sqlx::test]
async fn complete_transition_happens_exactly_once(pool: PgPool) {
    let session = RecordingSessionRepo::create(&pool, Some(1), "+15551234567")
        .await
        .unwrap();

    let first =
        RecordingSessionRepo::complete_if_pending(&pool, session.id, "RE1", "http://r/1", "recordings/RE1.mp3")
            .await
            .unwrap();
    assert!(first, "first delivery should win the transition");

    // A redelivered webhook observes the terminal state and loses.
    let second =
        RecordingSessionRepo::complete_if_pending(&pool, session.id, "RE1", "http://r/1", "recordings/RE1.mp3")
            .await
            .unwrap();
    assert!(!second);

    let row = RecordingSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, status::COMPLETED);
    assert_eq!(row.storage_path.as_deref(), Some("recordings/RE1.mp3"));
}

#[sqlx::test]
async fn fail_does_not_overwrite_completed(pool: PgPool) {
    let session = RecordingSessionRepo::create(&pool, None, "+15551234567")
        .await
        .unwrap();

    RecordingSessionRepo::complete_if_pending(&pool, session.id, "RE1", "http://r/1", "p")
        .await
        .unwrap();

    let flipped = RecordingSessionRepo::fail_if_pending(&pool, session.id, "late failure")
        .await
        .unwrap();
    assert!(!flipped);

    let row = RecordingSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, status::COMPLETED);
    assert!(row.error.is_none());
}

#[sqlx::test]
async fn failed_session_records_the_error(pool: PgPool) {
    let session = RecordingSessionRepo::create(&pool, None, "+15551234567")
        .await
        .unwrap();

    assert!(
        RecordingSessionRepo::fail_if_pending(&pool, session.id, "recording fetch failed")
            .await
            .unwrap()
    );

    let row = RecordingSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, status::FAILED);
    assert_eq!(row.error.as_deref(), Some("recording fetch failed"));
    assert!(row.is_terminal());
}

#[sqlx::test]
async fn call_sid_is_recorded_after_dispatch(pool: PgPool) {
    let session = RecordingSessionRepo::create(&pool, Some(3), "+15550000000")
        .await
        .unwrap();

    assert!(RecordingSessionRepo::set_call_sid(&pool, session.id, "CA42")
        .await
        .unwrap());

    let row = RecordingSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.call_sid.as_deref(), Some("CA42"));
    // Attaching the call sid is not a status transition.
    assert_eq!(row.status, status::PENDING);
}
