//! Tests for call context cancellation and deadlines.

use std::time::Duration;
use tokio::time::Instant;
use tollbooth_core::{CallContext, FAR_FUTURE, instant_after};
use tollbooth_error::CancelledErrorKind;

#[tokio::test(start_paused = true)]
async fn test_sleep_completes() {
    let ctx = CallContext::new();
    let start = Instant::now();
    ctx.sleep(Duration::from_secs(5)).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_sleep_cancelled_midway() {
    let ctx = CallContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = ctx.sleep(Duration::from_secs(60)).await.unwrap_err();
    assert_eq!(err.kind, CancelledErrorKind::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_exceeded() {
    let ctx = CallContext::new().with_timeout(Duration::from_secs(2));
    let err = ctx.sleep(Duration::from_secs(60)).await.unwrap_err();
    assert_eq!(err.kind, CancelledErrorKind::DeadlineExceeded);
    assert!(ctx.check().is_err());
}

#[tokio::test]
async fn test_check_before_cancel() {
    let ctx = CallContext::new();
    assert!(ctx.check().is_ok());
    ctx.cancel();
    assert_eq!(ctx.check().unwrap_err().kind, CancelledErrorKind::Cancelled);
}

#[tokio::test]
async fn test_child_follows_parent() {
    let parent = CallContext::new();
    let child = parent.child();
    parent.cancel();
    assert!(child.check().is_err());

    let parent = CallContext::new();
    let child = parent.child();
    child.cancel();
    assert!(parent.check().is_ok());
}

#[tokio::test]
async fn test_run_returns_output() {
    let ctx = CallContext::new();
    let value = ctx.run(async { 42 }).await.unwrap();
    assert_eq!(value, 42);
}

#[tokio::test(start_paused = true)]
async fn test_earlier_deadline_wins() {
    let ctx = CallContext::new()
        .with_timeout(Duration::from_secs(1))
        .with_timeout(Duration::from_secs(30));
    let remaining = ctx.remaining().unwrap();
    assert!(remaining <= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_timeout_sets_no_deadline() {
    let ctx = CallContext::new().with_timeout(Duration::MAX);
    assert!(ctx.deadline().is_none());
    assert!(ctx.check().is_ok());

    let ctx = CallContext::new()
        .with_timeout(Duration::from_secs(5))
        .with_timeout(Duration::MAX);
    assert!(ctx.remaining().unwrap() <= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_instant_after_clamps() {
    let now = Instant::now();
    assert_eq!(instant_after(now, Duration::from_secs(3)), now + Duration::from_secs(3));
    assert_eq!(instant_after(now, Duration::MAX), now + FAR_FUTURE);
}
