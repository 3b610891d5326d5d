//! Tests for concurrent calls through one wrapped function.

use safecall::{
    BoundArgs, CallArgs, ErrorRecord, Fault, ObservationLog, Outcome, SafeCall, SafeFn, Schema,
    Signature, VALIDATION_ERROR,
};
use std::sync::Arc;
use std::thread;

fn assert_send_sync<T: Send + Sync>() {}

fn square() -> SafeFn<i64> {
    SafeCall::new(
        Signature::new("square")
            .param("n", Schema::integer())
            .returns(Schema::integer().min(0)),
    )
    .validate_return(true)
    .validate_body(true)
    .wrap(|args: &BoundArgs| -> Result<i64, Fault> {
        let n: i64 = args.parse("n")?;
        Ok(n * n)
    })
    .unwrap()
}

#[test]
fn test_wrapped_function_is_send_sync() {
    assert_send_sync::<SafeFn<i64>>();
    assert_send_sync::<SafeFn<String, String>>();
}

#[test]
fn test_concurrent_calls() {
    let wrapped = Arc::new(square());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let wrapped = Arc::clone(&wrapped);
            thread::spawn(move || {
                let outcome = wrapped.call(&CallArgs::new().arg(i)).unwrap();
                assert_eq!(outcome, Outcome::Success(i * i));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_failures_are_call_local() {
    let wrapped = square();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let wrapped = wrapped.clone();
            thread::spawn(move || {
                let bad = format!("bad-{}", i);
                let record: ErrorRecord = wrapped
                    .call(&CallArgs::new().kwarg("n", bad.as_str()))
                    .unwrap()
                    .failure()
                    .unwrap();
                assert_eq!(record.error_type, VALIDATION_ERROR);
                assert_eq!(record.error_details[0].input, serde_json::json!(bad));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_shared_observation_log() {
    let log = ObservationLog::new();
    let wrapped = SafeCall::new(Signature::new("noop"))
        .observe(log.clone())
        .wrap(|_: &BoundArgs| -> Result<(), Fault> { Ok(()) })
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let wrapped = wrapped.clone();
            thread::spawn(move || {
                wrapped.call(&CallArgs::new()).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(log.len(), 8);
}
