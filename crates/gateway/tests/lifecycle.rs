//! Buffer ownership across many calls through the embedded backend

use nickel_bridge::{ErrorKind, Gateway, NativeBackend, Value};
use nickel_bridge_ffi::testing::{CountingEvaluator, Reply, Request};
use std::sync::Arc;
use std::thread;

const CALLS: usize = 10_000;

fn evaluator() -> CountingEvaluator {
    CountingEvaluator::new(|request| match request {
        Request::Source(source) => match source.parse::<i64>() {
            Ok(n) if n % 7 == 0 => Reply::Error(format!("rejected {n}")),
            Ok(n) if n % 11 == 0 => Reply::Bytes(vec![0x04, 0x01]),
            Ok(n) => Reply::Value(Value::record([
                ("n", Value::Int(n)),
                ("tags", Value::Array(vec![Value::from("a"), Value::tag("B")])),
            ])),
            Err(_) => Reply::Error(format!("not a number: {source}")),
        },
        Request::File(path) => Reply::Error(format!("no such file {}", path.display())),
    })
}

#[test]
fn test_every_buffer_released_exactly_once() {
    let gateway = Gateway::new(NativeBackend::new(evaluator()));

    let mut decoded = 0;
    let mut failed = 0;
    let mut malformed = 0;
    for i in 0..CALLS {
        match gateway.eval_expr(&i.to_string()) {
            Ok(value) => {
                assert_eq!(value.get("n"), Some(&Value::Int(i as i64)));
                decoded += 1;
            }
            Err(err) if err.kind() == ErrorKind::Evaluation => failed += 1,
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Protocol);
                malformed += 1;
            }
        }
    }

    let stats = gateway.backend().with_evaluator(|e| e.stats());
    assert_eq!(stats.calls, CALLS);
    assert_eq!(decoded + failed + malformed, CALLS);
    assert_eq!(stats.failures, failed);
    assert_eq!(stats.buffers_allocated, decoded + malformed);
    assert_eq!(stats.buffers_released, stats.buffers_allocated);
    assert_eq!(stats.invalid_releases, 0);
    assert_eq!(stats.outstanding(), 0);
}

#[test]
fn test_concurrent_failures_keep_their_own_message() {
    let gateway = Arc::new(Gateway::new(NativeBackend::new(evaluator())));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let gateway = Arc::clone(&gateway);
            thread::spawn(move || {
                for i in 0..250 {
                    let source = format!("w{worker}-{i}");
                    let err = gateway.eval_expr(&source).unwrap_err();
                    assert_eq!(
                        err.to_string(),
                        format!("evaluation failed: not a number: {source}")
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = gateway.backend().with_evaluator(|e| e.stats());
    assert_eq!(stats.failures, 1000);
    assert_eq!(stats.outstanding(), 0);
}
