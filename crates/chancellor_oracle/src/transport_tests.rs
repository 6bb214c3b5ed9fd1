use super::*;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// Replays a fixed script of outcomes and counts calls.
struct Scripted {
    script: RefCell<VecDeque<Result<Reply, OracleError>>>,
    calls: Cell<u32>,
}

impl Scripted {
    fn new(script: Vec<Result<Reply, OracleError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: Cell::new(0),
        }
    }
}

impl Transport for Scripted {
    fn get(&self, _request: &Request) -> Result<Reply, OracleError> {
        self.calls.set(self.calls.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::ok("")))
    }
}

fn rate_limited() -> Result<Reply, OracleError> {
    Ok(Reply {
        status: TOO_MANY_REQUESTS,
        body: String::new(),
    })
}

fn unreachable() -> Result<Reply, OracleError> {
    Err(OracleError::Network {
        url: "http://localhost".into(),
        reason: "connection refused".into(),
    })
}

#[test]
fn test_retries_until_success() {
    let inner = Scripted::new(vec![rate_limited(), unreachable(), Ok(Reply::ok("{}"))]);
    let transport = Retrying::new(&inner, RetryPolicy::immediate(3));

    let reply = transport.get(&Request::get("http://localhost")).unwrap();
    assert_eq!(reply.body, "{}");
    assert_eq!(inner.calls.get(), 3);
}

#[test]
fn test_gives_up_after_max_attempts() {
    let inner = Scripted::new(vec![
        rate_limited(),
        rate_limited(),
        rate_limited(),
        Ok(Reply::ok("")),
    ]);
    let transport = Retrying::new(&inner, RetryPolicy::immediate(3));

    let err = transport.get(&Request::get("http://localhost/x")).unwrap_err();
    assert!(matches!(
        err,
        OracleError::RetriesExhausted { attempts: 3, ref url } if url == "http://localhost/x"
    ));
    assert_eq!(inner.calls.get(), 3);
}

#[test]
fn test_non_retryable_status_is_passed_through() {
    let inner = Scripted::new(vec![Ok(Reply {
        status: 404,
        body: "not found".into(),
    })]);
    let transport = Retrying::new(&inner, RetryPolicy::immediate(3));

    let reply = transport.get(&Request::get("http://localhost")).unwrap();
    assert_eq!(reply.status, 404);
    assert_eq!(inner.calls.get(), 1);
}

#[test]
fn test_delay_grows_per_attempt() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for(0), Duration::from_millis(60_000));
    assert_eq!(policy.delay_for(2), Duration::from_millis(62_000));
}

#[test]
fn test_request_builder() {
    let request = Request::get("http://localhost")
        .param("fen", "8/8/8/8/8/8/8/8 w - - 0 1")
        .param("multiPv", "2")
        .bearer(Some("secret"));
    assert_eq!(request.value("multiPv"), Some("2"));
    assert_eq!(request.bearer.as_deref(), Some("secret"));
    assert_eq!(request.value("missing"), None);
}
