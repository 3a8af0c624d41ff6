// src/ingest/failover.rs
//! Ranked failover: try endpoints in preference order, first success wins.

use std::fmt::Display;
use std::future::Future;

use metrics::counter;

use crate::error::FetchError;

/// Try `attempt` against each candidate in order and return the first `Ok`
/// together with the index of the candidate that produced it.
///
/// Candidates after the winning one are never touched. When every candidate
/// fails the last error is wrapped in [`FetchError::AllEndpointsFailed`].
pub async fn first_success<C, T, F, Fut>(
    target: &str,
    candidates: &[C],
    mut attempt: F,
) -> Result<(usize, T), FetchError>
where
    C: Display,
    F: FnMut(&C) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut last = None;
    for (idx, cand) in candidates.iter().enumerate() {
        match attempt(cand).await {
            Ok(v) => return Ok((idx, v)),
            Err(e) => {
                tracing::warn!(%target, endpoint = %cand, error = %e, "endpoint failed, trying next");
                counter!("feed_mirror_failures_total").increment(1);
                last = Some(e);
            }
        }
    }

    match last {
        Some(e) => Err(FetchError::AllEndpointsFailed {
            target: target.to_string(),
            attempts: candidates.len(),
            last: Box::new(e),
        }),
        None => Err(FetchError::NoEndpoints {
            target: target.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn fail(url: &str) -> FetchError {
        FetchError::Status {
            url: url.to_string(),
            status: 503,
        }
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let mirrors = ["a", "b", "c", "d"];
        let tried = RefCell::new(Vec::new());
        let (idx, v) = first_success("acct", &mirrors, |m| {
            tried.borrow_mut().push(m.to_string());
            let m = m.to_string();
            async move {
                if m == "c" {
                    Ok(42)
                } else {
                    Err(fail(&m))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!((idx, v), (2, 42));
        assert_eq!(*tried.borrow(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempts_and_last_error() {
        let mirrors = ["a", "b"];
        let err = first_success::<_, (), _, _>("acct", &mirrors, |m| {
            let m = m.to_string();
            async move { Err(fail(&m)) }
        })
        .await
        .unwrap_err();

        match err {
            FetchError::AllEndpointsFailed {
                target,
                attempts,
                last,
            } => {
                assert_eq!(target, "acct");
                assert_eq!(attempts, 2);
                assert!(matches!(*last, FetchError::Status { ref url, .. } if url == "b"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidate_list_is_an_error() {
        let none: [&str; 0] = [];
        let err = first_success::<_, (), _, _>("acct", &none, |_| async { Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NoEndpoints { .. }));
    }
}
