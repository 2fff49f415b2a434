//! Primary / fallback dispatch.
//!
//! Handlers describe how to answer a request twice, once against the
//! primary store and once against the fixtures, and hand both to
//! [`select_data_source`]. Exactly one of the two runs, exactly once.
//! There is no retry, health check, or circuit breaker here: availability
//! was decided before the handler ran and arrives as a
//! [`DataSourceMode`].

use std::future::Future;

use folio_types::DataSourceMode;

/// What to do when the primary store is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Serve the request from fixtures.
    Fixtures,
    /// Fail the request with [`BackendUnavailable`].
    Fail,
}

/// The primary store is unavailable and fallback is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No database connection available")]
pub struct BackendUnavailable;

/// Run `primary` when the primary store is available, otherwise run
/// `fallback` or fail, depending on `policy`.
///
/// Whatever the chosen callable returns is passed through unmodified,
/// errors included.
///
/// # Errors
///
/// Returns the chosen callable's error, or `E::from(BackendUnavailable)`
/// when the store is unavailable under [`FallbackPolicy::Fail`].
pub async fn select_data_source<T, E, P, PF, F, FF>(
    mode: DataSourceMode,
    policy: FallbackPolicy,
    primary: P,
    fallback: F,
) -> Result<T, E>
where
    P: FnOnce() -> PF,
    PF: Future<Output = Result<T, E>>,
    F: FnOnce() -> FF,
    FF: Future<Output = Result<T, E>>,
    E: From<BackendUnavailable>,
{
    match (mode, policy) {
        (DataSourceMode::Available, _) => primary().await,
        (DataSourceMode::Unavailable, FallbackPolicy::Fixtures) => {
            tracing::debug!("primary store unavailable, serving fixtures");
            fallback().await
        }
        (DataSourceMode::Unavailable, FallbackPolicy::Fail) => Err(E::from(BackendUnavailable)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Unavailable,
        Query(&'static str),
    }

    impl From<BackendUnavailable> for TestError {
        fn from(_: BackendUnavailable) -> Self {
            Self::Unavailable
        }
    }

    #[tokio::test]
    async fn available_runs_primary_only() {
        let primary_calls = &AtomicUsize::new(0);
        let fallback_calls = &AtomicUsize::new(0);

        let result: Result<&str, TestError> = select_data_source(
            DataSourceMode::Available,
            FallbackPolicy::Fixtures,
            move || async move {
                primary_calls.fetch_add(1, Ordering::SeqCst);
                Ok("db")
            },
            move || async move {
                fallback_calls.fetch_add(1, Ordering::SeqCst);
                Ok("mock")
            },
        )
        .await;

        assert_eq!(result.unwrap(), "db");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unavailable_runs_fallback_only() {
        let primary_calls = &AtomicUsize::new(0);

        let result: Result<&str, TestError> = select_data_source(
            DataSourceMode::Unavailable,
            FallbackPolicy::Fixtures,
            move || async move {
                primary_calls.fetch_add(1, Ordering::SeqCst);
                Ok("db")
            },
            move || async move { Ok("mock") },
        )
        .await;

        assert_eq!(result.unwrap(), "mock");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unavailable_without_fallback_fails() {
        let fallback_calls = &AtomicUsize::new(0);

        let result: Result<&str, TestError> = select_data_source(
            DataSourceMode::Unavailable,
            FallbackPolicy::Fail,
            move || async move { Ok("db") },
            move || async move {
                fallback_calls.fetch_add(1, Ordering::SeqCst);
                Ok("mock")
            },
        )
        .await;

        assert_eq!(result, Err(TestError::Unavailable));
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn primary_errors_propagate_untouched() {
        let result: Result<&str, TestError> = select_data_source(
            DataSourceMode::Available,
            FallbackPolicy::Fixtures,
            move || async move { Err(TestError::Query("relation does not exist")) },
            move || async move { Ok("mock") },
        )
        .await;

        assert_eq!(result, Err(TestError::Query("relation does not exist")));
    }
}
