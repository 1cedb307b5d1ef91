//! Reads and writes wrapped with toasts and invalidation

use crate::api::ApiError;
use crate::query::cache::{QueryCache, QueryPolicy};
use crate::query::key::QueryKey;
use crate::query::notify::Notifier;
use std::future::Future;
use std::sync::Arc;

/// Side effects of a write
#[derive(Debug, Clone)]
pub struct Mutation<'a> {
    /// Toast shown on success, if any
    pub success: Option<&'a str>,
    /// Toast shown on failure
    pub failure: &'a str,
    /// Key prefixes marked stale on success
    pub invalidates: Vec<QueryKey>,
}

/// Runs a cached read, toasting `failure` when it fails
///
/// A rejected session is only logged; the redirect already happened.
pub async fn run_query<T, F, Fut>(
    cache: &QueryCache,
    notifier: &Notifier,
    key: &QueryKey,
    policy: &QueryPolicy,
    failure: &str,
    fetcher: F,
) -> Result<Arc<T>, ApiError>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    cache
        .fetch(key, policy, fetcher)
        .await
        .map_err(|e| report(notifier, failure, e))
}

/// Runs a write once and applies its side effects
///
/// # Returns
///
/// * `Ok(T)` - The write succeeded; the success toast is queued and the
///   listed keys are invalidated
/// * `Err(ApiError)` - The write failed; the failure toast is queued and
///   nothing is invalidated
pub async fn run_mutation<T, Fut>(
    cache: &QueryCache,
    notifier: &Notifier,
    mutation: Mutation<'_>,
    request: Fut,
) -> Result<T, ApiError>
where
    Fut: Future<Output = Result<T, ApiError>>,
{
    match request.await {
        Ok(value) => {
            if let Some(message) = mutation.success {
                notifier.success(message);
            }
            for key in &mutation.invalidates {
                cache.invalidate(key);
            }
            Ok(value)
        }
        Err(e) => Err(report(notifier, mutation.failure, e)),
    }
}

fn report(notifier: &Notifier, message: &str, error: ApiError) -> ApiError {
    if error.is_fatal() {
        tracing::warn!("{}: {}", message, error);
    } else {
        notifier.error(message, &error);
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_success_invalidates_and_toasts() {
        let cache = QueryCache::new(Duration::ZERO);
        let notifier = Notifier::new();
        let list = QueryKey::new(["companies", "list"]);
        cache.set(list.clone(), 1u32);

        let result = run_mutation(
            &cache,
            &notifier,
            Mutation {
                success: Some("企業を登録しました"),
                failure: "企業の登録に失敗しました",
                invalidates: vec![QueryKey::root("companies")],
            },
            async { Ok::<_, ApiError>(5) },
        )
        .await;

        assert_eq!(result.unwrap(), 5);
        assert!(!cache.is_fresh(&list, &QueryPolicy::minutes(5)));
        assert!(notifier.contains("企業を登録しました"));
    }

    #[tokio::test]
    async fn test_failure_keeps_cache() {
        let cache = QueryCache::new(Duration::ZERO);
        let notifier = Notifier::new();
        let list = QueryKey::new(["companies", "list"]);
        cache.set(list.clone(), 1u32);

        let result: Result<u32, ApiError> = run_mutation(
            &cache,
            &notifier,
            Mutation {
                success: None,
                failure: "企業の削除に失敗しました",
                invalidates: vec![QueryKey::root("companies")],
            },
            async { Err(ApiError::from_status(500, "")) },
        )
        .await;

        assert!(result.is_err());
        assert!(cache.is_fresh(&list, &QueryPolicy::minutes(5)));
        assert_eq!(notifier.pending().len(), 1);
        assert!(notifier.contains("企業の削除に失敗しました"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_toasted() {
        let cache = QueryCache::new(Duration::ZERO);
        let notifier = Notifier::new();

        let result: Result<Arc<u32>, ApiError> = run_query(
            &cache,
            &notifier,
            &QueryKey::root("sales-dashboard"),
            &QueryPolicy::minutes(2),
            "営業ダッシュボードの取得に失敗しました",
            || async { Err(ApiError::Unauthorized) },
        )
        .await;

        assert!(result.is_err());
        assert!(notifier.pending().is_empty());
    }
}
