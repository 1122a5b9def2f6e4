use crate::application_port::{AggregationError, UserAggregator, UserInfo};
use crate::domain_port::{PostRepo, UserRecord};
use crate::logger::*;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_AGGREGATION_CONCURRENCY: usize = 10;

/// Fans out one post-count query per user, at most `limit` at a time.
///
/// All tasks share a child of the caller's cancellation token. The first
/// failure cancels that scope, aborts whatever is still queued or running
/// and becomes the result. Output order matches input order.
pub struct PostTotalAggregator {
    post_repo: Arc<dyn PostRepo>,
    limit: usize,
}

impl PostTotalAggregator {
    pub fn new(post_repo: Arc<dyn PostRepo>, limit: usize) -> Self {
        PostTotalAggregator {
            post_repo,
            limit: limit.max(1),
        }
    }
}

#[async_trait::async_trait]
impl UserAggregator for PostTotalAggregator {
    async fn aggregate(
        &self,
        users: Vec<UserRecord>,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserInfo>, AggregationError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let scope = cancel.child_token();
        let permits = Arc::new(Semaphore::new(self.limit));
        let mut tasks = JoinSet::new();
        let len = users.len();
        debug!(users = len, limit = self.limit, "aggregating post totals");

        for (index, user) in users.into_iter().enumerate() {
            let scope = scope.clone();
            let permits = permits.clone();
            let post_repo = self.post_repo.clone();

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = scope.cancelled() => return Err(AggregationError::Cancelled),
                    permit = permits.acquire_owned() => {
                        permit.map_err(|e| AggregationError::Task(e.to_string()))?
                    }
                };

                let count = tokio::select! {
                    biased;
                    _ = scope.cancelled() => return Err(AggregationError::Cancelled),
                    count = post_repo.count_by_owner(&user.user_id) => count,
                };

                match count {
                    Ok(total) => Ok((index, UserInfo::from_record(user, total))),
                    Err(source) => Err(AggregationError::Downstream {
                        user_id: user.user_id,
                        source,
                    }),
                }
            });
        }

        let mut slots: Vec<Option<UserInfo>> = vec![None; len];
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| AggregationError::Task(e.to_string()))
                .and_then(|result| result);

            match outcome {
                Ok((index, info)) => slots[index] = Some(info),
                Err(e) => {
                    scope.cancel();
                    tasks.abort_all();
                    warn!(error = %e, "aggregation aborted");
                    return Err(e);
                }
            }
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| AggregationError::Task("missing aggregation result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::{Page, PostId, UserId};
    use crate::domain_port::{PostRecord, StoreError};
    use chrono::{DateTime, Utc};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers `count_by_owner` with the numeric suffix of the user id.
    struct CountingPostRepo {
        delay: Duration,
        fail_for: Option<UserId>,
        slow_unless_failing: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl CountingPostRepo {
        fn new(delay: Duration) -> Self {
            CountingPostRepo {
                delay,
                fail_for: None,
                slow_unless_failing: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl PostRepo for CountingPostRepo {
        async fn create(&self, _post: &PostRecord) -> Result<(), StoreError> {
            unimplemented!()
        }

        async fn get_by_id(&self, _post_id: &PostId) -> Result<Option<PostRecord>, StoreError> {
            unimplemented!()
        }

        async fn update_content(
            &self,
            _post_id: &PostId,
            _title: &str,
            _content: &str,
            _updated_at: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            unimplemented!()
        }

        async fn delete(&self, _post_id: &PostId) -> Result<(), StoreError> {
            unimplemented!()
        }

        async fn list(&self, _page: Page) -> Result<(Vec<PostRecord>, i64), StoreError> {
            unimplemented!()
        }

        async fn list_by_owner(
            &self,
            _owner_id: &UserId,
            _page: Page,
        ) -> Result<(Vec<PostRecord>, i64), StoreError> {
            unimplemented!()
        }

        async fn count_by_owner(&self, owner_id: &UserId) -> Result<i64, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let failing = self.fail_for.as_ref() == Some(owner_id);
            let delay = match (failing, self.slow_unless_failing) {
                (false, Some(slow)) => slow,
                _ => self.delay,
            };
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if failing {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            let n = owner_id
                .as_str()
                .trim_start_matches("user-")
                .parse::<i64>()
                .unwrap_or(0);
            Ok(n)
        }
    }

    fn users(n: usize) -> Vec<UserRecord> {
        let now = Utc::now();
        (0..n)
            .map(|i| UserRecord {
                user_id: UserId(format!("user-{i}")),
                username: format!("user_{i}"),
                password_hash: "hash".to_string(),
                nickname: format!("nick{i}"),
                email: None,
                phone: None,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    #[tokio::test]
    async fn every_user_gets_its_total_in_input_order() {
        let repo = Arc::new(CountingPostRepo::new(Duration::from_millis(1)));
        let aggregator = PostTotalAggregator::new(repo, DEFAULT_AGGREGATION_CONCURRENCY);
        let input = users(25);
        let expected: HashSet<UserId> = input.iter().map(|u| u.user_id.clone()).collect();

        let views = aggregator
            .aggregate(input, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(views.len(), 25);
        let got: HashSet<UserId> = views.iter().map(|v| v.user_id.clone()).collect();
        assert_eq!(got, expected);
        for (i, view) in views.iter().enumerate() {
            assert_eq!(view.user_id.as_str(), format!("user-{i}"));
            assert_eq!(view.post_total, i as i64);
        }
    }

    #[tokio::test]
    async fn empty_page_needs_no_queries() {
        let repo = Arc::new(CountingPostRepo::new(Duration::ZERO));
        let aggregator = PostTotalAggregator::new(repo.clone(), 4);
        let views = aggregator
            .aggregate(Vec::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(views.is_empty());
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_limit() {
        let repo = Arc::new(CountingPostRepo::new(Duration::from_millis(20)));
        let aggregator = PostTotalAggregator::new(repo.clone(), 10);

        aggregator
            .aggregate(users(40), &CancellationToken::new())
            .await
            .unwrap();

        let max = repo.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 10, "saw {max} concurrent queries");
        assert!(max > 1, "queries were serialized");
        assert_eq!(repo.calls.load(Ordering::SeqCst), 40);
    }

    #[tokio::test]
    async fn limit_of_one_serializes() {
        let repo = Arc::new(CountingPostRepo::new(Duration::from_millis(2)));
        let aggregator = PostTotalAggregator::new(repo.clone(), 0);
        aggregator
            .aggregate(users(5), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(repo.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn one_failure_fails_the_whole_page() {
        let mut repo = CountingPostRepo::new(Duration::from_millis(1));
        repo.fail_for = Some(UserId::from("user-7"));
        let aggregator = PostTotalAggregator::new(Arc::new(repo), 10);

        let result = aggregator
            .aggregate(users(12), &CancellationToken::new())
            .await;

        match result {
            Err(AggregationError::Downstream { user_id, .. }) => {
                assert_eq!(user_id.as_str(), "user-7")
            }
            other => panic!("expected downstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_abandons_slow_siblings() {
        let mut repo = CountingPostRepo::new(Duration::from_millis(1));
        repo.fail_for = Some(UserId::from("user-0"));
        repo.slow_unless_failing = Some(Duration::from_secs(30));
        let aggregator = PostTotalAggregator::new(Arc::new(repo), 10);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            aggregator.aggregate(users(10), &CancellationToken::new()),
        )
        .await
        .expect("aggregation should stop on the first failure");

        assert!(matches!(result, Err(AggregationError::Downstream { .. })));
    }

    #[tokio::test]
    async fn cancelled_caller_scope_aborts() {
        let repo = Arc::new(CountingPostRepo::new(Duration::from_millis(1)));
        let aggregator = PostTotalAggregator::new(repo.clone(), 10);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = aggregator.aggregate(users(5), &cancel).await;

        assert!(matches!(result, Err(AggregationError::Cancelled)));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }
}
