#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use jaql_model::config::CacheSettings;
    use jaql_model::data_load::{
        load_result, DataLoadError, DataLoadResult, DataLoadService, LazyPager, LoadEvent,
        PageLoader, QueryExecutor,
    };
    use jaql_model::jaql::{DataSource, JaqlQuery};
    use jaql_model::rest::{HttpResponse, HttpTransport, RestApi, RestQueryExecutor, RestResult};
    use serde_json::{json, Value};
    use tokio::sync::{mpsc, Notify};

    /// Answers by data source title: `broken` fails, `hangup` closes early,
    /// anything else returns `offset..offset+count` capped at 25 rows.
    #[derive(Default)]
    struct Warehouse {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QueryExecutor for Warehouse {
        async fn execute(&self, query: &JaqlQuery) -> DataLoadResult<mpsc::Receiver<LoadEvent>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let events = match query.datasource.title.as_str() {
                "rejected" => return Err(DataLoadError::Executor("no such cube".into())),
                "broken" => vec![
                    LoadEvent::Metadata(vec!["n".into()]),
                    LoadEvent::Failed("timeout".into()),
                ],
                "hangup" => vec![LoadEvent::Metadata(vec!["n".into()])],
                _ => {
                    let offset = query.offset.unwrap_or(0);
                    let end = (offset + query.count.unwrap_or(25)).min(25);
                    vec![
                        LoadEvent::Metadata(vec!["n".into()]),
                        LoadEvent::Rows((offset..end).map(|n| vec![json!(n)]).collect()),
                        LoadEvent::Completed,
                    ]
                }
            };
            let (tx, rx) = mpsc::channel(events.len());
            for event in events {
                tx.send(event).await.unwrap();
            }
            Ok(rx)
        }
    }

    fn query(title: &str) -> JaqlQuery {
        JaqlQuery {
            datasource: DataSource::new(title),
            ..Default::default()
        }
    }

    fn service() -> DataLoadService<Warehouse> {
        DataLoadService::new(Warehouse::default(), CacheSettings::default())
    }

    async fn drain(mut rx: mpsc::Receiver<LoadEvent>) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn calls(svc: &DataLoadService<Warehouse>) -> usize {
        svc.executor().calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_cache_hit_replays_same_events() {
        let svc = service();
        let first = drain(svc.load(&query("Sample ECommerce")).await.unwrap()).await;
        tokio::task::yield_now().await;
        let second = drain(svc.load(&query("Sample ECommerce")).await.unwrap()).await;

        assert_eq!(first, second);
        assert_eq!(first.last(), Some(&LoadEvent::Completed));
        assert_eq!(calls(&svc), 1);
        assert_eq!(svc.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_query_guid_does_not_split_cache() {
        let svc = service();
        let mut a = query("Sample ECommerce");
        a.query_guid = "one".into();
        let mut b = a.clone();
        b.query_guid = "two".into();

        svc.load_result(&a).await.unwrap();
        tokio::task::yield_now().await;
        svc.load_result(&b).await.unwrap();
        assert_eq!(calls(&svc), 1);
    }

    #[tokio::test]
    async fn test_failed_stream_is_not_cached() {
        let svc = service();
        for _ in 0..2 {
            let err = svc.load_result(&query("broken")).await.unwrap_err();
            assert_eq!(err, DataLoadError::Failed("timeout".into()));
            tokio::task::yield_now().await;
        }
        assert_eq!(calls(&svc), 2);
        assert_eq!(svc.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_closed_stream_reported_as_failure() {
        let svc = service();
        let events = drain(svc.load(&query("hangup")).await.unwrap()).await;
        assert_eq!(
            events,
            vec![
                LoadEvent::Metadata(vec!["n".into()]),
                LoadEvent::Failed("executor closed the stream".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_executor_error_surfaces_from_load() {
        let err = service().load(&query("rejected")).await.unwrap_err();
        assert_eq!(err, DataLoadError::Executor("no such cube".into()));
        assert_eq!(err.to_string(), "query execution failed: no such cube");
    }

    #[tokio::test]
    async fn test_disabled_cache_always_executes() {
        let svc = DataLoadService::new(
            Warehouse::default(),
            CacheSettings {
                enabled: false,
                ..CacheSettings::default()
            },
        );
        svc.load_result(&query("a")).await.unwrap();
        tokio::task::yield_now().await;
        svc.load_result(&query("a")).await.unwrap();
        assert_eq!(calls(&svc), 2);
        assert_eq!(svc.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_load_all_keeps_input_order() {
        let svc = service();
        let results = svc
            .load_all(&[query("a"), query("broken"), query("b")])
            .await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().row_count(), 25);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().value(3, "n"), Some(&json!(3)));
    }

    /// Pages through a query with `offset`/`count`.
    struct QueryPages {
        service: DataLoadService<Warehouse>,
    }

    #[async_trait]
    impl PageLoader for QueryPages {
        type Item = Value;

        async fn load_page(&self, offset: usize, count: usize) -> DataLoadResult<Vec<Value>> {
            let mut q = query("paged");
            q.offset = Some(offset as u64);
            q.count = Some(count as u64);
            let result = self.service.load_result(&q).await?;
            Ok(result.rows.into_iter().filter_map(|r| r.into_iter().next()).collect())
        }
    }

    #[tokio::test]
    async fn test_pager_over_service() {
        let pager = LazyPager::new(QueryPages { service: service() }, 10);
        assert_eq!(pager.ensure(15).await.unwrap(), 20);
        assert!(pager.has_more().await);

        assert_eq!(pager.ensure(100).await.unwrap(), 25);
        assert!(!pager.has_more().await);
        assert_eq!(pager.items().await.last(), Some(&json!(24)));

        pager.reset().await;
        assert!(pager.is_empty().await);
        assert_eq!(pager.generation().await, 1);
        // Pages come from the cache after a reset
        tokio::task::yield_now().await;
        pager.ensure(10).await.unwrap();
        assert_eq!(pager.loader().service.executor().calls.load(Ordering::SeqCst), 3);
    }

    /// Holds each page until released.
    struct HeldPages {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl PageLoader for HeldPages {
        type Item = usize;

        async fn load_page(&self, offset: usize, count: usize) -> DataLoadResult<Vec<usize>> {
            self.started.notify_one();
            self.release.notified().await;
            Ok((offset..offset + count).collect())
        }
    }

    #[tokio::test]
    async fn test_pager_reset_discards_page_in_flight() {
        let pager = Arc::new(LazyPager::new(
            HeldPages {
                started: Notify::new(),
                release: Notify::new(),
            },
            10,
        ));

        let loading = tokio::spawn({
            let pager = Arc::clone(&pager);
            async move { pager.load_next().await }
        });
        pager.loader().started.notified().await;
        pager.reset().await;
        pager.loader().release.notify_one();

        assert_eq!(loading.await.unwrap().unwrap(), 0);
        assert_eq!(pager.len().await, 0);
        assert_eq!(pager.generation().await, 1);

        // The next load starts from the first page of the new generation
        let next = tokio::spawn({
            let pager = Arc::clone(&pager);
            async move { pager.load_next().await }
        });
        pager.loader().started.notified().await;
        pager.loader().release.notify_one();
        assert_eq!(next.await.unwrap().unwrap(), 10);
        assert_eq!(pager.items().await.first(), Some(&0));
    }

    #[tokio::test]
    async fn test_concurrent_pagers_fill_request() {
        let pager = LazyPager::new(QueryPages { service: service() }, 10);
        let (a, b) = tokio::join!(pager.ensure(20), pager.ensure(20));
        assert!(a.unwrap() >= 20);
        assert!(b.unwrap() >= 20);
        let expected: Vec<Value> = (0..pager.len().await).map(|n| json!(n)).collect();
        assert_eq!(pager.items().await, expected);
    }

    /// Transport returning one canned JAQL response and recording paths.
    struct CannedTransport {
        paths: Mutex<Vec<String>>,
        body: Value,
    }

    #[async_trait]
    impl HttpTransport for CannedTransport {
        async fn post(&self, path: &[&str], _body: &Value) -> RestResult<HttpResponse> {
            self.paths.lock().unwrap().push(path.join("/"));
            Ok(HttpResponse {
                status: 200,
                body: self.body.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_rest_executor_streams_chunks() {
        let transport = CannedTransport {
            paths: Mutex::new(Vec::new()),
            body: json!({
                "headers": ["Country", "Revenue"],
                "values": [
                    [{"data": "US", "text": "US"}, {"data": 10, "text": "10"}],
                    [{"data": "FR", "text": "FR"}, {"data": 7, "text": "7"}],
                    [{"data": "ES", "text": "ES"}, 3]
                ]
            }),
        };
        let api = Arc::new(RestApi::new(transport));
        let executor = RestQueryExecutor::new(Arc::clone(&api)).with_chunk_rows(2);

        let events = drain(executor.execute(&query("Sample ECommerce")).await.unwrap()).await;
        let kinds: Vec<_> = events
            .iter()
            .map(|e| match e {
                LoadEvent::Metadata(_) => "metadata".to_string(),
                LoadEvent::Rows(rows) => format!("rows:{}", rows.len()),
                LoadEvent::Completed => "completed".to_string(),
                LoadEvent::Failed(m) => format!("failed:{}", m),
            })
            .collect();
        assert_eq!(kinds, vec!["metadata", "rows:2", "rows:1", "completed"]);
        assert_eq!(
            api.transport().paths.lock().unwrap().as_slice(),
            ["api/datasources/Sample ECommerce/jaql"]
        );

        let svc = DataLoadService::new(executor, CacheSettings::default());
        let result = svc.load_result(&query("Sample ECommerce")).await.unwrap();
        assert_eq!(result.value(2, "Revenue"), Some(&json!(3)));
        assert_eq!(result.value(0, "Country"), Some(&json!("US")));

        let rx = svc.load(&query("Sample ECommerce")).await.unwrap();
        assert_eq!(load_result(rx).await.unwrap().row_count(), 3);
    }
}
