//! Cursor-following pagination loop
//!
//! One request at a time, never concurrently: each request depends on the
//! cursor returned by the previous page. The loop ends when the cursor is
//! exhausted, the target limit is reached, or the batch safety cap trips.
//! A failure mid-pagination aborts the whole execution and discards the
//! accumulator; callers see only the error.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};

use crate::api::constants::{BATCH_SIZE, INTER_BATCH_DELAY, MAX_BATCHES};
use crate::api::models::{Record, ResultPage};
use crate::api::query::query::QueryDescriptor;
use crate::api::query::result::QueryResult;

/// One page fetch against the search or list endpoint.
///
/// The real implementation is the HTTP client; tests script pages through
/// an in-memory source. This is the narrow boundary behind which all
/// network I/O sits.
#[async_trait]
pub trait PageSource {
    async fn fetch_page(
        &self,
        descriptor: &QueryDescriptor,
        cursor: Option<&str>,
        batch_size: usize,
    ) -> Result<ResultPage>;
}

/// Per-execution pagination state, discarded when the loop ends.
/// The cursor is `None` on the first iteration only.
#[derive(Debug, Default)]
struct PageRequestState {
    cursor: Option<String>,
    batches_fetched: usize,
    records_fetched: usize,
}

/// Run the descriptor to completion against a page source.
///
/// Each iteration requests `min(100, target - fetched)` records. Roughly
/// 100 ms of pacing separates consecutive requests; this is courtesy to the
/// upstream API, not a retry mechanism.
pub async fn run<S>(source: &S, descriptor: &QueryDescriptor) -> Result<QueryResult>
where
    S: PageSource + Sync + ?Sized,
{
    descriptor.validate()?;
    let target = descriptor.target_limit();
    let mut state = PageRequestState::default();
    let mut records: Vec<Record> = Vec::new();

    loop {
        let batch_size = BATCH_SIZE.min(target - state.records_fetched);
        debug!(
            "fetching batch {} for {} ({} records collected)",
            state.batches_fetched + 1,
            descriptor.object_type,
            state.records_fetched
        );

        let page = source
            .fetch_page(descriptor, state.cursor.as_deref(), batch_size)
            .await?;

        state.batches_fetched += 1;
        state.records_fetched += page.records.len();
        records.extend(page.records);

        match page.next_cursor {
            Some(cursor) => state.cursor = Some(cursor),
            None => {
                debug!("no further pages, reached end of data");
                break;
            }
        }
        if state.records_fetched >= target {
            debug!("reached target of {target} records");
            break;
        }
        if state.batches_fetched >= MAX_BATCHES {
            warn!("stopping after {MAX_BATCHES} batches; the server kept returning a cursor");
            break;
        }

        tokio::time::sleep(INTER_BATCH_DELAY).await;
    }

    // The server should never hand back more than was asked for, but the
    // limit contract holds regardless.
    records.truncate(target);

    Ok(QueryResult {
        records,
        batches: state.batches_fetched,
        target_limit: target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::filters::{Filter, FilterGroup, FilterOperator};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn make_records(count: usize, offset: usize) -> Vec<Record> {
        (0..count)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": (offset + i).to_string(),
                    "properties": {"email": format!("user{}@example.com", offset + i)}
                }))
                .unwrap()
            })
            .collect()
    }

    fn descriptor(limit: Option<u32>) -> QueryDescriptor {
        QueryDescriptor {
            object_type: "contacts".into(),
            properties: vec!["email".into()],
            filter_groups: Vec::new(),
            limit,
        }
    }

    /// Serves a fixed script of pages and records every requested batch size
    struct ScriptedSource {
        pages: Mutex<VecDeque<Result<ResultPage>>>,
        requested_sizes: Mutex<Vec<usize>>,
        cursors_seen: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<ResultPage>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requested_sizes: Mutex::new(Vec::new()),
                cursors_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _descriptor: &QueryDescriptor,
            cursor: Option<&str>,
            batch_size: usize,
        ) -> Result<ResultPage> {
            self.requested_sizes.lock().unwrap().push(batch_size);
            self.cursors_seen
                .lock()
                .unwrap()
                .push(cursor.map(String::from));
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .expect("executor requested more pages than scripted")
        }
    }

    /// Always returns a full page and a fresh cursor, like a server with a
    /// pagination bug
    struct EndlessSource {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl PageSource for EndlessSource {
        async fn fetch_page(
            &self,
            _descriptor: &QueryDescriptor,
            _cursor: Option<&str>,
            batch_size: usize,
        ) -> Result<ResultPage> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            Ok(ResultPage {
                records: make_records(batch_size, *calls * 1000),
                next_cursor: Some(format!("cursor-{}", *calls)),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_page_scenario() {
        // Pages of 100, 100, 50 with cursors c1, c2, none: 3 requests,
        // 250 records, no 4th request.
        let source = ScriptedSource::new(vec![
            Ok(ResultPage { records: make_records(100, 0), next_cursor: Some("c1".into()) }),
            Ok(ResultPage { records: make_records(100, 100), next_cursor: Some("c2".into()) }),
            Ok(ResultPage { records: make_records(50, 200), next_cursor: None }),
        ]);

        let result = run(&source, &descriptor(Some(250))).await.unwrap();

        assert_eq!(result.batches, 3);
        assert_eq!(result.records.len(), 250);
        assert_eq!(*source.requested_sizes.lock().unwrap(), vec![100, 100, 50]);
        assert_eq!(
            *source.cursors_seen.lock().unwrap(),
            vec![None, Some("c1".into()), Some("c2".into())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_target_even_with_cursor() {
        // Server still has data after the target is met; no extra request.
        let source = ScriptedSource::new(vec![
            Ok(ResultPage { records: make_records(100, 0), next_cursor: Some("c1".into()) }),
            Ok(ResultPage { records: make_records(100, 100), next_cursor: Some("c2".into()) }),
        ]);

        let result = run(&source, &descriptor(Some(150))).await.unwrap();

        assert_eq!(result.batches, 2);
        assert_eq!(result.records.len(), 150);
        assert_eq!(*source.requested_sizes.lock().unwrap(), vec![100, 50]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_never_exceeded() {
        // A misbehaving server returns more rows than requested; the result
        // is still clamped to the target.
        let source = ScriptedSource::new(vec![Ok(ResultPage {
            records: make_records(100, 0),
            next_cursor: Some("c1".into()),
        })]);

        let result = run(&source, &descriptor(Some(80))).await.unwrap();

        assert_eq!(result.records.len(), 80);
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_end_without_cursor() {
        let source = ScriptedSource::new(vec![Ok(ResultPage {
            records: make_records(37, 0),
            next_cursor: None,
        })]);

        let result = run(&source, &descriptor(Some(1000))).await.unwrap();

        assert_eq!(result.batches, 1);
        assert_eq!(result.records.len(), 37);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safety_cap_stops_endless_cursor() {
        let source = EndlessSource { calls: Mutex::new(0) };

        let result = run(&source, &descriptor(None)).await.unwrap();

        assert_eq!(result.batches, MAX_BATCHES);
        assert_eq!(*source.calls.lock().unwrap(), MAX_BATCHES);
        assert_eq!(result.records.len(), MAX_BATCHES * BATCH_SIZE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_mid_pagination_discards_everything() {
        let source = ScriptedSource::new(vec![
            Ok(ResultPage { records: make_records(100, 0), next_cursor: Some("c1".into()) }),
            Err(anyhow::anyhow!("Internal error")),
        ]);

        let err = run(&source, &descriptor(Some(500))).await.unwrap_err();

        assert_eq!(err.to_string(), "Internal error");
    }

    #[tokio::test]
    async fn test_rejects_invalid_descriptor() {
        let source = ScriptedSource::new(vec![]);
        let bad = QueryDescriptor {
            object_type: "contacts".into(),
            properties: Vec::new(),
            filter_groups: Vec::new(),
            limit: None,
        };

        assert!(run(&source, &bad).await.is_err());
        assert!(source.requested_sizes.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_filtered_descriptor_flows_through() {
        // Pagination treats filtered and unfiltered descriptors the same;
        // endpoint selection is the page source's concern.
        let source = ScriptedSource::new(vec![Ok(ResultPage {
            records: make_records(5, 0),
            next_cursor: None,
        })]);

        let mut d = descriptor(Some(10));
        d.filter_groups = vec![FilterGroup::new(vec![Filter::new(
            "email",
            FilterOperator::IsKnown,
            None,
        )])];

        let result = run(&source, &d).await.unwrap();
        assert_eq!(result.records.len(), 5);
    }
}
