//! 内存版事件存储（InMemoryEventStore）
//!
//! 基于 `tokio::sync::RwLock` 的轻量事件存储，满足 `EventStore` 协议：
//! - 追加时按流的最新聚合版本做乐观并发校验，批内版本须连续；
//! - 为每条事件分配全局单调递增的位点（`sequence_number`）；
//! - 典型用途：测试环境、示例与本地开发。
//!
use crate::error::{DomainError, DomainResult};
use crate::persist::{EventStore, SerializedEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use tokio::sync::RwLock;

pub struct InMemoryEventStore<Id = String> {
    inner: RwLock<Streams<Id>>,
}

struct Streams<Id> {
    by_id: HashMap<Id, Vec<SerializedEvent>>,
    next_sequence: i64,
}

impl<Id> Default for InMemoryEventStore<Id> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Streams {
                by_id: HashMap::new(),
                next_sequence: 1,
            }),
        }
    }
}

impl<Id> InMemoryEventStore<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存储的事件总数
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<Id> EventStore for InMemoryEventStore<Id>
where
    Id: Eq + Hash + Clone + Display + Send + Sync,
{
    type Id = Id;

    async fn append(
        &self,
        stream_id: &Id,
        expected_version: usize,
        events: Vec<SerializedEvent>,
    ) -> DomainResult<()> {
        let mut guard = self.inner.write().await;
        let Streams {
            by_id,
            next_sequence,
        } = &mut *guard;

        let actual = by_id
            .get(stream_id)
            .and_then(|stream| stream.last())
            .map_or(0, SerializedEvent::aggregate_version);
        if actual != expected_version {
            return Err(DomainError::VersionConflict {
                expected: expected_version,
                actual,
            });
        }

        // 批内事件必须属于该流，且版本从 expected_version + 1 起连续递增
        let stream_key = stream_id.to_string();
        for (offset, event) in events.iter().enumerate() {
            if event.aggregate_id() != stream_key {
                return Err(DomainError::InvalidState {
                    reason: format!(
                        "event {} belongs to aggregate {}, not stream {}",
                        event.event_id(),
                        event.aggregate_id(),
                        stream_key
                    ),
                });
            }
            let next = expected_version + offset + 1;
            if event.aggregate_version() != next {
                return Err(DomainError::VersionConflict {
                    expected: next,
                    actual: event.aggregate_version(),
                });
            }
        }

        if events.is_empty() {
            return Ok(());
        }

        let stream = by_id.entry(stream_id.clone()).or_default();
        let count = events.len();
        for mut event in events {
            event.assign_sequence_number(*next_sequence);
            *next_sequence += 1;
            stream.push(event);
        }

        tracing::debug!(stream = %stream_id, count, "events appended");
        Ok(())
    }

    async fn read(&self, stream_id: &Id) -> DomainResult<Vec<SerializedEvent>> {
        let guard = self.inner.read().await;
        Ok(guard.by_id.get(stream_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn mk_event(aggregate_id: &str, version: usize) -> SerializedEvent {
        SerializedEvent::builder()
            .event_id(ulid::Ulid::new().to_string())
            .event_type("AccountEvent.Deposited".to_string())
            .event_version(1)
            .aggregate_id(aggregate_id.to_string())
            .aggregate_type("account".to_string())
            .aggregate_version(version)
            .occurred_at(Utc::now())
            .payload(serde_json::json!({ "amount": version * 10 }))
            .build()
    }

    #[tokio::test]
    async fn append_and_read_keeps_order_and_assigns_sequence() {
        let store = InMemoryEventStore::<String>::new();
        let id = "acc-1".to_string();

        store
            .append(&id, 0, vec![mk_event("acc-1", 1), mk_event("acc-1", 2)])
            .await
            .unwrap();
        store.append(&id, 2, vec![mk_event("acc-1", 3)]).await.unwrap();

        let events = store.read(&id).await.unwrap();
        let versions: Vec<usize> = events.iter().map(|e| e.aggregate_version()).collect();
        assert_eq!(versions, vec![1, 2, 3]);

        let seqs: Vec<i64> = events.iter().filter_map(|e| e.sequence_number()).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn append_with_stale_version_conflicts() {
        let store = InMemoryEventStore::<String>::new();
        let id = "acc-2".to_string();
        store.append(&id, 0, vec![mk_event("acc-2", 1)]).await.unwrap();

        let err = store
            .append(&id, 0, vec![mk_event("acc-2", 2)])
            .await
            .unwrap_err();
        match err {
            DomainError::VersionConflict { expected, actual } => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(store.read(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn batch_versions_must_continue_the_stream() {
        let store = InMemoryEventStore::<String>::new();
        let id = "acc-4".to_string();

        let err = store
            .append(&id, 0, vec![mk_event("acc-4", 7), mk_event("acc-4", 3)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::VersionConflict {
                expected: 1,
                actual: 7
            }
        ));

        let err = store
            .append(&id, 0, vec![mk_event("acc-4", 1), mk_event("acc-4", 3)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::VersionConflict {
                expected: 2,
                actual: 3
            }
        ));

        // 被拒绝的批次不留下任何事件，也不会占用位点
        assert!(store.is_empty().await);
        store
            .append(&id, 0, vec![mk_event("acc-4", 1), mk_event("acc-4", 2)])
            .await
            .unwrap();
        store.append(&id, 2, vec![mk_event("acc-4", 3)]).await.unwrap();

        let events = store.read(&id).await.unwrap();
        let versions: Vec<usize> = events.iter().map(|e| e.aggregate_version()).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(events[0].sequence_number(), Some(1));
        assert_eq!(store.read_after(&id, 2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn events_of_another_aggregate_are_rejected() {
        let store = InMemoryEventStore::<String>::new();
        let id = "acc-5".to_string();

        let err = store
            .append(&id, 0, vec![mk_event("acc-5", 1), mk_event("acc-6", 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
        assert!(store.read(&id).await.unwrap().is_empty());

        // 空批次与失败的追加都不会创建流
        store.append(&id, 0, Vec::new()).await.unwrap();
        assert!(store.inner.read().await.by_id.is_empty());
    }

    #[tokio::test]
    async fn read_after_filters_by_version_and_unknown_stream_is_empty() {
        let store = InMemoryEventStore::<String>::new();
        let id = "acc-3".to_string();
        store
            .append(
                &id,
                0,
                vec![mk_event("acc-3", 1), mk_event("acc-3", 2), mk_event("acc-3", 3)],
            )
            .await
            .unwrap();

        let tail = store.read_after(&id, 1).await.unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].aggregate_version(), 2);

        assert!(store.read(&"missing".to_string()).await.unwrap().is_empty());
    }
}
