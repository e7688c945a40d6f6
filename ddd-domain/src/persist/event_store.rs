use crate::{error::DomainResult, persist::SerializedEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// 事件存储（Event Store）
///
/// 以流标识（通常为聚合 ID）为键追加与读取事件：
/// - `append` 使用期望版本做乐观并发控制，版本不符返回 `VersionConflict`；
/// - `read` 按追加顺序返回整条流；
/// - `read_after` 仅返回聚合版本大于给定版本的事件（用于增量重放）。
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 流标识类型
    type Id: Send + Sync;

    async fn append(
        &self,
        stream_id: &Self::Id,
        expected_version: usize,
        events: Vec<SerializedEvent>,
    ) -> DomainResult<()>;

    async fn read(&self, stream_id: &Self::Id) -> DomainResult<Vec<SerializedEvent>>;

    async fn read_after(
        &self,
        stream_id: &Self::Id,
        version: usize,
    ) -> DomainResult<Vec<SerializedEvent>> {
        let events = self.read(stream_id).await?;
        Ok(events
            .into_iter()
            .filter(|e| e.aggregate_version() > version)
            .collect())
    }
}

#[async_trait]
impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    type Id = T::Id;

    async fn append(
        &self,
        stream_id: &Self::Id,
        expected_version: usize,
        events: Vec<SerializedEvent>,
    ) -> DomainResult<()> {
        (**self).append(stream_id, expected_version, events).await
    }

    async fn read(&self, stream_id: &Self::Id) -> DomainResult<Vec<SerializedEvent>> {
        (**self).read(stream_id).await
    }

    async fn read_after(
        &self,
        stream_id: &Self::Id,
        version: usize,
    ) -> DomainResult<Vec<SerializedEvent>> {
        (**self).read_after(stream_id, version).await
    }
}
