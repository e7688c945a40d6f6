use crate::{command::AnyCommand, context::HandlingContext, error::AppError};
use async_trait::async_trait;
use ddd_domain::persist::EventStore;

/// 待提交变更钩子（Pending Changes Hook）
///
/// 命令处理成功、且工作单元报告存在待提交变更时，由命令处理器调用，
/// 交由外围系统决定如何把变更落入事件存储。
/// 命令处理器自身从不向事件存储写入。
#[async_trait]
pub trait PendingChangesHook<E>: Send + Sync
where
    E: EventStore + ?Sized,
{
    async fn commit(
        &self,
        event_store: &E,
        command: &dyn AnyCommand,
        ctx: &HandlingContext,
    ) -> Result<(), AppError>;
}
