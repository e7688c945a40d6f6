use crate::{command::Command, context::HandlingContext, error::AppError};
use async_trait::async_trait;

/// 命令处理器：处理某一具体类型 `C` 的命令
///
/// 同一命令类型可以有零个、一个或多个处理器，由处理作用域按序解析。
/// 通过 `ctx.unit_of_work()` 向命令处理器报告产生的领域变更。
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &HandlingContext, cmd: &C) -> Result<(), AppError>;

    /// 处理器名称（用于日志与诊断）
    fn handler_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
