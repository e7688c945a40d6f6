//! 命令处理器（CommandProcessor）
//!
//! 命令处理的唯一入口，编排一次调用的完整流程：
//! 1. 校验命令存在，新建工作单元与处理上下文；
//! 2. 按命令运行时的具体类型，从分发缓存取得（或首次构造）执行路径；
//! 3. 执行路径开启处理作用域、解析处理器并依次调用，返回前释放作用域；
//! 4. 成功后读取一次工作单元，若存在待提交变更则交给 `PendingChangesHook`。
//!
//! 除分发缓存外不持有任何可变状态，可通过 `Arc` 在任意任务间并发调用。
//!
use crate::{
    command::{AnyCommand, Command},
    context::HandlingContext,
    dispatch_cache::DispatchCache,
    error::AppError,
    pending_changes::PendingChangesHook,
    scope::ScopeFactory,
};
use bon::Builder;
use ddd_domain::domain_event::BusinessContext;
use ddd_domain::persist::EventStore;
use std::sync::Arc;
use tracing::Instrument;

/// 命令处理器
///
/// - `E`：事件存储类型，交由 `PendingChangesHook` 使用
///
/// 分发缓存归处理器实例所有：同一实例的所有调用、所有任务共享同一份缓存，
/// 应用内通过 `Arc` 共享一个处理器即得到进程级的复用；不同实例之间互不影响。
///
/// ```rust
/// use async_trait::async_trait;
/// use ddd_command::command_handler::CommandHandler;
/// use ddd_command::context::HandlingContext;
/// use ddd_command::error::AppError;
/// use ddd_command::{Command, CommandProcessor, HandlerRegistry};
/// use ddd_domain::persist::InMemoryEventStore;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct OpenAccount {
///     owner: String,
/// }
///
/// impl Command for OpenAccount {
///     const NAME: &'static str = "OpenAccount";
/// }
///
/// struct OpenAccountHandler;
///
/// #[async_trait]
/// impl CommandHandler<OpenAccount> for OpenAccountHandler {
///     async fn handle(&self, ctx: &HandlingContext, cmd: &OpenAccount) -> Result<(), AppError> {
///         assert_eq!(cmd.owner, "alice");
///         ctx.unit_of_work().register_change();
///         Ok(())
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), AppError> {
/// let registry = HandlerRegistry::new();
/// registry.register::<OpenAccount, _>(Arc::new(OpenAccountHandler));
///
/// let processor = CommandProcessor::builder()
///     .scopes(Arc::new(registry))
///     .event_store(Arc::new(InMemoryEventStore::<String>::new()))
///     .build();
///
/// processor.send(OpenAccount { owner: "alice".into() }).await?;
/// processor.send(OpenAccount { owner: "alice".into() }).await?;
/// assert_eq!(processor.dispatch_cache().constructions(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct CommandProcessor<E>
where
    E: EventStore,
{
    /// 作用域工厂（依赖解析容器）
    scopes: Arc<dyn ScopeFactory>,
    event_store: Arc<E>,
    /// 可选：提交待提交变更的钩子；未配置时只记录日志
    hook: Option<Arc<dyn PendingChangesHook<E>>>,
    #[builder(skip)]
    cache: DispatchCache,
}

impl<E> CommandProcessor<E>
where
    E: EventStore,
{
    /// 处理一个类型擦除的命令
    ///
    /// `None` 表示上游未能产出命令，立即返回 `InvalidArgument`，不分配任何资源。
    pub async fn process(&self, command: Option<Arc<dyn AnyCommand>>) -> Result<(), AppError> {
        self.process_in(BusinessContext::default(), command).await
    }

    /// 携带调用方业务语境处理命令
    pub async fn process_in(
        &self,
        biz: BusinessContext,
        command: Option<Arc<dyn AnyCommand>>,
    ) -> Result<(), AppError> {
        let Some(command) = command else {
            return Err(AppError::InvalidArgument(
                "command must not be absent".to_string(),
            ));
        };

        let command_type = command.command_type();
        let span = tracing::debug_span!(
            "process_command",
            command = %command_type,
            correlation_id = biz.correlation_id()
        );

        let ctx = HandlingContext::new(biz);
        let path = self.cache.resolve(command.as_ref());

        path.execute(self.scopes.as_ref(), command.clone(), &ctx)
            .instrument(span.clone())
            .await?;

        self.complete(command.as_ref(), &ctx)
            .instrument(span)
            .await
    }

    /// 处理一个具体类型的命令
    pub async fn send<C: Command>(&self, command: C) -> Result<(), AppError> {
        let command: Arc<dyn AnyCommand> = Arc::new(command);
        self.process(Some(command)).await
    }

    /// 在组合阶段预先绑定命令类型 `C` 的执行路径
    pub fn prebind<C: Command>(&self) -> &Self {
        self.cache.bind::<C>();
        self
    }

    pub fn dispatch_cache(&self) -> &DispatchCache {
        &self.cache
    }

    pub fn event_store(&self) -> &Arc<E> {
        &self.event_store
    }

    async fn complete(
        &self,
        command: &dyn AnyCommand,
        ctx: &HandlingContext,
    ) -> Result<(), AppError> {
        if !ctx.unit_of_work().has_pending_changes() {
            return Ok(());
        }

        match &self.hook {
            Some(hook) => {
                tracing::debug!("committing pending changes");
                hook.commit(self.event_store.as_ref(), command, ctx).await
            }
            None => {
                tracing::debug!("pending changes left uncommitted, no hook configured");
                Ok(())
            }
        }
    }
}
