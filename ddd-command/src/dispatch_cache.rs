//! 分发缓存（Dispatch Cache）
//!
//! 将命令的运行时类型（`TypeId`）映射到与该类型绑定的执行路径：
//! - 首次遇到某类型时构造，之后所有调用复用同一条路径；
//! - 路径只由类型决定，由 `AnyCommand` 的泛型实现单态化生成，无需反射；
//! - 底层为 `DashMap`，不同类型落在不同分片，互不阻塞。
//!
use crate::{
    command::{AnyCommand, Command, CommandType},
    context::HandlingContext,
    error::AppError,
    scope::ScopeFactory,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 与具体命令类型绑定的执行路径
///
/// 打开处理作用域 → 解析处理器 → 依次调用；作用域在返回前释放。
#[async_trait]
pub trait ExecutionPath: Send + Sync {
    fn command_type(&self) -> CommandType;

    async fn execute(
        &self,
        scopes: &dyn ScopeFactory,
        command: Arc<dyn AnyCommand>,
        ctx: &HandlingContext,
    ) -> Result<(), AppError>;
}

pub(crate) struct TypedExecutionPath<C> {
    _marker: PhantomData<fn() -> C>,
}

impl<C> TypedExecutionPath<C> {
    pub(crate) fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<C> ExecutionPath for TypedExecutionPath<C>
where
    C: Command,
{
    fn command_type(&self) -> CommandType {
        CommandType::of::<C>()
    }

    async fn execute(
        &self,
        scopes: &dyn ScopeFactory,
        command: Arc<dyn AnyCommand>,
        ctx: &HandlingContext,
    ) -> Result<(), AppError> {
        let Some(cmd) = command.downcast_ref::<C>() else {
            return Err(AppError::TypeMismatch {
                expected: C::NAME,
                found: command.command_type().name(),
            });
        };

        let scope = scopes.begin_scope(CommandType::of::<C>(), ctx);
        let handlers = scope.resolve_handlers()?.into_typed::<C>()?;

        if handlers.is_empty() {
            tracing::warn!(command = C::NAME, "no handler resolved for command");
            return Err(AppError::UnhandledCommand {
                command: command.clone(),
            });
        }

        for handler in &handlers {
            tracing::trace!(handler = handler.handler_name(), "invoking handler");
            if let Err(err) = handler.handle(ctx, cmd).await {
                tracing::debug!(handler = handler.handler_name(), error = %err, "handler failed");
                return Err(err);
            }
        }

        drop(scope);
        Ok(())
    }
}

/// 命令类型 → 执行路径 的并发缓存
#[derive(Default)]
pub struct DispatchCache {
    paths: DashMap<TypeId, Arc<dyn ExecutionPath>>,
    constructions: AtomicUsize,
}

impl DispatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得命令具体类型的执行路径，不存在则构造并缓存
    pub fn resolve(&self, command: &dyn AnyCommand) -> Arc<dyn ExecutionPath> {
        let command_type = command.command_type();
        self.get_or_bind(command_type, || command.bind())
    }

    /// 预先绑定命令类型 `C`（组合阶段调用，幂等）
    pub fn bind<C: Command>(&self) -> Arc<dyn ExecutionPath> {
        self.get_or_bind(CommandType::of::<C>(), || {
            Arc::new(TypedExecutionPath::<C>::new())
        })
    }

    fn get_or_bind<F>(&self, command_type: CommandType, bind: F) -> Arc<dyn ExecutionPath>
    where
        F: FnOnce() -> Arc<dyn ExecutionPath>,
    {
        if let Some(path) = self.paths.get(&command_type.id()) {
            return path.clone();
        }

        let path = self
            .paths
            .entry(command_type.id())
            .or_insert_with(|| {
                self.constructions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(command = %command_type, "dispatch path bound");
                bind()
            })
            .clone();

        debug_assert_eq!(path.command_type(), command_type);
        path
    }

    pub fn contains(&self, command_type: CommandType) -> bool {
        self.paths.contains_key(&command_type.id())
    }

    /// 已缓存的命令类型数量
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// 执行路径累计构造次数
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::Relaxed)
    }
}
