//! 处理作用域（Handling Scope）
//!
//! 作用域按（命令类型，处理上下文）开启，负责解析该类型的有序处理器集合，
//! 并持有解析所需的资源。释放即 `Drop`：无论成功、无处理器或处理器失败，
//! 作用域都在执行路径返回前被释放且仅释放一次。
//!
use crate::{
    command::{Command, CommandType},
    command_handler::CommandHandler,
    context::HandlingContext,
    error::AppError,
};
use std::any::Any;
use std::sync::Arc;

type BoxAnySend = Box<dyn Any + Send>;

/// 作用域工厂：依赖解析容器在命令处理器侧的接口
pub trait ScopeFactory: Send + Sync {
    /// 为指定命令类型开启一个处理作用域
    fn begin_scope(
        &self,
        command_type: CommandType,
        ctx: &HandlingContext,
    ) -> Box<dyn HandlingScope>;
}

/// 处理作用域
pub trait HandlingScope: Send {
    /// 解析该作用域对应命令类型的处理器（顺序即调用顺序）
    fn resolve_handlers(&self) -> Result<ResolvedHandlers, AppError>;
}

/// 已解析的处理器序列（类型擦除）
///
/// 每个元素都是某个 `Arc<dyn CommandHandler<C>>`，只能通过类型化的
/// [`push`](Self::push) / [`from_handlers`](Self::from_handlers) 构造，
/// 在执行路径中以 [`into_typed`](Self::into_typed) 还原。
/// 每个元素同时记下其所属命令类型的名称，供类型不匹配时诊断。
#[derive(Default)]
pub struct ResolvedHandlers {
    handlers: Vec<(&'static str, BoxAnySend)>,
}

impl ResolvedHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_handlers<C, I>(handlers: I) -> Self
    where
        C: Command,
        I: IntoIterator<Item = Arc<dyn CommandHandler<C>>>,
    {
        let mut resolved = Self::new();
        for handler in handlers {
            resolved.push(handler);
        }
        resolved
    }

    pub fn push<C: Command>(&mut self, handler: Arc<dyn CommandHandler<C>>) {
        let erased: BoxAnySend = Box::new(handler);
        self.handlers.push((C::NAME, erased));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// 还原为命令类型 `C` 的处理器列表
    pub fn into_typed<C: Command>(self) -> Result<Vec<Arc<dyn CommandHandler<C>>>, AppError> {
        self.handlers
            .into_iter()
            .map(|(name, h)| match h.downcast::<Arc<dyn CommandHandler<C>>>() {
                Ok(handler) => Ok(*handler),
                Err(_) => Err(AppError::TypeMismatch {
                    expected: C::NAME,
                    found: name,
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Ping;
    impl Command for Ping {
        const NAME: &'static str = "Ping";
    }

    #[derive(Debug)]
    struct Pong;
    impl Command for Pong {
        const NAME: &'static str = "Pong";
    }

    struct PingHandler;

    #[async_trait]
    impl CommandHandler<Ping> for PingHandler {
        async fn handle(&self, _ctx: &HandlingContext, _cmd: &Ping) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[test]
    fn typed_roundtrip_keeps_order() {
        let a: Arc<dyn CommandHandler<Ping>> = Arc::new(PingHandler);
        let b: Arc<dyn CommandHandler<Ping>> = Arc::new(PingHandler);
        let resolved = ResolvedHandlers::from_handlers::<Ping, _>(vec![a.clone(), b.clone()]);
        assert_eq!(resolved.len(), 2);

        let typed = resolved.into_typed::<Ping>().unwrap();
        assert!(Arc::ptr_eq(&typed[0], &a));
        assert!(Arc::ptr_eq(&typed[1], &b));
    }

    #[test]
    fn wrong_command_type_is_a_mismatch() {
        let a: Arc<dyn CommandHandler<Ping>> = Arc::new(PingHandler);
        let resolved = ResolvedHandlers::from_handlers::<Ping, _>(vec![a]);

        match resolved.into_typed::<Pong>() {
            Err(AppError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, "Pong");
                assert_eq!(found, "Ping");
            }
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected type mismatch"),
        }
    }
}
