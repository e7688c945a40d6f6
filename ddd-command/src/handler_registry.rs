use crate::{
    command::{Command, CommandType},
    command_handler::CommandHandler,
    context::HandlingContext,
    error::AppError,
    scope::{HandlingScope, ResolvedHandlers, ScopeFactory},
};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

type HandlerResolver = Arc<dyn Fn(&HandlingContext, &mut ResolvedHandlers) + Send + Sync>;

struct Registration {
    name: &'static str,
    resolvers: Vec<HandlerResolver>,
}

/// 基于内存的处理器注册表
/// - 通过 TypeId 注册不同 Command 对应的一个或多个 Handler
/// - 作为 `ScopeFactory` 为每次命令处理开启作用域，按注册顺序解析处理器
/// - 支持共享实例（`register`）与按作用域构造（`register_scoped`）两种生命周期
#[derive(Default)]
pub struct HandlerRegistry {
    registrations: DashMap<TypeId, Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册共享的处理器实例，每个作用域解析到同一个实例
    pub fn register<C, H>(&self, handler: Arc<H>)
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.register_scoped::<C, H, _>(move |_: &HandlingContext| handler.clone());
    }

    /// 注册按作用域构造的处理器：每次开启作用域都以该次的上下文新建实例
    pub fn register_scoped<C, H, F>(&self, factory: F)
    where
        C: Command,
        H: CommandHandler<C> + 'static,
        F: Fn(&HandlingContext) -> Arc<H> + Send + Sync + 'static,
    {
        let resolver: HandlerResolver =
            Arc::new(move |ctx: &HandlingContext, out: &mut ResolvedHandlers| {
                let handler: Arc<dyn CommandHandler<C>> = factory(ctx);
                out.push(handler);
            });

        self.registrations
            .entry(TypeId::of::<C>())
            .or_insert_with(|| Registration {
                name: C::NAME,
                resolvers: Vec::new(),
            })
            .resolvers
            .push(resolver);
    }

    /// 已注册处理器的命令类型名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.registrations.iter().map(|e| e.value().name).collect()
    }

    pub fn handler_count<C: Command>(&self) -> usize {
        self.registrations
            .get(&TypeId::of::<C>())
            .map_or(0, |r| r.resolvers.len())
    }
}

impl ScopeFactory for HandlerRegistry {
    fn begin_scope(
        &self,
        command_type: CommandType,
        ctx: &HandlingContext,
    ) -> Box<dyn HandlingScope> {
        let resolvers = self
            .registrations
            .get(&command_type.id())
            .map(|r| r.resolvers.clone())
            .unwrap_or_default();

        tracing::trace!(command = %command_type, handlers = resolvers.len(), "scope opened");
        Box::new(RegistryScope {
            command_type,
            ctx: ctx.clone(),
            resolvers,
        })
    }
}

/// 注册表开启的作用域：持有该次上下文与注册快照
struct RegistryScope {
    command_type: CommandType,
    ctx: HandlingContext,
    resolvers: Vec<HandlerResolver>,
}

impl HandlingScope for RegistryScope {
    fn resolve_handlers(&self) -> Result<ResolvedHandlers, AppError> {
        let mut resolved = ResolvedHandlers::new();
        for resolver in &self.resolvers {
            resolver(&self.ctx, &mut resolved);
        }
        Ok(resolved)
    }
}

impl Drop for RegistryScope {
    fn drop(&mut self) {
        tracing::trace!(command = %self.command_type, "scope released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Rename {
        name: String,
    }
    impl Command for Rename {
        const NAME: &'static str = "Rename";
    }

    #[derive(Debug)]
    struct Archive;
    impl Command for Archive {
        const NAME: &'static str = "Archive";
    }

    struct Tagged(&'static str);

    #[async_trait]
    impl CommandHandler<Rename> for Tagged {
        async fn handle(&self, _ctx: &HandlingContext, cmd: &Rename) -> Result<(), AppError> {
            assert!(!cmd.name.is_empty());
            Ok(())
        }

        fn handler_name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn resolves_in_registration_order() {
        let registry = HandlerRegistry::new();
        registry.register::<Rename, _>(Arc::new(Tagged("first")));
        registry.register::<Rename, _>(Arc::new(Tagged("second")));
        assert_eq!(registry.handler_count::<Rename>(), 2);
        assert_eq!(registry.handler_count::<Archive>(), 0);
        assert_eq!(registry.registered_commands(), vec!["Rename"]);

        let ctx = HandlingContext::default();
        let scope = registry.begin_scope(CommandType::of::<Rename>(), &ctx);
        let handlers = scope
            .resolve_handlers()
            .unwrap()
            .into_typed::<Rename>()
            .unwrap();
        let names: Vec<_> = handlers.iter().map(|h| h.handler_name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn unregistered_type_resolves_nothing() {
        let registry = HandlerRegistry::new();
        let ctx = HandlingContext::default();
        let scope = registry.begin_scope(CommandType::of::<Archive>(), &ctx);
        assert!(scope.resolve_handlers().unwrap().is_empty());
    }

    #[test]
    fn scoped_factory_builds_fresh_instance_per_scope() {
        let registry = HandlerRegistry::new();
        let built = Arc::new(AtomicUsize::new(0));
        {
            let built = built.clone();
            registry.register_scoped::<Rename, _, _>(move |_ctx: &HandlingContext| {
                built.fetch_add(1, Ordering::SeqCst);
                Arc::new(Tagged("scoped"))
            });
        }

        for _ in 0..3 {
            let ctx = HandlingContext::default();
            let scope = registry.begin_scope(CommandType::of::<Rename>(), &ctx);
            assert_eq!(scope.resolve_handlers().unwrap().len(), 1);
        }
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn scoped_factory_sees_the_scope_context() {
        let registry = HandlerRegistry::new();
        registry.register_scoped::<Rename, _, _>(|ctx: &HandlingContext| {
            ctx.unit_of_work().register_change();
            Arc::new(Tagged("touching"))
        });

        let ctx = HandlingContext::default();
        let scope = registry.begin_scope(CommandType::of::<Rename>(), &ctx);
        scope.resolve_handlers().unwrap();
        assert!(ctx.unit_of_work().has_pending_changes());
    }
}
