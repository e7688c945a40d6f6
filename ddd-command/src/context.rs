use ddd_domain::UnitOfWork;
use ddd_domain::domain_event::BusinessContext;
use std::sync::Arc;

/// 处理上下文（Handling Context）
///
/// 每次 `CommandProcessor::process` 调用新建一份，承载：
/// - 工作单元（`UnitOfWork`）：处理器及其协作方在此登记领域变更；
/// - 业务语境（`BusinessContext`）：关联追踪 `correlation_id`、因果链 `causation_id`、
///   执行者类型/ID 等。
///
/// 克隆得到的上下文与原上下文共享同一个工作单元（属于同一次调用）；
/// 命令处理器不会在不同调用之间复用上下文。
///
/// ```rust
/// use ddd_command::context::HandlingContext;
/// use ddd_domain::domain_event::BusinessContext;
///
/// let ctx = HandlingContext::new(
///     BusinessContext::builder()
///         .maybe_correlation_id(Some("cor-123".into()))
///         .build(),
/// );
/// ctx.unit_of_work().register_change();
/// assert!(ctx.clone().unit_of_work().has_pending_changes());
/// ```
#[derive(Clone, Debug, Default)]
pub struct HandlingContext {
    biz: BusinessContext,
    unit_of_work: Arc<UnitOfWork>,
}

impl HandlingContext {
    pub fn new(biz: BusinessContext) -> Self {
        Self {
            biz,
            unit_of_work: Arc::new(UnitOfWork::new()),
        }
    }

    /// 业务语境（链路追踪、审计主体、操作因果）
    pub fn biz(&self) -> &BusinessContext {
        &self.biz
    }

    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.unit_of_work
    }
}
