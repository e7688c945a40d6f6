//! 领域事件语境（Domain Event Context）
//!
//! 命令处理与事件持久化共享的业务语境：关联追踪、因果链与执行主体。

mod business_context;

pub use business_context::BusinessContext;
