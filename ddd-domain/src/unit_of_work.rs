//! 工作单元（UnitOfWork）
//!
//! 一次命令处理内的“是否存在待提交变更”标记：
//! - 由处理过程中被调用的协作方（聚合根、仓储等）置位，可重复置位；
//! - 命令处理器在全部处理器完成后读取一次，随后丢弃；
//! - 仅做观测，不承担事务或提交语义。
//!
use std::sync::atomic::{AtomicBool, Ordering};

/// 单次调用的工作单元
///
/// 状态流转：`Created(false) → [协作方置位为 true] → Observed`。
/// 使用原子标记，使处理上下文可以在处理器的挂起点之间以 `&` 共享。
#[derive(Debug, Default)]
pub struct UnitOfWork {
    pending: AtomicBool,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次领域变更
    pub fn register_change(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// 是否存在待提交的变更
    pub fn has_pending_changes(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
