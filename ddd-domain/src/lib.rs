//! DDD 领域层基础库（ddd-domain）
//!
//! 为命令处理提供领域侧的最小协议与构件：
//! - 工作单元（`unit_of_work`）：记录一次命令处理中是否产生了待提交的领域变更
//! - 业务语境（`domain_event`）：关联追踪、因果链与执行主体
//! - 事件存储（`persist`）：按流标识追加/读取事件的协议与内存实现
//!
//! 本 crate 不关心变更“是什么”，只提供“是否发生”的观测点与持久化协议，
//! 具体存储后端（如 Postgres）由上层提供实现并注入。
//!
pub mod domain_event;
pub mod error;
pub mod persist;
pub mod unit_of_work;

pub use unit_of_work::UnitOfWork;
