//! 命令处理（ddd-command）
//!
//! 接收具体类型只在运行时可知的命令，按类型路由到已注册的处理器，
//! 并观测处理过程是否产生了待提交的领域变更。
//!
//! - `command` / `command_handler`：命令与处理器协议
//! - `context`：单次调用的处理上下文（工作单元 + 业务语境）
//! - `scope` / `handler_registry`：处理作用域协议及其内存实现
//! - `dispatch_cache`：类型 → 执行路径的并发缓存
//! - `command_processor`：编排入口
//! - `pending_changes`：变更提交的显式扩展点
//!
pub mod command;
pub mod command_handler;
pub mod command_processor;
pub mod context;
pub mod dispatch_cache;
pub mod error;
pub mod handler_registry;
pub mod pending_changes;
pub mod scope;

pub use command::{AnyCommand, Command, CommandType};
pub use command_processor::CommandProcessor;
pub use handler_registry::HandlerRegistry;
