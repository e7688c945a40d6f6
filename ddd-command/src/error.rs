use crate::command::AnyCommand;
use ddd_domain::error::DomainError;
use std::sync::Arc;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("authorization: {0}")]
    Authorization(String),

    #[error("infra: {0}")]
    Infra(String),

    /// 命令类型没有任何可解析的处理器；携带原始命令便于诊断
    #[error("unhandled command: {}", .command.command_type())]
    UnhandledCommand { command: Arc<dyn AnyCommand> },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
