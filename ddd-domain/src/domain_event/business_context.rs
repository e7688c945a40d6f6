use bon::Builder;
use serde::{Deserialize, Serialize};

/// 业务上下文信息
///
/// 由调用方（API 层、消息消费者等）在发起命令时提供，
/// 随处理上下文流转，并在提交事件时冗余写入事件。
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContext {
    /// 关联ID
    correlation_id: Option<String>,
    /// 因果ID
    causation_id: Option<String>,
    /// 触发命令的主体类型（如用户、系统等）
    actor_type: Option<String>,
    /// 触发命令的主体ID
    actor_id: Option<String>,
}

impl BusinessContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }
}
