//! 事件持久化模型（SerializedEvent）
//!
//! 定义事件在事件存储中的标准形态：元信息 + JSON 负载。
//!
use crate::domain_event::BusinessContext;
use crate::error::DomainResult;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct SerializedEvent {
    /// 事件唯一标识符
    event_id: String,
    /// 事件类型，用于区分不同的事件
    event_type: String,
    /// 事件版本，用于事件版本控制和升级
    event_version: usize,
    /// 全局事件位点，由存储层在持久化后赋值
    sequence_number: Option<i64>,
    /// 聚合 ID，标识事件所属的聚合根实例
    aggregate_id: String,
    /// 聚合类型，用于区分不同的聚合根
    aggregate_type: String,
    /// 聚合版本，用于乐观锁和并发控制
    aggregate_version: usize,
    /// 关联 ID，用于将多个事件关联到同一个业务操作
    correlation_id: Option<String>,
    /// 因果 ID，用于表示事件的触发来源
    causation_id: Option<String>,
    /// 触发事件的主体类型（如用户、系统等）
    actor_type: Option<String>,
    /// 触发事件的主体 ID
    actor_id: Option<String>,
    /// 事件发生时间
    occurred_at: DateTime<Utc>,
    /// 事件负载，存储事件的具体数据
    payload: Value,
}

impl SerializedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> usize {
        self.event_version
    }

    pub fn sequence_number(&self) -> Option<i64> {
        self.sequence_number
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_version(&self) -> usize {
        self.aggregate_version
    }

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

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 将负载反序列化为具体类型
    pub fn payload_as<T>(&self) -> DomainResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// 用业务语境覆盖关联/因果/主体字段
    pub fn with_context(mut self, context: &BusinessContext) -> Self {
        self.correlation_id = context.correlation_id().map(str::to_string);
        self.causation_id = context.causation_id().map(str::to_string);
        self.actor_type = context.actor_type().map(str::to_string);
        self.actor_id = context.actor_id().map(str::to_string);
        self
    }

    #[cfg_attr(not(feature = "inmemory"), allow(dead_code))]
    pub(crate) fn assign_sequence_number(&mut self, sequence_number: i64) {
        self.sequence_number = Some(sequence_number);
    }
}
