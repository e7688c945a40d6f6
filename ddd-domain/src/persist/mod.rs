//! 持久化（persist）
//!
//! 定义事件存储协议及其持久化模型：
//! - 事件追加与按流读取（`EventStore`）；
//! - 事件的存储形态（`SerializedEvent`）；
//! - 内存实现（`InMemoryEventStore`，需启用 `inmemory` 特性）。
//!
//! 该模块聚焦协议，具体存储后端（如 Postgres）由上层提供实现并注入。
//!
mod event_store;
#[cfg(feature = "inmemory")]
mod inmemory_event_store;
mod serialized_event;

pub use event_store::EventStore;
#[cfg(feature = "inmemory")]
pub use inmemory_event_store::InMemoryEventStore;
pub use serialized_event::SerializedEvent;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::BusinessContext;
    use chrono::Utc;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Deposited {
        amount: u64,
    }

    #[test]
    fn with_context_copies_business_fields() {
        let ctx = BusinessContext::builder()
            .maybe_correlation_id(Some("cor-1".into()))
            .maybe_causation_id(Some("cau-1".into()))
            .maybe_actor_type(Some("user".into()))
            .maybe_actor_id(Some("u-1".into()))
            .build();

        let ev = SerializedEvent::builder()
            .event_id(ulid::Ulid::new().to_string())
            .event_type("AccountEvent.Deposited".to_string())
            .event_version(1)
            .aggregate_id("acc-1".to_string())
            .aggregate_type("account".to_string())
            .aggregate_version(1)
            .occurred_at(Utc::now())
            .payload(serde_json::json!({ "amount": 100 }))
            .build()
            .with_context(&ctx);

        assert_eq!(ev.correlation_id(), Some("cor-1"));
        assert_eq!(ev.causation_id(), Some("cau-1"));
        assert_eq!(ev.actor_type(), Some("user"));
        assert_eq!(ev.actor_id(), Some("u-1"));
        assert_eq!(ev.sequence_number(), None);

        let payload: Deposited = ev.payload_as().unwrap();
        assert_eq!(payload, Deposited { amount: 100 });
    }
}
