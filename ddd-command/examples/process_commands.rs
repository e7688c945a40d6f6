use async_trait::async_trait;
use chrono::Utc;
use ddd_command::command_handler::CommandHandler;
use ddd_command::context::HandlingContext;
use ddd_command::error::AppError;
use ddd_command::pending_changes::PendingChangesHook;
use ddd_command::{AnyCommand, Command, CommandProcessor, HandlerRegistry};
use ddd_domain::domain_event::BusinessContext;
use ddd_domain::persist::{EventStore, InMemoryEventStore, SerializedEvent};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug)]
struct CreateUser {
    name: String,
}

impl Command for CreateUser {
    const NAME: &'static str = "CreateUser";
}

struct CreateUserHandler;

#[async_trait]
impl CommandHandler<CreateUser> for CreateUserHandler {
    async fn handle(&self, ctx: &HandlingContext, cmd: &CreateUser) -> Result<(), AppError> {
        if cmd.name.is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        info!(name = %cmd.name, "user created");
        ctx.unit_of_work().register_change();
        Ok(())
    }
}

/// 第二个处理器：只读，不登记变更
struct WelcomeMailHandler;

#[async_trait]
impl CommandHandler<CreateUser> for WelcomeMailHandler {
    async fn handle(&self, _ctx: &HandlingContext, cmd: &CreateUser) -> Result<(), AppError> {
        info!(name = %cmd.name, "welcome mail queued");
        Ok(())
    }
}

#[derive(Debug)]
struct DeleteUser {
    id: u32,
}

impl Command for DeleteUser {
    const NAME: &'static str = "DeleteUser";
}

struct DeleteUserHandler;

#[async_trait]
impl CommandHandler<DeleteUser> for DeleteUserHandler {
    async fn handle(&self, ctx: &HandlingContext, cmd: &DeleteUser) -> Result<(), AppError> {
        info!(id = cmd.id, "user deleted");
        ctx.unit_of_work().register_change();
        Ok(())
    }
}

/// 将每条产生变更的命令作为审计事件追加到 `audit` 流
struct AppendAudit;

#[async_trait]
impl PendingChangesHook<InMemoryEventStore> for AppendAudit {
    async fn commit(
        &self,
        event_store: &InMemoryEventStore,
        command: &dyn AnyCommand,
        ctx: &HandlingContext,
    ) -> Result<(), AppError> {
        let stream = "audit".to_string();
        let version = event_store.read(&stream).await?.len();
        let event = SerializedEvent::builder()
            .event_id(ulid::Ulid::new().to_string())
            .event_type(format!("Audit.{}", command.command_type()))
            .event_version(1)
            .aggregate_id(stream.clone())
            .aggregate_type("audit".to_string())
            .aggregate_version(version + 1)
            .occurred_at(Utc::now())
            .payload(serde_json::json!({ "command": format!("{command:?}") }))
            .build()
            .with_context(ctx.biz());

        event_store.append(&stream, version, vec![event]).await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let registry = HandlerRegistry::new();
    registry.register::<CreateUser, _>(Arc::new(CreateUserHandler));
    registry.register::<CreateUser, _>(Arc::new(WelcomeMailHandler));
    registry.register::<DeleteUser, _>(Arc::new(DeleteUserHandler));

    let store = Arc::new(InMemoryEventStore::<String>::new());
    let processor = CommandProcessor::builder()
        .scopes(Arc::new(registry))
        .event_store(store.clone())
        .hook(Arc::new(AppendAudit))
        .build();
    processor.prebind::<CreateUser>().prebind::<DeleteUser>();

    let biz = BusinessContext::builder()
        .maybe_correlation_id(Some("cor-1".into()))
        .maybe_causation_id(Some("cau-1".into()))
        .maybe_actor_type(Some("user".into()))
        .maybe_actor_id(Some("u-1".into()))
        .build();

    // 传输层产出的类型擦除命令
    let incoming: Arc<dyn AnyCommand> = Arc::new(CreateUser {
        name: "Alice".into(),
    });
    processor.process_in(biz, Some(incoming)).await?;
    processor.send(DeleteUser { id: 42 }).await?;

    // 未注册的命令 -> 返回 UnhandledCommand 错误
    #[allow(dead_code)]
    #[derive(Debug)]
    struct UpdateUser {
        id: u32,
        name: String,
    }

    impl Command for UpdateUser {
        const NAME: &'static str = "UpdateUser";
    }

    if let Err(AppError::UnhandledCommand { command }) = processor
        .send(UpdateUser {
            id: 7,
            name: "Eve".into(),
        })
        .await
    {
        eprintln!("unhandled as expected: {command:?}");
    }

    for event in store.read(&"audit".to_string()).await? {
        info!(
            event_type = event.event_type(),
            version = event.aggregate_version(),
            correlation_id = event.correlation_id(),
            "audit event"
        );
    }
    Ok(())
}
