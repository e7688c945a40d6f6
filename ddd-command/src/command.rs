use crate::dispatch_cache::{ExecutionPath, TypedExecutionPath};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求，通常会修改领域状态。
/// - 不返回业务数据，仅表达执行结果（成功/失败）；
/// - 创建后不可变，仅由具体类型决定路由到哪些处理器；
/// - 建议保持语义化的“动宾结构”命名，如 `CreateUser`、`CloseOrder`。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志、追踪与诊断。避免依赖 `type_name::<T>()`。
pub trait Command: fmt::Debug + Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}

/// 类型擦除后的命令
///
/// 由传输/反序列化层产生、具体类型只在运行时可知的命令值以
/// `Arc<dyn AnyCommand>` 形式进入命令处理器。
/// 对所有 [`Command`] 自动实现，无需手写。
pub trait AnyCommand: Any + fmt::Debug + Send + Sync {
    /// 运行时的具体命令类型
    fn command_type(&self) -> CommandType;

    fn as_any(&self) -> &dyn Any;

    /// 构造与具体类型绑定的执行路径
    ///
    /// 只依赖类型本身，不读取命令内容；由分发缓存在首次遇到该类型时调用。
    #[doc(hidden)]
    fn bind(&self) -> Arc<dyn ExecutionPath>;
}

impl<C> AnyCommand for C
where
    C: Command,
{
    fn command_type(&self) -> CommandType {
        CommandType::of::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn bind(&self) -> Arc<dyn ExecutionPath> {
        Arc::new(TypedExecutionPath::<C>::new())
    }
}

impl<'a> dyn AnyCommand + 'a {
    /// 还原为具体命令类型
    pub fn downcast_ref<C: Command>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }

    pub fn is<C: Command>(&self) -> bool {
        self.as_any().is::<C>()
    }
}

/// 命令类型标识：`TypeId` + 稳定名称
///
/// 相等性与哈希只取决于 `TypeId`。
#[derive(Clone, Copy, Debug)]
pub struct CommandType {
    id: TypeId,
    name: &'static str,
}

impl CommandType {
    pub fn of<C: Command>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: C::NAME,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<C: Command>(&self) -> bool {
        self.id == TypeId::of::<C>()
    }
}

impl PartialEq for CommandType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CommandType {}

impl Hash for CommandType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
