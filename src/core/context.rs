//! 规划会话上下文
//!
//! `PlanContext` 由一次规划会话持有，提供节点 ID 分配与操作符注册表。
//! 节点不会持有指回共享规划器状态的引用，所有依赖都在构造时显式传入。

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::registry::OperatorRegistry;
use crate::core::types::Schema;

/// 节点ID生成器
///
/// 会话内唯一，从 1 开始，0 保留为无效 ID。
#[derive(Debug)]
pub struct NodeIdGenerator {
    counter: AtomicI64,
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicI64::new(1),
        }
    }

    pub fn next_id(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for NodeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 规划会话上下文
#[derive(Debug)]
pub struct PlanContext {
    ids: NodeIdGenerator,
    operators: OperatorRegistry,
}

impl PlanContext {
    /// 创建带内置操作符注册表的上下文
    pub fn new() -> Self {
        Self {
            ids: NodeIdGenerator::new(),
            operators: OperatorRegistry::with_builtins(),
        }
    }

    /// 使用指定注册表创建上下文
    pub fn with_registry(operators: OperatorRegistry) -> Self {
        Self {
            ids: NodeIdGenerator::new(),
            operators,
        }
    }

    pub fn next_node_id(&self) -> i64 {
        self.ids.next_id()
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }
}

impl Default for PlanContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 不透明的目录对象引用
///
/// 代数层只存储并转发该句柄，从不自行解析；
/// 重新解析只发生在编解码层的 `RebuildContext` 中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHandle {
    namespace: String,
    name: String,
    schema: Schema,
}

impl TableHandle {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, schema: Schema) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            schema,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// 摘要中使用的限定名
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ColumnDef, DataType};

    #[test]
    fn test_id_generation() {
        let ctx = PlanContext::new();
        let id1 = ctx.next_node_id();
        let id2 = ctx.next_node_id();
        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
    }

    #[test]
    fn test_contexts_are_independent() {
        let a = PlanContext::new();
        let b = PlanContext::new();
        assert_eq!(a.next_node_id(), 1);
        assert_eq!(b.next_node_id(), 1);
    }

    #[test]
    fn test_table_handle_qualified_name() {
        let handle = TableHandle::new(
            "store",
            "users",
            Schema::new(vec![ColumnDef::new("id", DataType::Int, false)]),
        );
        assert_eq!(handle.qualified_name(), "store.users");
        assert_eq!(format!("{}", handle), "store.users");
    }
}
