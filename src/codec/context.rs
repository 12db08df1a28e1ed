//! 重建上下文
//!
//! 解码侧由调用方提供的对象，负责把信封里的目录引用重新解析为
//! 绑定到活动会话的句柄，并重建扩展算子子树。
//! 这是整个代数层唯一发生目录解析的地方。

use std::collections::HashMap;

use crate::core::context::TableHandle;
use crate::core::error::CodecError;
use crate::plan::node::OperatorNode;

/// 重建上下文接口
pub trait RebuildContext {
    /// 重新解析目录中的表引用
    ///
    /// 引用的对象已不存在时返回 `ReferenceNotFound`。
    fn resolve_table(&self, namespace: &str, name: &str) -> Result<TableHandle, CodecError>;

    /// 由种类名与不透明载荷重建扩展算子节点
    fn rebuild_extension(
        &self,
        kind: &str,
        _payload: &[u8],
        _inputs: Vec<OperatorNode>,
    ) -> Result<OperatorNode, CodecError> {
        Err(CodecError::Configuration(format!(
            "no extension rebuild support for `{}`",
            kind
        )))
    }
}

/// 基于内存快照的重建上下文
///
/// 以 (namespace, name) 为键保存表句柄，测试与嵌入式会话使用。
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    tables: HashMap<(String, String), TableHandle>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: TableHandle) {
        self.tables.insert(
            (handle.namespace().to_string(), handle.name().to_string()),
            handle,
        );
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl RebuildContext for CatalogSnapshot {
    fn resolve_table(&self, namespace: &str, name: &str) -> Result<TableHandle, CodecError> {
        self.tables
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| CodecError::ReferenceNotFound(format!("{}.{}", namespace, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ColumnDef, DataType, Schema};

    #[test]
    fn test_snapshot_resolution() {
        let mut snapshot = CatalogSnapshot::new();
        snapshot.insert(TableHandle::new(
            "store",
            "users",
            Schema::new(vec![ColumnDef::new("id", DataType::Int, false)]),
        ));

        assert!(snapshot.resolve_table("store", "users").is_ok());
        assert!(matches!(
            snapshot.resolve_table("store", "gone"),
            Err(CodecError::ReferenceNotFound(_))
        ));
    }
}
