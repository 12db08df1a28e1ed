//! 排序与截断节点实现
//!
//! 两者都不改变输入模式。

use crate::core::context::PlanContext;
use crate::core::error::PlanError;
use crate::core::types::Schema;
use crate::define_operator_node;
use crate::plan::node::OperatorNode;

/// 排序键：列序号与方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub index: usize,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(index: usize) -> Self {
        Self {
            index,
            descending: false,
        }
    }

    pub fn desc(index: usize) -> Self {
        Self {
            index,
            descending: true,
        }
    }
}

define_operator_node! {
    /// 排序节点
    pub struct SortNode [kind = Sort, arity = 1] {
        keys: Vec<SortKey>,
    }
}

impl SortNode {
    pub fn new(
        ctx: &PlanContext,
        input: OperatorNode,
        keys: Vec<SortKey>,
    ) -> Result<Self, PlanError> {
        if keys.is_empty() {
            return Err(PlanError::MalformedPattern(
                "sort key list is empty".to_string(),
            ));
        }
        Ok(Self::assemble(ctx.next_node_id(), vec![input], keys))
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    fn params_digest(&self) -> String {
        let keys: Vec<String> = self
            .keys
            .iter()
            .map(|key| {
                format!(
                    "${} {}",
                    key.index,
                    if key.descending { "DESC" } else { "ASC" }
                )
            })
            .collect();
        format!("keys=[{}]", keys.join(", "))
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        let schema = self.input(0)?.output_schema()?;
        for key in &self.keys {
            if key.index >= schema.column_count() {
                return Err(PlanError::SchemaDerivation(format!(
                    "sort key {} out of range for schema {}",
                    key.index, schema
                )));
            }
        }
        Ok(schema)
    }
}

define_operator_node! {
    /// 截断节点
    pub struct LimitNode [kind = Limit, arity = 1] {
        offset: u64,
        count: u64,
    }
}

impl LimitNode {
    pub fn new(
        ctx: &PlanContext,
        input: OperatorNode,
        offset: u64,
        count: u64,
    ) -> Result<Self, PlanError> {
        Ok(Self::assemble(ctx.next_node_id(), vec![input], offset, count))
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    fn params_digest(&self) -> String {
        format!("offset={}, count={}", self.offset, self.count)
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        self.input(0)?.output_schema()
    }
}
