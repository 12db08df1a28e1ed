//! 表修改节点实现
//!
//! TableModifyNode 将输入行流写入目标表，输出单列受影响行数。

use std::fmt;

use crate::core::context::{PlanContext, TableHandle};
use crate::core::error::PlanError;
use crate::core::types::{ColumnDef, DataType, Schema};
use crate::define_operator_node;
use crate::plan::node::OperatorNode;

/// 修改操作种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOperation {
    Insert,
    Update,
    Delete,
}

impl ModifyOperation {
    pub fn name(&self) -> &'static str {
        match self {
            ModifyOperation::Insert => "INSERT",
            ModifyOperation::Update => "UPDATE",
            ModifyOperation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ModifyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

define_operator_node! {
    /// 表修改节点
    pub struct TableModifyNode [kind = TableModify, arity = 1] {
        table: TableHandle,
        operation: ModifyOperation,
        update_columns: Vec<String>,
    }
}

impl TableModifyNode {
    /// 创建表修改节点
    ///
    /// UPDATE 必须声明目标列；INSERT/DELETE 不允许声明目标列。
    pub fn new(
        ctx: &PlanContext,
        input: OperatorNode,
        table: TableHandle,
        operation: ModifyOperation,
        update_columns: Vec<String>,
    ) -> Result<Self, PlanError> {
        match operation {
            ModifyOperation::Update if update_columns.is_empty() => {
                return Err(PlanError::MalformedPattern(
                    "UPDATE requires at least one target column".to_string(),
                ));
            }
            ModifyOperation::Insert | ModifyOperation::Delete if !update_columns.is_empty() => {
                return Err(PlanError::MalformedPattern(format!(
                    "{} does not take target columns",
                    operation
                )));
            }
            _ => {}
        }
        Ok(Self::assemble(
            ctx.next_node_id(),
            vec![input],
            table,
            operation,
            update_columns,
        ))
    }

    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    pub fn operation(&self) -> ModifyOperation {
        self.operation
    }

    pub fn update_columns(&self) -> &[String] {
        &self.update_columns
    }

    fn params_digest(&self) -> String {
        if self.update_columns.is_empty() {
            format!("table={}, op={}", self.table.qualified_name(), self.operation)
        } else {
            format!(
                "table={}, op={}, columns=[{}]",
                self.table.qualified_name(),
                self.operation,
                self.update_columns.join(",")
            )
        }
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        Ok(Schema::new(vec![ColumnDef::new(
            "ROWCOUNT",
            DataType::Int,
            false,
        )]))
    }
}
