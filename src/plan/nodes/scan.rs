//! 扫描与内联元组节点
//!
//! `ScanNode` 持有不透明的表句柄并输出该表的模式；
//! `ValuesNode` 输出声明模式下的内联元组。两者都是零输入节点。

use crate::core::context::{PlanContext, TableHandle};
use crate::core::error::PlanError;
use crate::core::types::Schema;
use crate::core::value::Value;
use crate::define_operator_node;

define_operator_node! {
    /// 表扫描节点
    ///
    /// 句柄只被存储和转发，代数层从不解析它。
    pub struct ScanNode [kind = Scan, arity = 0] {
        table: TableHandle,
    }
}

impl ScanNode {
    pub fn new(ctx: &PlanContext, table: TableHandle) -> Result<Self, PlanError> {
        Ok(Self::assemble(ctx.next_node_id(), Vec::new(), table))
    }

    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    fn params_digest(&self) -> String {
        format!("table={}", self.table.qualified_name())
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        Ok(self.table.schema().clone())
    }
}

define_operator_node! {
    /// 内联元组节点
    pub struct ValuesNode [kind = Values, arity = 0] {
        schema: Schema,
        tuples: Vec<Vec<Value>>,
    }
}

impl ValuesNode {
    /// 创建内联元组节点
    ///
    /// 每个元组的宽度必须等于声明模式的列数。
    pub fn new(
        ctx: &PlanContext,
        schema: Schema,
        tuples: Vec<Vec<Value>>,
    ) -> Result<Self, PlanError> {
        for (i, tuple) in tuples.iter().enumerate() {
            if tuple.len() != schema.column_count() {
                return Err(PlanError::MalformedPattern(format!(
                    "values tuple {} has {} values, schema declares {} columns",
                    i,
                    tuple.len(),
                    schema.column_count()
                )));
            }
        }
        Ok(Self::assemble(ctx.next_node_id(), Vec::new(), schema, tuples))
    }

    pub fn tuples(&self) -> &[Vec<Value>] {
        &self.tuples
    }

    pub fn declared_schema(&self) -> &Schema {
        &self.schema
    }

    fn params_digest(&self) -> String {
        let tuples: Vec<String> = self
            .tuples
            .iter()
            .map(|tuple| {
                let values: Vec<String> = tuple.iter().map(|v| format!("{}", v)).collect();
                format!("({})", values.join(","))
            })
            .collect();
        format!("schema={}, tuples=[{}]", self.schema, tuples.join(";"))
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        Ok(self.schema.clone())
    }
}
