//! 并集节点实现
//!
//! 两个输入的列数与类型必须逐列一致；输出列取左侧列名，
//! 任一侧可空则结果列可空。

use crate::core::context::PlanContext;
use crate::core::error::PlanError;
use crate::core::types::{ColumnDef, Schema};
use crate::define_operator_node;
use crate::plan::node::OperatorNode;

define_operator_node! {
    /// 并集节点
    pub struct UnionNode [kind = Union, arity = 2] {
        all: bool,
    }
}

impl UnionNode {
    pub fn new(
        ctx: &PlanContext,
        left: OperatorNode,
        right: OperatorNode,
        all: bool,
    ) -> Result<Self, PlanError> {
        Ok(Self::assemble(ctx.next_node_id(), vec![left, right], all))
    }

    pub fn all(&self) -> bool {
        self.all
    }

    fn params_digest(&self) -> String {
        format!("all={}", self.all)
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        let left = self.input(0)?.output_schema()?;
        let right = self.input(1)?.output_schema()?;
        if left.column_count() != right.column_count() {
            return Err(PlanError::SchemaDerivation(format!(
                "union sides have {} and {} columns",
                left.column_count(),
                right.column_count()
            )));
        }
        let mut columns = Vec::with_capacity(left.column_count());
        for (l, r) in left.columns().iter().zip(right.columns().iter()) {
            if l.data_type != r.data_type {
                return Err(PlanError::SchemaDerivation(format!(
                    "union column `{}` has mismatched types {} and {}",
                    l.name, l.data_type, r.data_type
                )));
            }
            columns.push(ColumnDef::new(
                l.name.clone(),
                l.data_type,
                l.nullable || r.nullable,
            ));
        }
        Ok(Schema::new(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::TableHandle;
    use crate::core::types::DataType;

    fn scan(ctx: &PlanContext, name: &str, data_type: DataType, nullable: bool) -> OperatorNode {
        let handle = TableHandle::new(
            "store",
            name,
            Schema::new(vec![ColumnDef::new("c", data_type, nullable)]),
        );
        crate::plan::nodes::scan::ScanNode::new(ctx, handle)
            .unwrap()
            .into_enum()
    }

    #[test]
    fn test_union_nullability_merges() {
        let ctx = PlanContext::new();
        let union = UnionNode::new(
            &ctx,
            scan(&ctx, "a", DataType::Int, false),
            scan(&ctx, "b", DataType::Int, true),
            true,
        )
        .unwrap();
        let schema = union.output_schema().unwrap();
        assert!(schema.column(0).unwrap().nullable);
    }

    #[test]
    fn test_union_type_mismatch_rejected() {
        let ctx = PlanContext::new();
        let union = UnionNode::new(
            &ctx,
            scan(&ctx, "a", DataType::Int, false),
            scan(&ctx, "b", DataType::String, false),
            false,
        )
        .unwrap();
        assert!(matches!(
            union.output_schema(),
            Err(PlanError::SchemaDerivation(_))
        ));
    }
}
