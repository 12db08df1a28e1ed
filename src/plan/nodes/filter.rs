//! 过滤节点实现
//!
//! FilterNode 按布尔条件表达式过滤输入数据流，输出模式与输入相同。

use crate::core::context::PlanContext;
use crate::core::error::PlanError;
use crate::core::types::{DataType, Schema};
use crate::define_operator_node;
use crate::expr::expression::ScalarExpression;
use crate::plan::node::OperatorNode;

define_operator_node! {
    /// 过滤节点
    pub struct FilterNode [kind = Filter, arity = 1] {
        condition: ScalarExpression,
    }
}

impl FilterNode {
    pub fn new(
        ctx: &PlanContext,
        input: OperatorNode,
        condition: ScalarExpression,
    ) -> Result<Self, PlanError> {
        Ok(Self::assemble(ctx.next_node_id(), vec![input], condition))
    }

    pub fn condition(&self) -> &ScalarExpression {
        &self.condition
    }

    fn params_digest(&self) -> String {
        format!("condition=[{}]", self.condition.digest())
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        let schema = self.input(0)?.output_schema()?;
        let condition_type = self
            .condition
            .result_type(&schema)
            .map_err(|e| PlanError::SchemaDerivation(e.to_string()))?;
        if condition_type != DataType::Bool {
            return Err(PlanError::SchemaDerivation(format!(
                "filter condition must be Bool, got {}",
                condition_type
            )));
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::TableHandle;
    use crate::core::types::ColumnDef;
    use crate::core::value::Value;
    use crate::plan::nodes::scan::ScanNode;

    fn scan(ctx: &PlanContext) -> OperatorNode {
        let handle = TableHandle::new(
            "store",
            "users",
            Schema::new(vec![ColumnDef::new("id", DataType::Int, false)]),
        );
        ScanNode::new(ctx, handle).unwrap().into_enum()
    }

    #[test]
    fn test_filter_keeps_input_schema() {
        let ctx = PlanContext::new();
        let gt = ctx.operators().lookup(">").unwrap().clone();
        let condition = ScalarExpression::call(
            gt,
            vec![
                ScalarExpression::input_ref(0, DataType::Int, false),
                ScalarExpression::literal(Value::Int(10)),
            ],
        )
        .unwrap();
        let filter = FilterNode::new(&ctx, scan(&ctx), condition).unwrap();
        assert_eq!(filter.output_schema().unwrap().column_count(), 1);
    }

    #[test]
    fn test_non_boolean_condition_rejected_at_derivation() {
        let ctx = PlanContext::new();
        let filter =
            FilterNode::new(&ctx, scan(&ctx), ScalarExpression::literal(Value::Int(1))).unwrap();
        assert!(matches!(
            filter.output_schema(),
            Err(PlanError::SchemaDerivation(_))
        ));
    }

    #[test]
    fn test_replace_input_bounds() {
        let ctx = PlanContext::new();
        let mut filter = FilterNode::new(
            &ctx,
            scan(&ctx),
            ScalarExpression::literal(Value::Bool(true)),
        )
        .unwrap();
        let err = filter.replace_input(1, scan(&ctx));
        assert!(matches!(
            err,
            Err(PlanError::IndexOutOfRange { index: 1, arity: 1, .. })
        ));
    }
}
