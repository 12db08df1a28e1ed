//! 连接节点实现
//!
//! JoinNode 有两个输入，输出模式是左右模式按声明顺序的拼接；
//! 外连接一侧的列被强制可空。

use std::fmt;

use crate::core::context::PlanContext;
use crate::core::error::PlanError;
use crate::core::types::{DataType, Schema};
use crate::define_operator_node;
use crate::expr::expression::ScalarExpression;
use crate::plan::node::OperatorNode;

/// 连接类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Full,
}

impl JoinKind {
    pub fn name(&self) -> &'static str {
        match self {
            JoinKind::Inner => "Inner",
            JoinKind::Left => "Left",
            JoinKind::Full => "Full",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

define_operator_node! {
    /// 连接节点
    ///
    /// 条件表达式的输入引用跨越拼接后的左右列空间。
    pub struct JoinNode [kind = Join, arity = 2] {
        join_kind: JoinKind,
        condition: ScalarExpression,
    }
}

impl JoinNode {
    pub fn new(
        ctx: &PlanContext,
        left: OperatorNode,
        right: OperatorNode,
        join_kind: JoinKind,
        condition: ScalarExpression,
    ) -> Result<Self, PlanError> {
        Ok(Self::assemble(
            ctx.next_node_id(),
            vec![left, right],
            join_kind,
            condition,
        ))
    }

    pub fn join_kind(&self) -> JoinKind {
        self.join_kind
    }

    pub fn condition(&self) -> &ScalarExpression {
        &self.condition
    }

    pub fn left_input(&self) -> Result<&OperatorNode, PlanError> {
        self.input(0)
    }

    pub fn right_input(&self) -> Result<&OperatorNode, PlanError> {
        self.input(1)
    }

    fn params_digest(&self) -> String {
        format!(
            "kind={}, condition=[{}]",
            self.join_kind,
            self.condition.digest()
        )
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        let left = self.input(0)?.output_schema()?;
        let right = self.input(1)?.output_schema()?;
        let schema = match self.join_kind {
            JoinKind::Inner => left.concat(&right),
            JoinKind::Left => left.concat(&right.as_nullable()),
            JoinKind::Full => left.as_nullable().concat(&right.as_nullable()),
        };
        let condition_type = self
            .condition
            .result_type(&schema)
            .map_err(|e| PlanError::SchemaDerivation(e.to_string()))?;
        if condition_type != DataType::Bool {
            return Err(PlanError::SchemaDerivation(format!(
                "join condition must be Bool, got {}",
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

    fn scan(ctx: &PlanContext, name: &str, column: &str) -> OperatorNode {
        let handle = TableHandle::new(
            "store",
            name,
            Schema::new(vec![ColumnDef::new(column, DataType::Int, false)]),
        );
        crate::plan::nodes::scan::ScanNode::new(ctx, handle)
            .unwrap()
            .into_enum()
    }

    fn eq_condition(ctx: &PlanContext) -> ScalarExpression {
        let eq = ctx.operators().lookup("=").unwrap().clone();
        ScalarExpression::call(
            eq,
            vec![
                ScalarExpression::input_ref(0, DataType::Int, false),
                ScalarExpression::input_ref(1, DataType::Int, false),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_inner_join_concatenates_schemas() {
        let ctx = PlanContext::new();
        let join = JoinNode::new(
            &ctx,
            scan(&ctx, "a", "x"),
            scan(&ctx, "b", "y"),
            JoinKind::Inner,
            eq_condition(&ctx),
        )
        .unwrap();
        let schema = join.output_schema().unwrap();
        assert_eq!(schema.column_count(), 2);
        assert!(!schema.column(1).unwrap().nullable);
    }

    #[test]
    fn test_left_join_forces_right_side_nullable() {
        let ctx = PlanContext::new();
        let join = JoinNode::new(
            &ctx,
            scan(&ctx, "a", "x"),
            scan(&ctx, "b", "y"),
            JoinKind::Left,
            eq_condition(&ctx),
        )
        .unwrap();
        let schema = join.output_schema().unwrap();
        assert!(!schema.column(0).unwrap().nullable);
        assert!(schema.column(1).unwrap().nullable);
    }

    #[test]
    fn test_join_exposes_two_inputs() {
        let ctx = PlanContext::new();
        let join = JoinNode::new(
            &ctx,
            scan(&ctx, "a", "x"),
            scan(&ctx, "b", "y"),
            JoinKind::Inner,
            ScalarExpression::literal(Value::Bool(true)),
        )
        .unwrap();
        assert_eq!(join.inputs().len(), 2);
        assert!(join.input(2).is_err());
    }
}
