//! 投影节点实现
//!
//! ProjectNode 对输入的每一行求值一组表达式，输出列由表达式类型
//! 与别名决定。

use crate::core::context::PlanContext;
use crate::core::error::PlanError;
use crate::core::types::{ColumnDef, Schema};
use crate::define_operator_node;
use crate::expr::expression::ScalarExpression;
use crate::plan::node::OperatorNode;

/// 投影项：表达式加输出列别名
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem {
    pub expression: ScalarExpression,
    pub alias: String,
}

impl ProjectItem {
    pub fn new(expression: ScalarExpression, alias: impl Into<String>) -> Self {
        Self {
            expression,
            alias: alias.into(),
        }
    }
}

define_operator_node! {
    /// 投影节点
    pub struct ProjectNode [kind = Project, arity = 1] {
        items: Vec<ProjectItem>,
    }
}

impl ProjectNode {
    pub fn new(
        ctx: &PlanContext,
        input: OperatorNode,
        items: Vec<ProjectItem>,
    ) -> Result<Self, PlanError> {
        if items.is_empty() {
            return Err(PlanError::MalformedPattern(
                "projection list is empty".to_string(),
            ));
        }
        Ok(Self::assemble(ctx.next_node_id(), vec![input], items))
    }

    pub fn items(&self) -> &[ProjectItem] {
        &self.items
    }

    fn params_digest(&self) -> String {
        let items: Vec<String> = self
            .items
            .iter()
            .map(|item| format!("{}:{}", item.alias, item.expression.digest()))
            .collect();
        format!("exprs=[{}]", items.join(", "))
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        let input_schema = self.input(0)?.output_schema()?;
        let mut columns = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let data_type = item
                .expression
                .result_type(&input_schema)
                .map_err(|e| PlanError::SchemaDerivation(e.to_string()))?;
            let nullable = item
                .expression
                .nullable(&input_schema)
                .map_err(|e| PlanError::SchemaDerivation(e.to_string()))?;
            columns.push(ColumnDef::new(item.alias.clone(), data_type, nullable));
        }
        Ok(Schema::new(columns))
    }
}
