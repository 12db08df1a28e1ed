//! 条件写节点族
//!
//! 跨存储条件更新使用的"先读后有条件写"计划片段：
//! `ProviderNode` 包装一次先行读取的已物化结果，
//! `ConditionalTableModifyNode` 把首次修改尝试、补偿读取与
//! 预备补偿修改组合成一个三输入节点。

use crate::core::context::{PlanContext, TableHandle};
use crate::core::error::{ExpressionError, PlanError};
use crate::core::registry::OperatorRegistry;
use crate::core::types::Schema;
use crate::core::value::Value;
use crate::define_operator_node;
use crate::expr::expression::ScalarExpression;
use crate::plan::node::OperatorNode;

define_operator_node! {
    /// 已解析行提供者
    ///
    /// 每行的第一列是行标识符，最后一列始终解释为要写入的新值。
    pub struct ProviderNode [kind = Provider, arity = 0] {
        table: TableHandle,
        rows: Vec<Vec<Value>>,
    }
}

impl ProviderNode {
    /// 创建提供者节点
    ///
    /// 空的已解析行集在构造时即非法，而不是运行期边界情况；
    /// 行宽不一致同样被拒绝。
    pub fn new(
        ctx: &PlanContext,
        table: TableHandle,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, PlanError> {
        if rows.is_empty() {
            return Err(PlanError::IllegalState(
                "provider built from an empty resolved row set".to_string(),
            ));
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(PlanError::IllegalState(
                "provider rows must carry at least one column".to_string(),
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PlanError::IllegalState(format!(
                    "provider row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
        }
        Ok(Self::assemble(ctx.next_node_id(), Vec::new(), table, rows))
    }

    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// 构造选中全部已解析行标识符的析取条件
    ///
    /// `ref(0) = id₁ OR ref(0) = id₂ OR …`，单行时直接返回等值比较。
    pub fn enumerable_condition(
        &self,
        registry: &OperatorRegistry,
    ) -> Result<ScalarExpression, ExpressionError> {
        let eq = registry.lookup("=")?.clone();
        let id_type = self.rows[0][0].data_type();
        let id_ref = ScalarExpression::input_ref(0, id_type, false);

        let mut terms = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            terms.push(ScalarExpression::call(
                eq.clone(),
                vec![id_ref.clone(), ScalarExpression::literal(row[0].clone())],
            )?);
        }

        if terms.len() == 1 {
            return Ok(terms.remove(0));
        }
        let or = registry.lookup("OR")?.clone();
        ScalarExpression::call(or, terms)
    }

    /// 按行顺序返回要写入的新值（每行最后一列）
    pub fn update_values(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.last().cloned().unwrap_or(Value::Null))
            .collect()
    }

    fn params_digest(&self) -> String {
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|v| format!("{}", v)).collect();
                format!("({})", values.join(","))
            })
            .collect();
        format!(
            "table={}, rows=[{}]",
            self.table.qualified_name(),
            rows.join(";")
        )
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        Ok(self.table.schema().clone())
    }
}

define_operator_node! {
    /// 条件表修改节点
    ///
    /// 三个输入的位置语义固定：输入 0 是首次修改尝试，输入 1 是
    /// 发现受影响行的读取查询，输入 2 是预备好的补偿修改。
    /// 实际执行哪个分支由执行层决定，代数层只表示结构。
    pub struct ConditionalTableModifyNode [kind = ConditionalTableModify, arity = 3] {}
}

impl ConditionalTableModifyNode {
    pub fn new(
        ctx: &PlanContext,
        modify: OperatorNode,
        query: OperatorNode,
        prepared: OperatorNode,
    ) -> Result<Self, PlanError> {
        Ok(Self::assemble(
            ctx.next_node_id(),
            vec![modify, query, prepared],
        ))
    }

    /// 首次修改尝试
    pub fn modify_input(&self) -> Result<&OperatorNode, PlanError> {
        self.input(0)
    }

    /// 受影响行的读取查询
    pub fn query_input(&self) -> Result<&OperatorNode, PlanError> {
        self.input(1)
    }

    /// 预备好的补偿修改
    pub fn prepared_input(&self) -> Result<&OperatorNode, PlanError> {
        self.input(2)
    }

    fn params_digest(&self) -> String {
        String::new()
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        self.input(0)?.output_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ColumnDef, DataType};

    fn handle() -> TableHandle {
        TableHandle::new(
            "store",
            "kv",
            Schema::new(vec![
                ColumnDef::new("id", DataType::Int, false),
                ColumnDef::new("val", DataType::String, true),
            ]),
        )
    }

    #[test]
    fn test_provider_rejects_empty_row_set() {
        let ctx = PlanContext::new();
        let err = ProviderNode::new(&ctx, handle(), Vec::new());
        assert!(matches!(err, Err(PlanError::IllegalState(_))));
    }

    #[test]
    fn test_provider_rejects_ragged_rows() {
        let ctx = PlanContext::new();
        let err = ProviderNode::new(
            &ctx,
            handle(),
            vec![
                vec![Value::Int(1), Value::String("a".to_string())],
                vec![Value::Int(2)],
            ],
        );
        assert!(matches!(err, Err(PlanError::IllegalState(_))));
    }

    #[test]
    fn test_enumerable_condition_and_update_values() {
        let ctx = PlanContext::new();
        let provider = ProviderNode::new(
            &ctx,
            handle(),
            vec![
                vec![Value::Int(1), Value::String("a".to_string())],
                vec![Value::Int(2), Value::String("b".to_string())],
            ],
        )
        .unwrap();

        let condition = provider.enumerable_condition(ctx.operators()).unwrap();
        assert_eq!(condition.digest(), "OR(=($0, 1), =($0, 2))");

        assert_eq!(
            provider.update_values(),
            vec![
                Value::String("a".to_string()),
                Value::String("b".to_string())
            ]
        );
    }

    #[test]
    fn test_single_row_condition_is_plain_equality() {
        let ctx = PlanContext::new();
        let provider = ProviderNode::new(
            &ctx,
            handle(),
            vec![vec![Value::Int(7), Value::String("x".to_string())]],
        )
        .unwrap();
        let condition = provider.enumerable_condition(ctx.operators()).unwrap();
        assert_eq!(condition.digest(), "=($0, 7)");
    }
}
