//! 子查询表达式
//!
//! 类调用的标量表达式变体，独占一棵算子节点子树作为内层查询。
//! 子树绝不与外层计划的输入列表共享。`ALL` 量词在进入代数层之前
//! 已被归一化为 `NOT (反向比较 SOME (...))`，因此没有对应变体。

use std::fmt;

use crate::core::error::ExpressionError;
use crate::core::registry::ScalarOperator;
use crate::core::types::{DataType, Schema};
use crate::expr::expression::ScalarExpression;
use crate::plan::node::OperatorNode;

/// 子查询变体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubqueryVariant {
    /// 成员测试：操作数元组是否出现在子查询结果中
    In,
    /// 量化比较：操作数与子查询各行按比较操作符比较
    Some,
    /// 存在性测试
    Exists,
    /// 单列标量子查询
    Scalar,
}

impl SubqueryVariant {
    pub fn name(&self) -> &'static str {
        match self {
            SubqueryVariant::In => "IN",
            SubqueryVariant::Some => "SOME",
            SubqueryVariant::Exists => "EXISTS",
            SubqueryVariant::Scalar => "SCALAR",
        }
    }
}

impl fmt::Display for SubqueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 子查询表达式
#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryExpression {
    variant: SubqueryVariant,
    operands: Vec<ScalarExpression>,
    /// 仅 SOME 变体携带的比较操作符
    comparison: Option<ScalarOperator>,
    /// 独占的内层查询子树
    subtree: Box<OperatorNode>,
}

impl SubqueryExpression {
    /// IN 子查询
    ///
    /// 操作数数量必须等于子树输出列数。
    pub fn in_query(
        subtree: OperatorNode,
        operands: Vec<ScalarExpression>,
    ) -> Result<ScalarExpression, ExpressionError> {
        let columns = subtree_column_count(&subtree)?;
        if operands.len() != columns {
            return Err(ExpressionError::MalformedPattern(format!(
                "IN subquery expects {} operands to match the subtree output, got {}",
                columns,
                operands.len()
            )));
        }
        Ok(ScalarExpression::Subquery(Self {
            variant: SubqueryVariant::In,
            operands,
            comparison: None,
            subtree: Box::new(subtree),
        }))
    }

    /// SOME 量化子查询
    ///
    /// 操作数数量必须等于子树输出列数，比较操作符必须是二元比较。
    pub fn some_query(
        subtree: OperatorNode,
        operands: Vec<ScalarExpression>,
        comparison: ScalarOperator,
    ) -> Result<ScalarExpression, ExpressionError> {
        let columns = subtree_column_count(&subtree)?;
        if operands.len() != columns {
            return Err(ExpressionError::MalformedPattern(format!(
                "SOME subquery expects {} operands to match the subtree output, got {}",
                columns,
                operands.len()
            )));
        }
        if !comparison.is_comparison() {
            return Err(ExpressionError::MalformedPattern(format!(
                "SOME subquery requires a binary comparison operator, got `{}`",
                comparison.name()
            )));
        }
        Ok(ScalarExpression::Subquery(Self {
            variant: SubqueryVariant::Some,
            operands,
            comparison: Some(comparison),
            subtree: Box::new(subtree),
        }))
    }

    /// EXISTS 子查询，无操作数
    pub fn exists(subtree: OperatorNode) -> Result<ScalarExpression, ExpressionError> {
        subtree_column_count(&subtree)?;
        Ok(ScalarExpression::Subquery(Self {
            variant: SubqueryVariant::Exists,
            operands: Vec::new(),
            comparison: None,
            subtree: Box::new(subtree),
        }))
    }

    /// 标量子查询，子树必须恰好输出一列
    pub fn scalar(subtree: OperatorNode) -> Result<ScalarExpression, ExpressionError> {
        let columns = subtree_column_count(&subtree)?;
        if columns != 1 {
            return Err(ExpressionError::MalformedPattern(format!(
                "scalar subquery requires exactly 1 output column, got {}",
                columns
            )));
        }
        Ok(ScalarExpression::Subquery(Self {
            variant: SubqueryVariant::Scalar,
            operands: Vec::new(),
            comparison: None,
            subtree: Box::new(subtree),
        }))
    }

    pub fn variant(&self) -> SubqueryVariant {
        self.variant
    }

    pub fn operands(&self) -> &[ScalarExpression] {
        &self.operands
    }

    pub fn comparison(&self) -> Option<&ScalarOperator> {
        self.comparison.as_ref()
    }

    pub fn subtree(&self) -> &OperatorNode {
        &self.subtree
    }

    /// 结果类型
    ///
    /// IN/SOME/EXISTS 为布尔；SCALAR 为子树唯一输出列的类型。
    pub fn result_type(&self) -> Result<DataType, ExpressionError> {
        match self.variant {
            SubqueryVariant::In | SubqueryVariant::Some | SubqueryVariant::Exists => {
                Ok(DataType::Bool)
            }
            SubqueryVariant::Scalar => {
                let schema = subtree_schema(&self.subtree)?;
                Ok(schema
                    .column(0)
                    .map(|c| c.data_type)
                    .unwrap_or(DataType::Null))
            }
        }
    }

    /// 可空性
    ///
    /// IN/SOME：任一操作数或任一子树输出列可空则可空；
    /// EXISTS：永不可空；SCALAR：强制可空（外连接可能产生缺失）。
    pub fn nullable(&self, outer: &Schema) -> Result<bool, ExpressionError> {
        match self.variant {
            SubqueryVariant::In | SubqueryVariant::Some => {
                for operand in &self.operands {
                    if operand.nullable(outer)? {
                        return Ok(true);
                    }
                }
                let schema = subtree_schema(&self.subtree)?;
                Ok(schema.columns().iter().any(|c| c.nullable))
            }
            SubqueryVariant::Exists => Ok(false),
            SubqueryVariant::Scalar => Ok(true),
        }
    }

    /// 摘要：变体名 + 操作数摘要 + 嵌入子树的完整文本转储
    ///
    /// 语法相同的两个子查询即使子树对象不同，摘要也相等。
    pub fn digest(&self) -> String {
        let operands: Vec<String> = self.operands.iter().map(|o| o.digest()).collect();
        match &self.comparison {
            Some(op) => format!(
                "{}(op={}, ops=[{}], query={{{}}})",
                self.variant.name(),
                op.name(),
                operands.join(", "),
                self.subtree.digest()
            ),
            None => format!(
                "{}(ops=[{}], query={{{}}})",
                self.variant.name(),
                operands.join(", "),
                self.subtree.digest()
            ),
        }
    }

    /// 替换外层作用域的操作数输入引用，子树保持不变
    pub(crate) fn substitute_operands(
        &self,
        bindings: &[ScalarExpression],
    ) -> Result<SubqueryExpression, ExpressionError> {
        let operands = self
            .operands
            .iter()
            .map(|o| o.substitute_input_refs(bindings))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SubqueryExpression {
            variant: self.variant,
            operands,
            comparison: self.comparison.clone(),
            subtree: self.subtree.clone(),
        })
    }
}

fn subtree_schema(subtree: &OperatorNode) -> Result<Schema, ExpressionError> {
    subtree
        .output_schema()
        .map_err(|e| ExpressionError::TypeMismatch(format!("subquery subtree: {}", e)))
}

fn subtree_column_count(subtree: &OperatorNode) -> Result<usize, ExpressionError> {
    Ok(subtree_schema(subtree)?.column_count())
}
