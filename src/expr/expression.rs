//! 统一标量表达式类型
//!
//! 构造时立即校验操作数数量与操作符签名，任何数量不匹配都会
//! 以 `MalformedPattern` 失败；结构非法的表达式无法存在。

use std::fmt;

use crate::core::error::ExpressionError;
use crate::core::registry::{ReturnTypeRule, ScalarOperator};
use crate::core::types::{DataType, Schema};
use crate::core::value::Value;
use crate::expr::subquery::SubqueryExpression;

/// 统一标量表达式
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpression {
    /// 字面量值
    Literal(Value),

    /// 输入列引用
    InputRef {
        index: usize,
        data_type: DataType,
        nullable: bool,
    },

    /// 操作符调用
    Call(CallExpression),

    /// 子查询（类调用变体，独占一棵算子子树）
    Subquery(SubqueryExpression),
}

/// 操作符调用表达式
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    op: ScalarOperator,
    operands: Vec<ScalarExpression>,
}

impl CallExpression {
    pub fn op(&self) -> &ScalarOperator {
        &self.op
    }

    pub fn operands(&self) -> &[ScalarExpression] {
        &self.operands
    }
}

impl ScalarExpression {
    /// 字面量
    pub fn literal(value: Value) -> Self {
        ScalarExpression::Literal(value)
    }

    /// 输入列引用
    pub fn input_ref(index: usize, data_type: DataType, nullable: bool) -> Self {
        ScalarExpression::InputRef {
            index,
            data_type,
            nullable,
        }
    }

    /// 操作符调用
    ///
    /// 操作数数量在此处立即校验，与操作符签名不符返回
    /// `MalformedPattern`。
    pub fn call(
        op: ScalarOperator,
        operands: Vec<ScalarExpression>,
    ) -> Result<Self, ExpressionError> {
        op.validate_operand_count(operands.len())?;
        Ok(ScalarExpression::Call(CallExpression { op, operands }))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, ScalarExpression::Literal(_))
    }

    pub fn is_input_ref(&self) -> bool {
        matches!(self, ScalarExpression::InputRef { .. })
    }

    pub fn is_call(&self) -> bool {
        matches!(self, ScalarExpression::Call(_))
    }

    pub fn is_subquery(&self) -> bool {
        matches!(self, ScalarExpression::Subquery(_))
    }

    pub fn as_call(&self) -> Option<&CallExpression> {
        match self {
            ScalarExpression::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_subquery(&self) -> Option<&SubqueryExpression> {
        match self {
            ScalarExpression::Subquery(sub) => Some(sub),
            _ => None,
        }
    }

    /// 表达式在给定输入模式下的结果类型
    pub fn result_type(&self, input: &Schema) -> Result<DataType, ExpressionError> {
        match self {
            ScalarExpression::Literal(value) => Ok(value.data_type()),
            ScalarExpression::InputRef {
                index, data_type, ..
            } => {
                let column = input.column(*index).ok_or_else(|| {
                    ExpressionError::TypeMismatch(format!(
                        "input reference ${} out of range for schema {}",
                        index, input
                    ))
                })?;
                if column.data_type != *data_type {
                    return Err(ExpressionError::TypeMismatch(format!(
                        "input reference ${} declared {} but column `{}` is {}",
                        index, data_type, column.name, column.data_type
                    )));
                }
                Ok(*data_type)
            }
            ScalarExpression::Call(call) => match call.op.return_rule() {
                ReturnTypeRule::Boolean => Ok(DataType::Bool),
                ReturnTypeRule::Fixed(data_type) => Ok(data_type),
                ReturnTypeRule::SameAsOperand(i) => {
                    let operand = call.operands.get(i).ok_or_else(|| {
                        ExpressionError::TypeMismatch(format!(
                            "operator `{}` derives its type from missing operand {}",
                            call.op.name(),
                            i
                        ))
                    })?;
                    operand.result_type(input)
                }
            },
            ScalarExpression::Subquery(sub) => sub.result_type(),
        }
    }

    /// 表达式在给定输入模式下是否可空
    pub fn nullable(&self, input: &Schema) -> Result<bool, ExpressionError> {
        match self {
            ScalarExpression::Literal(value) => Ok(value.is_null()),
            ScalarExpression::InputRef { nullable, .. } => Ok(*nullable),
            ScalarExpression::Call(call) => {
                for operand in &call.operands {
                    if operand.nullable(input)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ScalarExpression::Subquery(sub) => sub.nullable(input),
        }
    }

    /// 规范化摘要串
    ///
    /// 只依赖表达式结构，语法相同的两个表达式摘要必然相等。
    pub fn digest(&self) -> String {
        match self {
            ScalarExpression::Literal(value) => format!("{}", value),
            ScalarExpression::InputRef { index, .. } => format!("${}", index),
            ScalarExpression::Call(call) => {
                let operands: Vec<String> = call.operands.iter().map(|o| o.digest()).collect();
                format!("{}({})", call.op.name(), operands.join(", "))
            }
            ScalarExpression::Subquery(sub) => sub.digest(),
        }
    }

    /// 用绑定列表替换所有输入引用
    ///
    /// `$i` 被替换为 `bindings[i]` 的拷贝；子查询的嵌入子树属于内层
    /// 作用域，不做替换，但其外层操作数会被替换。
    pub fn substitute_input_refs(
        &self,
        bindings: &[ScalarExpression],
    ) -> Result<ScalarExpression, ExpressionError> {
        match self {
            ScalarExpression::Literal(_) => Ok(self.clone()),
            ScalarExpression::InputRef { index, .. } => {
                bindings.get(*index).cloned().ok_or_else(|| {
                    ExpressionError::TypeMismatch(format!(
                        "input reference ${} has no binding ({} available)",
                        index,
                        bindings.len()
                    ))
                })
            }
            ScalarExpression::Call(call) => {
                let operands = call
                    .operands
                    .iter()
                    .map(|o| o.substitute_input_refs(bindings))
                    .collect::<Result<Vec<_>, _>>()?;
                ScalarExpression::call(call.op.clone(), operands)
            }
            ScalarExpression::Subquery(sub) => Ok(ScalarExpression::Subquery(
                sub.substitute_operands(bindings)?,
            )),
        }
    }
}

impl fmt::Display for ScalarExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digest())
    }
}
