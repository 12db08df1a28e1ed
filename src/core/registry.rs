//! 标量操作符注册表
//!
//! 定义标量操作符的签名（元数与返回类型规则）以及显式注册表。
//! 注册表由会话/编译上下文持有并显式传入表达式构造，
//! 不存在进程级单例。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::ExpressionError;
use crate::core::types::DataType;

/// 操作数元数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandArity {
    /// 恰好 n 个操作数
    Fixed(usize),
    /// 至少 min 个操作数
    Variadic { min: usize },
}

impl OperandArity {
    /// 检查操作数数量是否满足元数要求
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            OperandArity::Fixed(n) => count == *n,
            OperandArity::Variadic { min } => count >= *min,
        }
    }
}

/// 返回类型规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnTypeRule {
    /// 始终为布尔（比较、逻辑操作符）
    Boolean,
    /// 固定类型
    Fixed(DataType),
    /// 与第 n 个操作数同型（算术操作符）
    SameAsOperand(usize),
}

/// 标量操作符签名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarOperator {
    name: String,
    arity: OperandArity,
    return_rule: ReturnTypeRule,
}

impl ScalarOperator {
    pub fn new(
        name: impl Into<String>,
        arity: OperandArity,
        return_rule: ReturnTypeRule,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            return_rule,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> OperandArity {
        self.arity
    }

    pub fn return_rule(&self) -> ReturnTypeRule {
        self.return_rule
    }

    /// 构造时的操作数数量校验
    pub fn validate_operand_count(&self, count: usize) -> Result<(), ExpressionError> {
        if self.arity.accepts(count) {
            Ok(())
        } else {
            Err(ExpressionError::MalformedPattern(format!(
                "operator `{}` expects {:?} operands, got {}",
                self.name, self.arity, count
            )))
        }
    }

    /// 是否是二元比较操作符（SOME 子查询的比较参数要求）
    pub fn is_comparison(&self) -> bool {
        matches!(self.arity, OperandArity::Fixed(2))
            && matches!(self.return_rule, ReturnTypeRule::Boolean)
    }
}

/// 操作符注册表
///
/// 内置比较、逻辑与算术操作符，允许会话注册自定义函数。
/// 使用 BTreeMap 保证迭代顺序确定。
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    operators: BTreeMap<String, ScalarOperator>,
}

impl OperatorRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            operators: BTreeMap::new(),
        }
    }

    /// 创建带内置操作符的注册表
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for name in ["=", "<>", "<", "<=", ">", ">="] {
            registry.insert(ScalarOperator::new(
                name,
                OperandArity::Fixed(2),
                ReturnTypeRule::Boolean,
            ));
        }
        for name in ["AND", "OR"] {
            registry.insert(ScalarOperator::new(
                name,
                OperandArity::Variadic { min: 2 },
                ReturnTypeRule::Boolean,
            ));
        }
        registry.insert(ScalarOperator::new(
            "NOT",
            OperandArity::Fixed(1),
            ReturnTypeRule::Boolean,
        ));
        for name in ["+", "-", "*", "/"] {
            registry.insert(ScalarOperator::new(
                name,
                OperandArity::Fixed(2),
                ReturnTypeRule::SameAsOperand(0),
            ));
        }
        registry
    }

    /// 注册或覆盖一个操作符
    pub fn insert(&mut self, op: ScalarOperator) {
        self.operators.insert(op.name().to_string(), op);
    }

    /// 查找操作符
    pub fn lookup(&self, name: &str) -> Result<&ScalarOperator, ExpressionError> {
        self.operators
            .get(name)
            .ok_or_else(|| ExpressionError::UnknownOperator(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScalarOperator> {
        self.operators.values()
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = OperatorRegistry::with_builtins();
        let eq = registry.lookup("=").expect("builtin = should exist");
        assert!(eq.is_comparison());
        assert!(registry.lookup("??").is_err());
    }

    #[test]
    fn test_arity_validation() {
        let registry = OperatorRegistry::with_builtins();
        let and = registry.lookup("AND").unwrap();
        assert!(and.validate_operand_count(3).is_ok());
        assert!(and.validate_operand_count(1).is_err());

        let not = registry.lookup("NOT").unwrap();
        assert!(not.validate_operand_count(1).is_ok());
        assert!(not.validate_operand_count(2).is_err());
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = OperatorRegistry::with_builtins();
        registry.insert(ScalarOperator::new(
            "UPPER",
            OperandArity::Fixed(1),
            ReturnTypeRule::Fixed(DataType::String),
        ));
        assert!(registry.contains("UPPER"));
        assert_eq!(
            registry.lookup("UPPER").unwrap().return_rule(),
            ReturnTypeRule::Fixed(DataType::String)
        );
    }
}
