//! 标量表达式模块
//!
//! 算子节点参数中使用的值表达式：字面量、输入引用、调用，
//! 以及嵌入完整算子子树的子查询表达式。

pub mod expression;
pub mod subquery;

pub use expression::{CallExpression, ScalarExpression};
pub use subquery::{SubqueryExpression, SubqueryVariant};
