//! 计划树模块
//!
//! 算子节点及其输入管理、结构摘要、输出模式推导与遍历。

pub mod explain;
pub mod macros;
pub mod node;
pub mod nodes;
pub mod visitor;

pub use explain::{describe, dump, Pair, PlanDescription};
pub use node::{OperatorNode, RuleMarkers};
pub use nodes::{
    AggregateCall, AggregateFunction, AggregateNode, ConditionalTableModifyNode, ExtensionNode,
    ExtensionOperator, FilterNode, JoinKind, JoinNode, LimitNode, ModifyOperation, ProjectItem,
    ProjectNode, ProviderNode, ScanNode, SortKey, SortNode, TableModifyNode, UnionNode,
    ValuesNode,
};
pub use visitor::{InputVisitor, NodeVisitor};
