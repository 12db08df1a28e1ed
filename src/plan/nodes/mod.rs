//! 算子节点实现
//!
//! 每个文件定义一族相关节点；公共行为由 `define_operator_node!`
//! 宏生成，各节点自行实现参数摘要与输出模式推导。

pub mod aggregate;
pub mod conditional;
pub mod extension;
pub mod filter;
pub mod join;
pub mod modify;
pub mod project;
pub mod scan;
pub mod sort;
pub mod union;

pub use aggregate::{AggregateCall, AggregateFunction, AggregateNode};
pub use conditional::{ConditionalTableModifyNode, ProviderNode};
pub use extension::{ExtensionNode, ExtensionOperator};
pub use filter::FilterNode;
pub use join::{JoinKind, JoinNode};
pub use modify::{ModifyOperation, TableModifyNode};
pub use project::{ProjectItem, ProjectNode};
pub use scan::{ScanNode, ValuesNode};
pub use sort::{LimitNode, SortKey, SortNode};
pub use union::UnionNode;
