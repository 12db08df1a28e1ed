//! 内置重写规则
//!
//! 规则按家族分文件：合并、消除、连接变换。

pub mod collapse_project;
pub mod combine_filter;
pub mod eliminate_filter;
pub mod join_commute;

pub use collapse_project::CollapseProjectRule;
pub use combine_filter::CombineFilterRule;
pub use eliminate_filter::EliminateFilterRule;
pub use join_commute::JoinCommuteRule;
