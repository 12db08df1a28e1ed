//! 计划重写模块
//!
//! 基于模式 + 守卫匹配的重写规则引擎：对计划树匹配操作数模式，
//! 应用受守卫保护的转换函数，并登记提出的等价子树。
//! 在多个提案之间做选择属于外围的代价搜索，不在本模块范围内。

pub mod config;
pub mod context;
pub mod engine;
pub mod pattern;
pub mod result;
pub mod rule;
pub mod rules;

pub use config::RewriteConfig;
pub use context::RewriteContext;
pub use engine::{Proposal, RewriteEngine};
pub use pattern::{Guard, MatchNode, Pattern};
pub use result::{MatchedResult, RewriteStats, TransformResult};
pub use rule::RewriteRule;
pub use rules::{
    CollapseProjectRule, CombineFilterRule, EliminateFilterRule, JoinCommuteRule,
};
