//! 匹配与转换结果
//!
//! `MatchedResult` 按先序绑定模式每一层匹配到的节点；
//! `TransformResult` 携带零或多个提出的替换子树；
//! `RewriteStats` 收集一次重写运行的统计信息。

use crate::plan::node::OperatorNode;

/// 匹配结果
///
/// 绑定顺序与模式描述符的先序一致，下标 0 总是匹配根。
#[derive(Debug)]
pub struct MatchedResult<'a> {
    bindings: Vec<&'a OperatorNode>,
}

impl<'a> MatchedResult<'a> {
    pub fn new(bindings: Vec<&'a OperatorNode>) -> Self {
        debug_assert!(!bindings.is_empty());
        Self { bindings }
    }

    /// 匹配根节点
    pub fn root(&self) -> &'a OperatorNode {
        self.bindings[0]
    }

    /// 全部绑定，先序
    pub fn bindings(&self) -> &[&'a OperatorNode] {
        &self.bindings
    }

    /// 第 index 个绑定
    pub fn node(&self, index: usize) -> Option<&'a OperatorNode> {
        self.bindings.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// 转换结果：提出的等价替换子树
#[derive(Debug, Default)]
pub struct TransformResult {
    proposals: Vec<OperatorNode>,
}

impl TransformResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proposal(node: OperatorNode) -> Self {
        Self {
            proposals: vec![node],
        }
    }

    pub fn add_proposal(&mut self, node: OperatorNode) {
        self.proposals.push(node);
    }

    pub fn proposals(&self) -> &[OperatorNode] {
        &self.proposals
    }

    pub fn into_proposals(self) -> Vec<OperatorNode> {
        self.proposals
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

/// 重写统计
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RewriteStats {
    /// 成功采纳的规则应用次数
    pub rules_applied: usize,
    /// 被拒绝的提案数（模式不等价、规则报错等）
    pub proposals_rejected: usize,
    /// 实际运行的迭代轮数
    pub rounds: usize,
    /// 重写前的节点数
    pub nodes_before: usize,
    /// 重写后的节点数
    pub nodes_after: usize,
}
