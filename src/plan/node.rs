//! 算子节点枚举定义
//!
//! `OperatorNode` 是计划树的统一节点类型：按代数种类封闭的带标签
//! 变体，外加一个携带不透明载荷的扩展变体。枚举避免了常规路径上的
//! 动态分发，多态接口只保留给扩展变体。

use std::collections::BTreeSet;

use crate::core::error::PlanError;
use crate::core::types::Schema;
use crate::plan::nodes::aggregate::AggregateNode;
use crate::plan::nodes::conditional::{ConditionalTableModifyNode, ProviderNode};
use crate::plan::nodes::extension::ExtensionNode;
use crate::plan::nodes::filter::FilterNode;
use crate::plan::nodes::join::JoinNode;
use crate::plan::nodes::modify::TableModifyNode;
use crate::plan::nodes::project::ProjectNode;
use crate::plan::nodes::scan::{ScanNode, ValuesNode};
use crate::plan::nodes::sort::{LimitNode, SortNode};
use crate::plan::nodes::union::UnionNode;

/// 规则标记集合
///
/// 节点构造时记录的"已被某规则处理"标记。作为显式构造参数参与
/// 摘要计算，而不是隐藏的可变位，保证摘要的确定性。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleMarkers {
    rules: BTreeSet<String>,
}

impl RuleMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule: &str) {
        self.rules.insert(rule.to_string());
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.rules.contains(rule)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 按字典序拼接，供摘要使用
    pub fn join(&self, separator: &str) -> String {
        self.rules
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(String::as_str)
    }
}

/// 算子节点枚举，包含所有可能的节点种类
#[derive(Debug, Clone)]
pub enum OperatorNode {
    /// 表扫描
    Scan(ScanNode),
    /// 内联元组
    Values(ValuesNode),
    /// 过滤
    Filter(FilterNode),
    /// 投影
    Project(ProjectNode),
    /// 连接
    Join(JoinNode),
    /// 聚合
    Aggregate(AggregateNode),
    /// 排序
    Sort(SortNode),
    /// 截断
    Limit(LimitNode),
    /// 并集
    Union(UnionNode),
    /// 表修改
    TableModify(TableModifyNode),
    /// 已解析行提供者（条件写族）
    Provider(ProviderNode),
    /// 条件表修改（条件写族）
    ConditionalTableModify(ConditionalTableModifyNode),
    /// 携带不透明载荷的扩展算子
    Extension(ExtensionNode),
}

macro_rules! dispatch_node {
    ($value:expr, $node:ident => $body:expr) => {
        match $value {
            OperatorNode::Scan($node) => $body,
            OperatorNode::Values($node) => $body,
            OperatorNode::Filter($node) => $body,
            OperatorNode::Project($node) => $body,
            OperatorNode::Join($node) => $body,
            OperatorNode::Aggregate($node) => $body,
            OperatorNode::Sort($node) => $body,
            OperatorNode::Limit($node) => $body,
            OperatorNode::Union($node) => $body,
            OperatorNode::TableModify($node) => $body,
            OperatorNode::Provider($node) => $body,
            OperatorNode::ConditionalTableModify($node) => $body,
            OperatorNode::Extension($node) => $body,
        }
    };
}

macro_rules! dispatch_node_rewrap {
    ($value:expr, $node:ident => $body:expr) => {
        match $value {
            OperatorNode::Scan($node) => OperatorNode::Scan($body),
            OperatorNode::Values($node) => OperatorNode::Values($body),
            OperatorNode::Filter($node) => OperatorNode::Filter($body),
            OperatorNode::Project($node) => OperatorNode::Project($body),
            OperatorNode::Join($node) => OperatorNode::Join($body),
            OperatorNode::Aggregate($node) => OperatorNode::Aggregate($body),
            OperatorNode::Sort($node) => OperatorNode::Sort($body),
            OperatorNode::Limit($node) => OperatorNode::Limit($body),
            OperatorNode::Union($node) => OperatorNode::Union($body),
            OperatorNode::TableModify($node) => OperatorNode::TableModify($body),
            OperatorNode::Provider($node) => OperatorNode::Provider($body),
            OperatorNode::ConditionalTableModify($node) => {
                OperatorNode::ConditionalTableModify($body)
            }
            OperatorNode::Extension($node) => OperatorNode::Extension($body),
        }
    };
}

impl OperatorNode {
    /// 节点的会话内唯一 ID（不参与摘要）
    pub fn id(&self) -> i64 {
        dispatch_node!(self, node => node.id())
    }

    /// 节点种类名称
    pub fn kind_name(&self) -> &str {
        dispatch_node!(self, node => node.kind_name())
    }

    /// 有序输入列表，长度由种类固定
    pub fn inputs(&self) -> &[OperatorNode] {
        dispatch_node!(self, node => node.inputs())
    }

    /// 输入数量
    pub fn arity(&self) -> usize {
        self.inputs().len()
    }

    /// 带边界检查的输入访问
    pub fn input(&self, index: usize) -> Result<&OperatorNode, PlanError> {
        dispatch_node!(self, node => node.input(index))
    }

    pub(crate) fn input_mut(&mut self, index: usize) -> Result<&mut OperatorNode, PlanError> {
        dispatch_node!(self, node => node.input_mut(index))
    }

    /// 替换第 index 个输入并返回旧输入
    ///
    /// 仅使本节点的缓存失效，祖先在下次读取时惰性重算。
    pub fn replace_input(
        &mut self,
        index: usize,
        node: OperatorNode,
    ) -> Result<OperatorNode, PlanError> {
        dispatch_node!(self, n => n.replace_input(index, node))
    }

    /// 结构摘要：种类名 + 每种类参数 + 递归的输入摘要
    ///
    /// 摘要是结构等价键而非对象身份键；种类、参数、输入摘要逐一
    /// 相等的两个节点摘要必然相等。
    pub fn digest(&self) -> String {
        dispatch_node!(self, node => node.digest())
    }

    /// 输出模式，惰性推导并缓存
    pub fn output_schema(&self) -> Result<Schema, PlanError> {
        dispatch_node!(self, node => node.output_schema())
    }

    pub fn markers(&self) -> &RuleMarkers {
        dispatch_node!(self, node => node.markers())
    }

    pub fn has_marker(&self, rule: &str) -> bool {
        dispatch_node!(self, node => node.has_marker(rule))
    }

    /// 附加一个参与摘要的规则标记
    pub fn with_marker(self, rule: &str) -> Self {
        dispatch_node_rewrap!(self, node => node.with_marker(rule))
    }

    /// 使本节点缓存的摘要与模式失效
    pub fn invalidate_caches(&self) {
        dispatch_node!(self, node => node.invalidate_caches())
    }

    /// 整棵子树的节点数
    pub fn node_count(&self) -> usize {
        1 + self
            .inputs()
            .iter()
            .map(|input| input.node_count())
            .sum::<usize>()
    }

    // ==================== 类型检查与向下转型 ====================

    pub fn is_scan(&self) -> bool {
        matches!(self, OperatorNode::Scan(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, OperatorNode::Values(_))
    }

    pub fn is_filter(&self) -> bool {
        matches!(self, OperatorNode::Filter(_))
    }

    pub fn is_project(&self) -> bool {
        matches!(self, OperatorNode::Project(_))
    }

    pub fn is_join(&self) -> bool {
        matches!(self, OperatorNode::Join(_))
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, OperatorNode::Aggregate(_))
    }

    pub fn is_sort(&self) -> bool {
        matches!(self, OperatorNode::Sort(_))
    }

    pub fn is_limit(&self) -> bool {
        matches!(self, OperatorNode::Limit(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self, OperatorNode::Union(_))
    }

    pub fn is_table_modify(&self) -> bool {
        matches!(self, OperatorNode::TableModify(_))
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, OperatorNode::Provider(_))
    }

    pub fn is_conditional_table_modify(&self) -> bool {
        matches!(self, OperatorNode::ConditionalTableModify(_))
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, OperatorNode::Extension(_))
    }

    pub fn as_scan(&self) -> Option<&ScanNode> {
        match self {
            OperatorNode::Scan(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_values(&self) -> Option<&ValuesNode> {
        match self {
            OperatorNode::Values(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_filter(&self) -> Option<&FilterNode> {
        match self {
            OperatorNode::Filter(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_project(&self) -> Option<&ProjectNode> {
        match self {
            OperatorNode::Project(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_join(&self) -> Option<&JoinNode> {
        match self {
            OperatorNode::Join(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&AggregateNode> {
        match self {
            OperatorNode::Aggregate(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sort(&self) -> Option<&SortNode> {
        match self {
            OperatorNode::Sort(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_limit(&self) -> Option<&LimitNode> {
        match self {
            OperatorNode::Limit(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionNode> {
        match self {
            OperatorNode::Union(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_table_modify(&self) -> Option<&TableModifyNode> {
        match self {
            OperatorNode::TableModify(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_provider(&self) -> Option<&ProviderNode> {
        match self {
            OperatorNode::Provider(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_conditional_table_modify(&self) -> Option<&ConditionalTableModifyNode> {
        match self {
            OperatorNode::ConditionalTableModify(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_extension(&self) -> Option<&ExtensionNode> {
        match self {
            OperatorNode::Extension(node) => Some(node),
            _ => None,
        }
    }
}

/// 结构等价：摘要相等即节点相等，与对象身份无关
impl PartialEq for OperatorNode {
    fn eq(&self, other: &Self) -> bool {
        self.digest() == other.digest()
    }
}
