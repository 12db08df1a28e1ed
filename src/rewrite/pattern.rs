//! 模式匹配定义
//!
//! 模式是操作数描述符树：每个描述符指定具体种类或通配符、
//! 可选的守卫闭包，以及按位置递归匹配候选节点输入的子描述符列表。
//! 任一层的种类不匹配或守卫为假都会使该候选位置的匹配整体失败。

use crate::plan::node::OperatorNode;

/// 守卫谓词
///
/// 必须无副作用，且只读取候选节点子树内的状态——
/// 匹配顺序在整棵树上未作规定。
pub type Guard = fn(&OperatorNode) -> bool;

/// 节点匹配枚举
#[derive(Debug, Clone)]
pub enum MatchNode {
    /// 匹配单个特定种类
    Single(&'static str),
    /// 匹配多个可能种类中的任意一个
    Multi(Vec<&'static str>),
    /// 匹配任何种类
    Any,
}

impl MatchNode {
    pub fn matches(&self, kind_name: &str) -> bool {
        match self {
            MatchNode::Single(name) => *name == kind_name,
            MatchNode::Multi(names) => names.contains(&kind_name),
            MatchNode::Any => true,
        }
    }
}

/// 模式结构体
///
/// 子描述符按位置与候选节点的输入一一对应；
/// 子描述符数量多于候选输入时匹配失败。
#[derive(Debug, Clone)]
pub struct Pattern {
    pub node: MatchNode,
    pub guard: Option<Guard>,
    pub dependencies: Vec<Pattern>,
}

impl Pattern {
    /// 匹配任何节点的空模式
    pub fn any() -> Self {
        Self {
            node: MatchNode::Any,
            guard: None,
            dependencies: Vec::new(),
        }
    }

    /// 使用种类名称创建模式
    pub fn new_with_name(name: &'static str) -> Self {
        Self {
            node: MatchNode::Single(name),
            guard: None,
            dependencies: Vec::new(),
        }
    }

    /// 使用多个可能的种类名称创建模式
    pub fn multi(names: Vec<&'static str>) -> Self {
        Self {
            node: MatchNode::Multi(names),
            guard: None,
            dependencies: Vec::new(),
        }
    }

    /// 附加守卫
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// 追加一个子描述符（对应下一个输入位置）
    pub fn with_dependency(mut self, dependency: Pattern) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// 用种类名称追加子描述符
    pub fn with_dependency_name(mut self, name: &'static str) -> Self {
        self.dependencies.push(Self::new_with_name(name));
        self
    }

    /// 检查模式是否匹配给定节点
    pub fn matches(&self, node: &OperatorNode) -> bool {
        if !self.node.matches(node.kind_name()) {
            return false;
        }
        if let Some(guard) = self.guard {
            if !guard(node) {
                return false;
            }
        }
        let inputs = node.inputs();
        if self.dependencies.len() > inputs.len() {
            return false;
        }
        for (i, dependency) in self.dependencies.iter().enumerate() {
            if !dependency.matches(&inputs[i]) {
                return false;
            }
        }
        true
    }

    /// 匹配并按先序收集每一层被绑定的节点
    ///
    /// 不匹配时返回 None。
    pub fn bind<'a>(&self, node: &'a OperatorNode) -> Option<Vec<&'a OperatorNode>> {
        let mut bindings = Vec::new();
        if self.bind_into(node, &mut bindings) {
            Some(bindings)
        } else {
            None
        }
    }

    fn bind_into<'a>(&self, node: &'a OperatorNode, out: &mut Vec<&'a OperatorNode>) -> bool {
        if !self.node.matches(node.kind_name()) {
            return false;
        }
        if let Some(guard) = self.guard {
            if !guard(node) {
                return false;
            }
        }
        let inputs = node.inputs();
        if self.dependencies.len() > inputs.len() {
            return false;
        }
        out.push(node);
        for (i, dependency) in self.dependencies.iter().enumerate() {
            if !dependency.bind_into(&inputs[i], out) {
                return false;
            }
        }
        true
    }
}
