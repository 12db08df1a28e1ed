//! 计划树遍历
//!
//! 访问者按声明顺序接收每个直接子节点及其序号；
//! 整树遍历采用先序。

use crate::plan::node::OperatorNode;

/// 直接子节点访问者
///
/// 返回 true 继续遍历，false 停止。
pub trait InputVisitor {
    fn visit_input(&mut self, ordinal: usize, input: &OperatorNode) -> bool;
}

/// 整树节点访问者
pub trait NodeVisitor {
    /// 返回 true 继续遍历，false 停止
    fn visit(&mut self, node: &OperatorNode) -> bool;
}

impl OperatorNode {
    /// 按声明顺序访问每个直接子节点
    pub fn visit_inputs(&self, visitor: &mut dyn InputVisitor) -> bool {
        for (ordinal, input) in self.inputs().iter().enumerate() {
            if !visitor.visit_input(ordinal, input) {
                return false;
            }
        }
        true
    }

    /// 先序遍历整棵子树
    pub fn accept(&self, visitor: &mut dyn NodeVisitor) -> bool {
        if !visitor.visit(self) {
            return false;
        }
        for input in self.inputs() {
            if !input.accept(visitor) {
                return false;
            }
        }
        true
    }
}

/// 按种类名查找节点的访问者
#[derive(Debug)]
pub struct NodeFinder {
    target_kind: String,
    pub found: Option<String>,
}

impl NodeFinder {
    pub fn new(target_kind: &str) -> Self {
        Self {
            target_kind: target_kind.to_string(),
            found: None,
        }
    }
}

impl NodeVisitor for NodeFinder {
    fn visit(&mut self, node: &OperatorNode) -> bool {
        if node.kind_name() == self.target_kind {
            self.found = Some(node.digest());
            return false;
        }
        true
    }
}

/// 记录访问顺序的访问者
#[derive(Debug, Default)]
pub struct KindRecorder {
    pub kinds: Vec<String>,
}

impl KindRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeVisitor for KindRecorder {
    fn visit(&mut self, node: &OperatorNode) -> bool {
        self.kinds.push(node.kind_name().to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::{PlanContext, TableHandle};
    use crate::core::types::{ColumnDef, DataType, Schema};
    use crate::core::value::Value;
    use crate::expr::expression::ScalarExpression;
    use crate::plan::nodes::filter::FilterNode;
    use crate::plan::nodes::scan::ScanNode;

    fn filter_over_scan(ctx: &PlanContext) -> OperatorNode {
        let handle = TableHandle::new(
            "store",
            "t",
            Schema::new(vec![ColumnDef::new("a", DataType::Int, false)]),
        );
        let scan = ScanNode::new(ctx, handle).unwrap().into_enum();
        FilterNode::new(ctx, scan, ScalarExpression::literal(Value::Bool(true)))
            .unwrap()
            .into_enum()
    }

    #[test]
    fn test_preorder_traversal() {
        let ctx = PlanContext::new();
        let tree = filter_over_scan(&ctx);
        let mut recorder = KindRecorder::new();
        assert!(tree.accept(&mut recorder));
        assert_eq!(recorder.kinds, vec!["Filter", "Scan"]);
    }

    #[test]
    fn test_finder_stops_traversal() {
        let ctx = PlanContext::new();
        let tree = filter_over_scan(&ctx);
        let mut finder = NodeFinder::new("Scan");
        assert!(!tree.accept(&mut finder));
        assert!(finder.found.is_some());
    }

    #[test]
    fn test_input_visitor_sees_ordinals() {
        struct Ordinals(Vec<usize>);
        impl InputVisitor for Ordinals {
            fn visit_input(&mut self, ordinal: usize, _input: &OperatorNode) -> bool {
                self.0.push(ordinal);
                true
            }
        }

        let ctx = PlanContext::new();
        let tree = filter_over_scan(&ctx);
        let mut ordinals = Ordinals(Vec::new());
        assert!(tree.visit_inputs(&mut ordinals));
        assert_eq!(ordinals.0, vec![0]);
    }
}
