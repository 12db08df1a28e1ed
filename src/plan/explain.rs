//! 计划描述与文本转储
//!
//! 为诊断与外部工具提供计划树的结构化描述（可序列化为 JSON）
//! 以及缩进的文本转储。

use serde::{Deserialize, Serialize};

use crate::plan::node::OperatorNode;

/// 节点描述键值对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 计划节点描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDescription {
    pub name: String,
    pub id: i64,
    pub description: Vec<Pair>,
    pub children: Vec<PlanDescription>,
}

impl PlanDescription {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 生成计划树的结构化描述
pub fn describe(node: &OperatorNode) -> PlanDescription {
    let mut description = Vec::new();
    match node {
        OperatorNode::Scan(scan) => {
            description.push(Pair::new("table", scan.table().qualified_name()));
        }
        OperatorNode::Values(values) => {
            description.push(Pair::new("tuples", values.tuples().len().to_string()));
        }
        OperatorNode::Filter(filter) => {
            description.push(Pair::new("condition", filter.condition().digest()));
        }
        OperatorNode::Project(project) => {
            let exprs: Vec<String> = project
                .items()
                .iter()
                .map(|item| format!("{}:{}", item.alias, item.expression.digest()))
                .collect();
            description.push(Pair::new("exprs", exprs.join(", ")));
        }
        OperatorNode::Join(join) => {
            description.push(Pair::new("kind", join.join_kind().name()));
            description.push(Pair::new("condition", join.condition().digest()));
        }
        OperatorNode::Aggregate(aggregate) => {
            let keys: Vec<String> = aggregate
                .group_keys()
                .iter()
                .map(|k| k.to_string())
                .collect();
            description.push(Pair::new("group", keys.join(",")));
            description.push(Pair::new("calls", aggregate.calls().len().to_string()));
        }
        OperatorNode::Sort(sort) => {
            description.push(Pair::new("keys", sort.keys().len().to_string()));
        }
        OperatorNode::Limit(limit) => {
            description.push(Pair::new("offset", limit.offset().to_string()));
            description.push(Pair::new("count", limit.count().to_string()));
        }
        OperatorNode::Union(union) => {
            description.push(Pair::new("all", union.all().to_string()));
        }
        OperatorNode::TableModify(modify) => {
            description.push(Pair::new("table", modify.table().qualified_name()));
            description.push(Pair::new("op", modify.operation().name()));
        }
        OperatorNode::Provider(provider) => {
            description.push(Pair::new("table", provider.table().qualified_name()));
            description.push(Pair::new("rows", provider.rows().len().to_string()));
        }
        OperatorNode::ConditionalTableModify(_) => {
            description.push(Pair::new("branches", "modify,query,prepared"));
        }
        OperatorNode::Extension(extension) => {
            description.push(Pair::new("payload", extension.payload().params_digest()));
        }
    }
    if !node.markers().is_empty() {
        description.push(Pair::new("markers", node.markers().join(",")));
    }

    PlanDescription {
        name: node.kind_name().to_string(),
        id: node.id(),
        description,
        children: node.inputs().iter().map(describe).collect(),
    }
}

/// 缩进的文本转储
pub fn dump(node: &OperatorNode) -> String {
    let mut out = String::new();
    dump_into(node, 0, &mut out);
    out
}

fn dump_into(node: &OperatorNode, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str("+- ");
    out.push_str(&node.digest());
    out.push('\n');
    for input in node.inputs() {
        dump_into(input, depth + 1, out);
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

    fn plan(ctx: &PlanContext) -> OperatorNode {
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
    fn test_describe_shape() {
        let ctx = PlanContext::new();
        let desc = describe(&plan(&ctx));
        assert_eq!(desc.name, "Filter");
        assert_eq!(desc.children.len(), 1);
        assert_eq!(desc.children[0].name, "Scan");
    }

    #[test]
    fn test_describe_serializes_to_json() {
        let ctx = PlanContext::new();
        let json = describe(&plan(&ctx)).to_json().unwrap();
        assert!(json.contains("\"Filter\""));
        assert!(json.contains("store.t"));
    }

    #[test]
    fn test_dump_indents_children() {
        let ctx = PlanContext::new();
        let text = dump(&plan(&ctx));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("+- Filter"));
        assert!(lines[1].starts_with("  +- Scan"));
    }
}
