//! 内连接交换律规则

use crate::core::error::RewriteError;
use crate::expr::expression::ScalarExpression;
use crate::plan::node::OperatorNode;
use crate::plan::nodes::join::{JoinKind, JoinNode};
use crate::plan::nodes::project::{ProjectItem, ProjectNode};
use crate::rewrite::context::RewriteContext;
use crate::rewrite::pattern::Pattern;
use crate::rewrite::result::{MatchedResult, TransformResult};
use crate::rewrite::rule::RewriteRule;

/// 规则标记名，守卫据此跳过本规则自己的产物
const MARKER: &str = "JoinCommuteRule";

fn commutable_inner_join(node: &OperatorNode) -> bool {
    node.as_join()
        .map(|join| join.join_kind() == JoinKind::Inner && !node.has_marker(MARKER))
        .unwrap_or(false)
}

/// 内连接交换律规则
///
/// 交换内连接的左右输入，条件中的输入引用按新列空间重映射，
/// 顶端补一层投影恢复原列顺序，使提案与匹配根模式一致。
/// 交换后的连接带上一次性标记，规则不会重新匹配自己的产物。
#[derive(Debug)]
pub struct JoinCommuteRule;

impl RewriteRule for JoinCommuteRule {
    fn name(&self) -> &'static str {
        MARKER
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_name("Join").with_guard(commutable_inner_join)
    }

    fn apply(
        &self,
        ctx: &mut RewriteContext<'_>,
        matched: &MatchedResult<'_>,
    ) -> Result<Option<TransformResult>, RewriteError> {
        let join = match matched.root().as_join() {
            Some(join) => join,
            None => return Ok(None),
        };
        let left = join.left_input()?.clone();
        let right = join.right_input()?.clone();
        let left_schema = left.output_schema()?;
        let right_schema = right.output_schema()?;
        let right_width = right_schema.column_count();

        // 原条件的 $i 落在 [left, right] 拼接空间；
        // 交换后空间变为 [right, left]，左列整体右移，右列左移
        let mut bindings =
            Vec::with_capacity(left_schema.column_count() + right_schema.column_count());
        for (i, col) in left_schema.columns().iter().enumerate() {
            bindings.push(ScalarExpression::input_ref(
                right_width + i,
                col.data_type,
                col.nullable,
            ));
        }
        for (j, col) in right_schema.columns().iter().enumerate() {
            bindings.push(ScalarExpression::input_ref(j, col.data_type, col.nullable));
        }
        let condition = join.condition().substitute_input_refs(&bindings)?;

        let commuted = JoinNode::new(ctx.plan(), right, left, JoinKind::Inner, condition)?
            .into_enum()
            .with_marker(MARKER);

        // 恢复原列顺序的投影
        let mut items =
            Vec::with_capacity(left_schema.column_count() + right_schema.column_count());
        for (i, col) in left_schema.columns().iter().enumerate() {
            items.push(ProjectItem::new(
                ScalarExpression::input_ref(right_width + i, col.data_type, col.nullable),
                col.name.clone(),
            ));
        }
        for (j, col) in right_schema.columns().iter().enumerate() {
            items.push(ProjectItem::new(
                ScalarExpression::input_ref(j, col.data_type, col.nullable),
                col.name.clone(),
            ));
        }
        let restored = ProjectNode::new(ctx.plan(), commuted, items)?.into_enum();
        Ok(Some(TransformResult::with_proposal(restored)))
    }
}
