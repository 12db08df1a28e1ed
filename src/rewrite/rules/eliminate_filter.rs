//! 消除恒真过滤的规则

use crate::core::error::RewriteError;
use crate::core::value::Value;
use crate::expr::expression::ScalarExpression;
use crate::plan::node::OperatorNode;
use crate::rewrite::context::RewriteContext;
use crate::rewrite::pattern::Pattern;
use crate::rewrite::result::{MatchedResult, TransformResult};
use crate::rewrite::rule::RewriteRule;

fn condition_is_literal_true(node: &OperatorNode) -> bool {
    node.as_filter()
        .map(|filter| {
            matches!(
                filter.condition(),
                ScalarExpression::Literal(Value::Bool(true))
            )
        })
        .unwrap_or(false)
}

/// 消除恒真过滤的规则
///
/// 条件为字面量 `true` 的 Filter 直接被其输入替代。
#[derive(Debug)]
pub struct EliminateFilterRule;

impl RewriteRule for EliminateFilterRule {
    fn name(&self) -> &'static str {
        "EliminateFilterRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_name("Filter").with_guard(condition_is_literal_true)
    }

    fn apply(
        &self,
        _ctx: &mut RewriteContext<'_>,
        matched: &MatchedResult<'_>,
    ) -> Result<Option<TransformResult>, RewriteError> {
        let input = matched.root().input(0)?.clone();
        Ok(Some(TransformResult::with_proposal(input)))
    }
}
