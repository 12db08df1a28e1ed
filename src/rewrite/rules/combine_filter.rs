//! 合并连续过滤的规则

use crate::core::error::RewriteError;
use crate::expr::expression::ScalarExpression;
use crate::plan::nodes::filter::FilterNode;
use crate::rewrite::context::RewriteContext;
use crate::rewrite::pattern::Pattern;
use crate::rewrite::result::{MatchedResult, TransformResult};
use crate::rewrite::rule::RewriteRule;

/// 合并连续过滤的规则
///
/// # 转换示例
///
/// Before:
/// ```text
///   Filter(b > 200)
///       |
///   Filter(a > 100)
///       |
///   Scan
/// ```
///
/// After:
/// ```text
///   Filter(AND(a > 100, b > 200))
///       |
///   Scan
/// ```
#[derive(Debug)]
pub struct CombineFilterRule;

impl RewriteRule for CombineFilterRule {
    fn name(&self) -> &'static str {
        "CombineFilterRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_name("Filter").with_dependency_name("Filter")
    }

    fn apply(
        &self,
        ctx: &mut RewriteContext<'_>,
        matched: &MatchedResult<'_>,
    ) -> Result<Option<TransformResult>, RewriteError> {
        let top = match matched.root().as_filter() {
            Some(filter) => filter,
            None => return Ok(None),
        };
        let child = match top.input(0)?.as_filter() {
            Some(filter) => filter,
            None => return Ok(None),
        };

        let and = ctx.operators().lookup("AND")?.clone();
        let condition = ScalarExpression::call(
            and,
            vec![child.condition().clone(), top.condition().clone()],
        )?;
        let input = child.input(0)?.clone();
        let merged = FilterNode::new(ctx.plan(), input, condition)?.into_enum();
        Ok(Some(TransformResult::with_proposal(merged)))
    }
}
