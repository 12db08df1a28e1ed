//! 折叠连续投影的规则

use crate::core::error::RewriteError;
use crate::expr::expression::ScalarExpression;
use crate::plan::nodes::project::{ProjectItem, ProjectNode};
use crate::rewrite::context::RewriteContext;
use crate::rewrite::pattern::Pattern;
use crate::rewrite::result::{MatchedResult, TransformResult};
use crate::rewrite::rule::RewriteRule;

/// 折叠连续投影的规则
///
/// 外层投影的输入引用被内层投影的对应表达式内联，
/// 两层投影合并为一层。
///
/// # 转换示例
///
/// Before:
/// ```text
///   Project(x = $0 + 1)
///       |
///   Project($1)
///       |
///   Scan
/// ```
///
/// After:
/// ```text
///   Project(x = $1 + 1)
///       |
///   Scan
/// ```
#[derive(Debug)]
pub struct CollapseProjectRule;

impl RewriteRule for CollapseProjectRule {
    fn name(&self) -> &'static str {
        "CollapseProjectRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_name("Project").with_dependency_name("Project")
    }

    fn apply(
        &self,
        ctx: &mut RewriteContext<'_>,
        matched: &MatchedResult<'_>,
    ) -> Result<Option<TransformResult>, RewriteError> {
        let outer = match matched.root().as_project() {
            Some(project) => project,
            None => return Ok(None),
        };
        let inner = match outer.input(0)?.as_project() {
            Some(project) => project,
            None => return Ok(None),
        };

        let bindings: Vec<ScalarExpression> = inner
            .items()
            .iter()
            .map(|item| item.expression.clone())
            .collect();

        let mut items = Vec::with_capacity(outer.items().len());
        for item in outer.items() {
            items.push(ProjectItem::new(
                item.expression.substitute_input_refs(&bindings)?,
                item.alias.clone(),
            ));
        }

        let input = inner.input(0)?.clone();
        let collapsed = ProjectNode::new(ctx.plan(), input, items)?.into_enum();
        Ok(Some(TransformResult::with_proposal(collapsed)))
    }
}
