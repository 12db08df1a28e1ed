//! 重写规则 trait 定义
//!
//! 规则是（匹配模式、守卫谓词、应用函数）的不可变三元组，
//! 跨调用无状态。`apply` 拿到模式每一层绑定的节点引用，可以构造
//! 零或多个替换子树并作为匹配根的等价提案登记。

use std::fmt;

use crate::core::error::RewriteError;
use crate::plan::node::OperatorNode;
use crate::rewrite::context::RewriteContext;
use crate::rewrite::pattern::Pattern;
use crate::rewrite::result::{MatchedResult, TransformResult};

/// 重写规则 trait
///
/// # 规则作者约束
/// - 守卫必须无副作用，且不读取候选子树之外的状态；
/// - 规则不得无限地重新匹配自己的输出，需要时通过
///   `with_marker` 在产物上留下参与摘要的一次性标记并在守卫中跳过；
/// - 守卫失败或 `apply` 返回错误都视为"无提案"，
///   引擎跳过该位置继续处理，不触碰被匹配的树。
pub trait RewriteRule: fmt::Debug + Send + Sync {
    /// 规则名称，也是一次性标记的标记名
    fn name(&self) -> &'static str;

    /// 规则的匹配模式
    fn pattern(&self) -> Pattern;

    /// 应用重写规则
    ///
    /// # 返回
    /// - `Ok(Some(result))`: 提出零或多个等价替换子树
    /// - `Ok(None)`: 本位置无提案
    /// - `Err(e)`: 应用失败，引擎按"无提案"处理并记录
    fn apply(
        &self,
        ctx: &mut RewriteContext<'_>,
        matched: &MatchedResult<'_>,
    ) -> Result<Option<TransformResult>, RewriteError>;

    /// 检查规则是否匹配给定节点
    fn matches(&self, node: &OperatorNode) -> bool {
        self.pattern().matches(node)
    }
}
