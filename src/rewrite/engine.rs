//! 重写引擎核心实现
//!
//! 引擎在计划树上匹配规则模式并应用转换：`propose` 收集所有位置
//! 上通过验证的等价提案；`rewrite` 自底向上采纳每个位置第一个有效
//! 提案并迭代到不动点（轮数受配置约束）。
//!
//! 引擎只验证等价性——替换子树的声明输出模式必须与匹配根一致，
//! 元数的良构性由节点构造保证；在多个提案之间做选择是外围代价
//! 搜索的职责。规则失败被限制在候选匹配位置：守卫为假、`apply`
//! 报错或提案未通过验证都只记录为被拒绝的重写，被匹配的树保持
//! 原样，引擎继续处理其他位置。

use crate::core::error::RewriteError;
use crate::plan::node::OperatorNode;
use crate::rewrite::config::RewriteConfig;
use crate::rewrite::context::RewriteContext;
use crate::rewrite::result::{MatchedResult, RewriteStats, TransformResult};
use crate::rewrite::rule::RewriteRule;
use crate::rewrite::rules::{
    CollapseProjectRule, CombineFilterRule, EliminateFilterRule, JoinCommuteRule,
};

/// 登记在案的等价提案
#[derive(Debug)]
pub struct Proposal {
    /// 提出提案的规则
    pub rule: &'static str,
    /// 匹配根的摘要，标识提案所在位置
    pub site_digest: String,
    /// 替换子树
    pub replacement: OperatorNode,
}

/// 重写引擎
#[derive(Debug)]
pub struct RewriteEngine {
    rules: Vec<Box<dyn RewriteRule>>,
    config: RewriteConfig,
}

impl RewriteEngine {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            config: RewriteConfig::default(),
        }
    }

    pub fn with_config(config: RewriteConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    /// 带内置规则集的引擎
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(CombineFilterRule));
        engine.add_rule(Box::new(CollapseProjectRule));
        engine.add_rule(Box::new(EliminateFilterRule));
        engine.add_rule(Box::new(JoinCommuteRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Box<dyn RewriteRule>) {
        self.rules.push(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// 收集整棵树上所有通过验证的等价提案
    ///
    /// 不修改输入树；提案按先序位置、规则注册顺序排列。
    pub fn propose(&self, ctx: &mut RewriteContext<'_>, root: &OperatorNode) -> Vec<Proposal> {
        let mut proposals = Vec::new();
        self.propose_at(ctx, root, &mut proposals);
        proposals
    }

    fn propose_at(
        &self,
        ctx: &mut RewriteContext<'_>,
        node: &OperatorNode,
        out: &mut Vec<Proposal>,
    ) {
        for rule in &self.rules {
            let bindings = match rule.pattern().bind(node) {
                Some(bindings) => bindings,
                None => continue,
            };
            let matched = MatchedResult::new(bindings);
            match rule.apply(ctx, &matched) {
                Ok(Some(result)) => {
                    self.register_proposals(rule.as_ref(), node, result, out);
                }
                Ok(None) => {}
                Err(e) => {
                    if self.config.log_rejected_proposals {
                        log::warn!(
                            "rule {} failed at {}: {}",
                            rule.name(),
                            node.kind_name(),
                            e
                        );
                    }
                }
            }
        }
        for input in node.inputs() {
            self.propose_at(ctx, input, out);
        }
    }

    fn register_proposals(
        &self,
        rule: &dyn RewriteRule,
        site: &OperatorNode,
        result: TransformResult,
        out: &mut Vec<Proposal>,
    ) {
        for replacement in result.into_proposals() {
            match Self::check_equivalence(site, &replacement) {
                Ok(()) => out.push(Proposal {
                    rule: rule.name(),
                    site_digest: site.digest(),
                    replacement,
                }),
                Err(reason) => {
                    if self.config.log_rejected_proposals {
                        log::warn!("rule {} proposal rejected: {}", rule.name(), reason);
                    }
                }
            }
        }
    }

    /// 自底向上应用规则直到不动点
    ///
    /// 每个位置采纳第一个通过验证且改变摘要的提案；
    /// 整体轮数与单位置应用次数都受配置约束，保证终止。
    pub fn rewrite(
        &self,
        ctx: &mut RewriteContext<'_>,
        root: OperatorNode,
    ) -> Result<(OperatorNode, RewriteStats), RewriteError> {
        let mut stats = RewriteStats {
            nodes_before: root.node_count(),
            ..RewriteStats::default()
        };
        let mut node = root;
        for _ in 0..self.config.max_iteration_rounds {
            stats.rounds += 1;
            let changed = self.rewrite_node(ctx, &mut node, &mut stats)?;
            if !changed {
                break;
            }
        }
        stats.nodes_after = node.node_count();
        Ok((node, stats))
    }

    fn rewrite_node(
        &self,
        ctx: &mut RewriteContext<'_>,
        node: &mut OperatorNode,
        stats: &mut RewriteStats,
    ) -> Result<bool, RewriteError> {
        let mut changed = false;
        for i in 0..node.arity() {
            if self.rewrite_node(ctx, node.input_mut(i)?, stats)? {
                changed = true;
            }
        }
        if changed {
            // 子树变了，本节点缓存的摘要与模式不再可信
            node.invalidate_caches();
        }

        let mut site_rounds = 0;
        while site_rounds < self.config.max_site_rounds {
            site_rounds += 1;
            match self.apply_first_valid(ctx, node, stats)? {
                Some(replacement) => {
                    *node = replacement;
                    changed = true;
                }
                None => break,
            }
        }
        Ok(changed)
    }

    fn apply_first_valid(
        &self,
        ctx: &mut RewriteContext<'_>,
        node: &OperatorNode,
        stats: &mut RewriteStats,
    ) -> Result<Option<OperatorNode>, RewriteError> {
        for rule in &self.rules {
            let bindings = match rule.pattern().bind(node) {
                Some(bindings) => bindings,
                None => continue,
            };
            let matched = MatchedResult::new(bindings);
            match rule.apply(ctx, &matched) {
                Ok(Some(result)) => {
                    for replacement in result.into_proposals() {
                        match Self::check_equivalence(node, &replacement) {
                            Ok(()) => {
                                if replacement.digest() == node.digest() {
                                    stats.proposals_rejected += 1;
                                    if self.config.log_rejected_proposals {
                                        log::debug!(
                                            "rule {} proposed a no-op at {}",
                                            rule.name(),
                                            node.kind_name()
                                        );
                                    }
                                    continue;
                                }
                                stats.rules_applied += 1;
                                log::debug!(
                                    "rule {} applied at {}",
                                    rule.name(),
                                    node.kind_name()
                                );
                                return Ok(Some(replacement));
                            }
                            Err(reason) => {
                                stats.proposals_rejected += 1;
                                if self.config.log_rejected_proposals {
                                    log::warn!(
                                        "rule {} proposal rejected: {}",
                                        rule.name(),
                                        reason
                                    );
                                }
                            }
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    stats.proposals_rejected += 1;
                    if self.config.log_rejected_proposals {
                        log::warn!(
                            "rule {} failed at {}: {}",
                            rule.name(),
                            node.kind_name(),
                            e
                        );
                    }
                }
            }
        }
        Ok(None)
    }

    /// 等价性验证：替换子树的声明输出模式必须与匹配根一致
    fn check_equivalence(site: &OperatorNode, replacement: &OperatorNode) -> Result<(), String> {
        let expected = site
            .output_schema()
            .map_err(|e| format!("matched site schema: {}", e))?;
        let actual = replacement
            .output_schema()
            .map_err(|e| format!("replacement schema: {}", e))?;
        if expected != actual {
            return Err(format!(
                "schema mismatch: expected {}, proposal derives {}",
                expected, actual
            ));
        }
        Ok(())
    }
}

impl Default for RewriteEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
