//! 扩展算子节点
//!
//! 可插拔/自定义算子的逃生舱：封闭枚举之外的算子以不透明载荷的
//! 形式挂在 `Extension` 变体上。多态接口只保留在这里，常规算子
//! 走静态分发。

use std::cell::RefCell;
use std::fmt;

use crate::core::context::PlanContext;
use crate::core::error::PlanError;
use crate::core::types::Schema;
use crate::plan::node::{OperatorNode, RuleMarkers};

/// 扩展算子载荷接口
///
/// 载荷声明自己的种类名、输入元数、参数摘要与模式推导；
/// `payload_bytes` 是编解码时透传的不透明字节串。
pub trait ExtensionOperator: fmt::Debug {
    /// 种类名称，参与摘要与编解码标签
    fn kind_name(&self) -> &str;

    /// 声明的输入数量
    fn declared_arity(&self) -> usize;

    /// 参数摘要片段
    fn params_digest(&self) -> String;

    /// 由输入模式推导输出模式
    fn derive_schema(&self, inputs: &[Schema]) -> Result<Schema, PlanError>;

    /// 编解码透传的不透明载荷
    fn payload_bytes(&self) -> Vec<u8>;

    /// 对象安全的克隆
    fn clone_box(&self) -> Box<dyn ExtensionOperator>;
}

/// 扩展算子节点
///
/// 与宏生成的节点保持相同的访问契约，但元数由载荷声明，
/// 行为通过载荷动态分发。
#[derive(Debug)]
pub struct ExtensionNode {
    id: i64,
    inputs: Vec<OperatorNode>,
    payload: Box<dyn ExtensionOperator>,
    markers: RuleMarkers,
    digest_cache: RefCell<Option<String>>,
    schema_cache: RefCell<Option<Schema>>,
}

impl Clone for ExtensionNode {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inputs: self.inputs.clone(),
            payload: self.payload.clone_box(),
            markers: self.markers.clone(),
            digest_cache: self.digest_cache.clone(),
            schema_cache: self.schema_cache.clone(),
        }
    }
}

impl ExtensionNode {
    pub fn new(
        ctx: &PlanContext,
        payload: Box<dyn ExtensionOperator>,
        inputs: Vec<OperatorNode>,
    ) -> Result<Self, PlanError> {
        if inputs.len() != payload.declared_arity() {
            return Err(PlanError::MalformedPattern(format!(
                "extension `{}` declares {} inputs, got {}",
                payload.kind_name(),
                payload.declared_arity(),
                inputs.len()
            )));
        }
        Ok(Self {
            id: ctx.next_node_id(),
            inputs,
            payload,
            markers: RuleMarkers::new(),
            digest_cache: RefCell::new(None),
            schema_cache: RefCell::new(None),
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn kind_name(&self) -> &str {
        self.payload.kind_name()
    }

    pub fn payload(&self) -> &dyn ExtensionOperator {
        self.payload.as_ref()
    }

    pub fn inputs(&self) -> &[OperatorNode] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> Result<&OperatorNode, PlanError> {
        let arity = self.inputs.len();
        self.inputs
            .get(index)
            .ok_or(PlanError::IndexOutOfRange {
                kind: "Extension",
                index,
                arity,
            })
    }

    pub(crate) fn input_mut(&mut self, index: usize) -> Result<&mut OperatorNode, PlanError> {
        let arity = self.inputs.len();
        self.inputs
            .get_mut(index)
            .ok_or(PlanError::IndexOutOfRange {
                kind: "Extension",
                index,
                arity,
            })
    }

    pub fn replace_input(
        &mut self,
        index: usize,
        node: OperatorNode,
    ) -> Result<OperatorNode, PlanError> {
        if index >= self.inputs.len() {
            return Err(PlanError::IndexOutOfRange {
                kind: "Extension",
                index,
                arity: self.inputs.len(),
            });
        }
        let old = std::mem::replace(&mut self.inputs[index], node);
        self.invalidate_caches();
        Ok(old)
    }

    pub fn markers(&self) -> &RuleMarkers {
        &self.markers
    }

    pub fn has_marker(&self, rule: &str) -> bool {
        self.markers.contains(rule)
    }

    pub fn with_marker(mut self, rule: &str) -> Self {
        self.markers.insert(rule);
        self.invalidate_caches();
        self
    }

    pub fn digest(&self) -> String {
        if let Some(cached) = self.digest_cache.borrow().as_ref() {
            return cached.clone();
        }
        let mut parts: Vec<String> = Vec::new();
        let params = self.payload.params_digest();
        if !params.is_empty() {
            parts.push(params);
        }
        if !self.markers.is_empty() {
            parts.push(format!("markers=[{}]", self.markers.join(",")));
        }
        let inputs: Vec<String> = self.inputs.iter().map(|input| input.digest()).collect();
        parts.push(format!("inputs=[{}]", inputs.join(",")));
        let digest = format!("{}({})", self.payload.kind_name(), parts.join(", "));
        *self.digest_cache.borrow_mut() = Some(digest.clone());
        digest
    }

    pub fn output_schema(&self) -> Result<Schema, PlanError> {
        if let Some(cached) = self.schema_cache.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let input_schemas = self
            .inputs
            .iter()
            .map(|input| input.output_schema())
            .collect::<Result<Vec<_>, _>>()?;
        let schema = self.payload.derive_schema(&input_schemas)?;
        *self.schema_cache.borrow_mut() = Some(schema.clone());
        Ok(schema)
    }

    pub fn invalidate_caches(&self) {
        self.digest_cache.borrow_mut().take();
        self.schema_cache.borrow_mut().take();
    }

    pub fn into_enum(self) -> OperatorNode {
        OperatorNode::Extension(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ColumnDef, DataType};

    /// 测试用的透传扩展算子
    #[derive(Debug, Clone)]
    struct PassThrough {
        arity: usize,
    }

    impl ExtensionOperator for PassThrough {
        fn kind_name(&self) -> &str {
            "PassThrough"
        }

        fn declared_arity(&self) -> usize {
            self.arity
        }

        fn params_digest(&self) -> String {
            String::new()
        }

        fn derive_schema(&self, inputs: &[Schema]) -> Result<Schema, PlanError> {
            inputs.first().cloned().ok_or_else(|| {
                PlanError::SchemaDerivation("pass-through needs one input".to_string())
            })
        }

        fn payload_bytes(&self) -> Vec<u8> {
            vec![self.arity as u8]
        }

        fn clone_box(&self) -> Box<dyn ExtensionOperator> {
            Box::new(self.clone())
        }
    }

    fn scan(ctx: &PlanContext) -> OperatorNode {
        let handle = crate::core::context::TableHandle::new(
            "store",
            "t",
            Schema::new(vec![ColumnDef::new("a", DataType::Int, false)]),
        );
        crate::plan::nodes::scan::ScanNode::new(ctx, handle)
            .unwrap()
            .into_enum()
    }

    #[test]
    fn test_extension_arity_checked() {
        let ctx = PlanContext::new();
        let err = ExtensionNode::new(&ctx, Box::new(PassThrough { arity: 2 }), vec![scan(&ctx)]);
        assert!(matches!(err, Err(PlanError::MalformedPattern(_))));
    }

    #[test]
    fn test_extension_delegates_to_payload() {
        let ctx = PlanContext::new();
        let node =
            ExtensionNode::new(&ctx, Box::new(PassThrough { arity: 1 }), vec![scan(&ctx)])
                .unwrap();
        assert_eq!(node.kind_name(), "PassThrough");
        assert_eq!(node.output_schema().unwrap().column_count(), 1);
        assert!(node.digest().starts_with("PassThrough("));
    }
}
