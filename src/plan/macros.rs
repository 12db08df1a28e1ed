//! 算子节点宏定义
//!
//! 提供宏来生成算子节点的公共字段与访问方法，减少样板代码。
//! 每个节点持有固定元数的有序输入、参与摘要的规则标记，
//! 以及惰性计算的摘要与输出模式缓存。
//!
//! 各节点自行实现 `params_digest`（每种类参数的摘要片段）与
//! `derive_schema`（输出模式推导），其余公共行为由宏生成。

/// 定义算子节点的宏
///
/// # 示例
/// ```ignore
/// define_operator_node! {
///     pub struct FilterNode [kind = Filter, arity = 1] {
///         condition: ScalarExpression,
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_operator_node {
    (
        $(#[$meta:meta])*
        pub struct $name:ident [kind = $kind:ident, arity = $arity:expr] {
            $($(#[$fmeta:meta])* $field:ident: $ftype:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            id: i64,
            inputs: Vec<$crate::plan::node::OperatorNode>,
            $($(#[$fmeta])* $field: $ftype,)*
            markers: $crate::plan::node::RuleMarkers,
            digest_cache: ::std::cell::RefCell<Option<String>>,
            schema_cache: ::std::cell::RefCell<Option<$crate::core::types::Schema>>,
        }

        impl $name {
            pub const KIND: &'static str = stringify!($kind);
            pub const ARITY: usize = $arity;

            fn assemble(
                id: i64,
                inputs: Vec<$crate::plan::node::OperatorNode>,
                $($field: $ftype,)*
            ) -> Self {
                debug_assert_eq!(inputs.len(), Self::ARITY);
                Self {
                    id,
                    inputs,
                    $($field,)*
                    markers: $crate::plan::node::RuleMarkers::new(),
                    digest_cache: ::std::cell::RefCell::new(None),
                    schema_cache: ::std::cell::RefCell::new(None),
                }
            }

            pub fn id(&self) -> i64 {
                self.id
            }

            pub fn kind_name(&self) -> &'static str {
                Self::KIND
            }

            pub fn inputs(&self) -> &[$crate::plan::node::OperatorNode] {
                &self.inputs
            }

            pub fn input(
                &self,
                index: usize,
            ) -> Result<&$crate::plan::node::OperatorNode, $crate::core::error::PlanError> {
                self.inputs
                    .get(index)
                    .ok_or($crate::core::error::PlanError::IndexOutOfRange {
                        kind: Self::KIND,
                        index,
                        arity: Self::ARITY,
                    })
            }

            pub(crate) fn input_mut(
                &mut self,
                index: usize,
            ) -> Result<&mut $crate::plan::node::OperatorNode, $crate::core::error::PlanError>
            {
                self.inputs
                    .get_mut(index)
                    .ok_or($crate::core::error::PlanError::IndexOutOfRange {
                        kind: Self::KIND,
                        index,
                        arity: Self::ARITY,
                    })
            }

            /// 替换第 index 个输入并返回旧输入
            ///
            /// 仅使本节点缓存的摘要与模式失效；祖先节点在下次读取时
            /// 自行惰性重算。
            pub fn replace_input(
                &mut self,
                index: usize,
                node: $crate::plan::node::OperatorNode,
            ) -> Result<$crate::plan::node::OperatorNode, $crate::core::error::PlanError> {
                if index >= self.inputs.len() {
                    return Err($crate::core::error::PlanError::IndexOutOfRange {
                        kind: Self::KIND,
                        index,
                        arity: Self::ARITY,
                    });
                }
                let old = ::std::mem::replace(&mut self.inputs[index], node);
                self.invalidate_caches();
                Ok(old)
            }

            pub fn markers(&self) -> &$crate::plan::node::RuleMarkers {
                &self.markers
            }

            pub fn has_marker(&self, rule: &str) -> bool {
                self.markers.contains(rule)
            }

            /// 附加一个规则标记
            ///
            /// 标记是构造参数的一部分，参与摘要计算。
            pub fn with_marker(mut self, rule: &str) -> Self {
                self.markers.insert(rule);
                self.invalidate_caches();
                self
            }

            /// 结构摘要，惰性计算并缓存
            pub fn digest(&self) -> String {
                if let Some(cached) = self.digest_cache.borrow().as_ref() {
                    return cached.clone();
                }
                let digest = self.compute_digest();
                *self.digest_cache.borrow_mut() = Some(digest.clone());
                digest
            }

            fn compute_digest(&self) -> String {
                let mut parts: Vec<String> = Vec::new();
                let params = self.params_digest();
                if !params.is_empty() {
                    parts.push(params);
                }
                if !self.markers.is_empty() {
                    parts.push(format!("markers=[{}]", self.markers.join(",")));
                }
                let inputs: Vec<String> =
                    self.inputs.iter().map(|input| input.digest()).collect();
                parts.push(format!("inputs=[{}]", inputs.join(",")));
                format!("{}({})", Self::KIND, parts.join(", "))
            }

            /// 输出模式，惰性推导并缓存
            pub fn output_schema(
                &self,
            ) -> Result<$crate::core::types::Schema, $crate::core::error::PlanError> {
                if let Some(cached) = self.schema_cache.borrow().as_ref() {
                    return Ok(cached.clone());
                }
                let schema = self.derive_schema()?;
                *self.schema_cache.borrow_mut() = Some(schema.clone());
                Ok(schema)
            }

            /// 使本节点缓存的摘要与模式失效
            pub fn invalidate_caches(&self) {
                self.digest_cache.borrow_mut().take();
                self.schema_cache.borrow_mut().take();
            }

            pub fn into_enum(self) -> $crate::plan::node::OperatorNode {
                $crate::plan::node::OperatorNode::$kind(self)
            }
        }
    };
}
