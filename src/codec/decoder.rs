//! 计划解码器
//!
//! 从信封字节串重建算子节点树。解码后的树与原树结构相等
//! （摘要一致），但永远不是同一个对象：每次调用分配一棵新树，
//! 节点 ID 由解码器自己的会话上下文重新分配。
//!
//! 目录引用在提供了 `RebuildContext` 时重新解析；信封内嵌入的
//! 子查询子树与扩展算子必须有上下文才能重建。

use crate::codec::buffer::EnvelopeReader;
use crate::codec::context::RebuildContext;
use crate::codec::tags::{
    expr_tag, node_tag, type_tag, value_tag, ENVELOPE_MAGIC, FORMAT_VERSION,
};
use crate::core::context::{PlanContext, TableHandle};
use crate::core::error::CodecError;
use crate::core::registry::{OperandArity, ReturnTypeRule, ScalarOperator};
use crate::core::types::{ColumnDef, DataType, Schema};
use crate::core::value::Value;
use crate::expr::expression::ScalarExpression;
use crate::expr::subquery::SubqueryExpression;
use crate::plan::node::OperatorNode;
use crate::plan::nodes::aggregate::{AggregateCall, AggregateFunction, AggregateNode};
use crate::plan::nodes::conditional::{ConditionalTableModifyNode, ProviderNode};
use crate::plan::nodes::filter::FilterNode;
use crate::plan::nodes::join::{JoinKind, JoinNode};
use crate::plan::nodes::modify::{ModifyOperation, TableModifyNode};
use crate::plan::nodes::project::{ProjectItem, ProjectNode};
use crate::plan::nodes::scan::{ScanNode, ValuesNode};
use crate::plan::nodes::sort::{LimitNode, SortKey, SortNode};
use crate::plan::nodes::union::UnionNode;

/// 计划解码器
pub struct PlanDecoder<'a> {
    rebuild: Option<&'a dyn RebuildContext>,
    plan: PlanContext,
}

impl<'a> PlanDecoder<'a> {
    /// 创建解码器
    ///
    /// 没有重建上下文时，目录引用退回到信封内携带的模式快照；
    /// 嵌入子查询子树或扩展算子的信封必须提供上下文。
    pub fn new(rebuild: Option<&'a dyn RebuildContext>) -> Self {
        Self {
            rebuild,
            plan: PlanContext::new(),
        }
    }

    /// 解码一个信封
    pub fn decode(&self, bytes: &[u8]) -> Result<OperatorNode, CodecError> {
        let mut reader = EnvelopeReader::new(bytes);
        for expected in ENVELOPE_MAGIC {
            if reader.read_u8()? != expected {
                return Err(CodecError::InvalidData(
                    "bad envelope magic".to_string(),
                ));
            }
        }
        let version = reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(CodecError::VersionMismatch {
                expected: FORMAT_VERSION,
                actual: version,
            });
        }
        let node = self.decode_node(&mut reader)?;
        if !reader.is_exhausted() {
            return Err(CodecError::InvalidData(format!(
                "{} trailing bytes after envelope",
                reader.remaining()
            )));
        }
        Ok(node)
    }

    fn decode_node(&self, r: &mut EnvelopeReader<'_>) -> Result<OperatorNode, CodecError> {
        let tag = r.read_u8()?;
        if !(node_tag::SCAN..=node_tag::EXTENSION).contains(&tag) {
            return Err(CodecError::UnsupportedKind(tag));
        }
        let markers = self.decode_markers(r)?;

        let node = match tag {
            node_tag::SCAN => {
                let table = self.decode_table(r)?;
                let inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 0, "Scan")?;
                ScanNode::new(&self.plan, table)?.into_enum()
            }
            node_tag::VALUES => {
                let schema = self.decode_schema(r)?;
                let tuple_count = r.read_u32()? as usize;
                let mut tuples = Vec::with_capacity(tuple_count);
                for _ in 0..tuple_count {
                    let width = r.read_u16()? as usize;
                    let mut tuple = Vec::with_capacity(width);
                    for _ in 0..width {
                        tuple.push(self.decode_value(r)?);
                    }
                    tuples.push(tuple);
                }
                let inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 0, "Values")?;
                ValuesNode::new(&self.plan, schema, tuples)?.into_enum()
            }
            node_tag::FILTER => {
                let condition = self.decode_expr(r)?;
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 1, "Filter")?;
                FilterNode::new(&self.plan, inputs.remove(0), condition)?.into_enum()
            }
            node_tag::PROJECT => {
                let item_count = r.read_u16()? as usize;
                let mut items = Vec::with_capacity(item_count);
                for _ in 0..item_count {
                    let alias = r.read_str()?;
                    let expression = self.decode_expr(r)?;
                    items.push(ProjectItem::new(expression, alias));
                }
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 1, "Project")?;
                ProjectNode::new(&self.plan, inputs.remove(0), items)?.into_enum()
            }
            node_tag::JOIN => {
                let join_kind = match r.read_u8()? {
                    0 => JoinKind::Inner,
                    1 => JoinKind::Left,
                    2 => JoinKind::Full,
                    other => {
                        return Err(CodecError::InvalidData(format!(
                            "unknown join kind {}",
                            other
                        )))
                    }
                };
                let condition = self.decode_expr(r)?;
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 2, "Join")?;
                let right = inputs.remove(1);
                let left = inputs.remove(0);
                JoinNode::new(&self.plan, left, right, join_kind, condition)?.into_enum()
            }
            node_tag::AGGREGATE => {
                let key_count = r.read_u16()? as usize;
                let mut group_keys = Vec::with_capacity(key_count);
                for _ in 0..key_count {
                    group_keys.push(r.read_u32()? as usize);
                }
                let call_count = r.read_u16()? as usize;
                let mut calls = Vec::with_capacity(call_count);
                for _ in 0..call_count {
                    let function = match r.read_u8()? {
                        0 => AggregateFunction::Count,
                        1 => AggregateFunction::Sum,
                        2 => AggregateFunction::Min,
                        3 => AggregateFunction::Max,
                        4 => AggregateFunction::Avg,
                        other => {
                            return Err(CodecError::InvalidData(format!(
                                "unknown aggregate function {}",
                                other
                            )))
                        }
                    };
                    let argument = if r.read_bool()? {
                        Some(r.read_u32()? as usize)
                    } else {
                        None
                    };
                    let distinct = r.read_bool()?;
                    let alias = r.read_str()?;
                    calls.push(AggregateCall::new(function, argument, distinct, alias));
                }
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 1, "Aggregate")?;
                AggregateNode::new(&self.plan, inputs.remove(0), group_keys, calls)?.into_enum()
            }
            node_tag::SORT => {
                let key_count = r.read_u16()? as usize;
                let mut keys = Vec::with_capacity(key_count);
                for _ in 0..key_count {
                    let index = r.read_u32()? as usize;
                    let descending = r.read_bool()?;
                    keys.push(SortKey { index, descending });
                }
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 1, "Sort")?;
                SortNode::new(&self.plan, inputs.remove(0), keys)?.into_enum()
            }
            node_tag::LIMIT => {
                let offset = r.read_u64()?;
                let count = r.read_u64()?;
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 1, "Limit")?;
                LimitNode::new(&self.plan, inputs.remove(0), offset, count)?.into_enum()
            }
            node_tag::UNION => {
                let all = r.read_bool()?;
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 2, "Union")?;
                let right = inputs.remove(1);
                let left = inputs.remove(0);
                UnionNode::new(&self.plan, left, right, all)?.into_enum()
            }
            node_tag::TABLE_MODIFY => {
                let table = self.decode_table(r)?;
                let operation = match r.read_u8()? {
                    0 => ModifyOperation::Insert,
                    1 => ModifyOperation::Update,
                    2 => ModifyOperation::Delete,
                    other => {
                        return Err(CodecError::InvalidData(format!(
                            "unknown modify operation {}",
                            other
                        )))
                    }
                };
                let column_count = r.read_u16()? as usize;
                let mut update_columns = Vec::with_capacity(column_count);
                for _ in 0..column_count {
                    update_columns.push(r.read_str()?);
                }
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 1, "TableModify")?;
                TableModifyNode::new(
                    &self.plan,
                    inputs.remove(0),
                    table,
                    operation,
                    update_columns,
                )?
                .into_enum()
            }
            node_tag::PROVIDER => {
                let table = self.decode_table(r)?;
                let row_count = r.read_u32()? as usize;
                let mut rows = Vec::with_capacity(row_count);
                for _ in 0..row_count {
                    let width = r.read_u16()? as usize;
                    let mut row = Vec::with_capacity(width);
                    for _ in 0..width {
                        row.push(self.decode_value(r)?);
                    }
                    rows.push(row);
                }
                let inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 0, "Provider")?;
                ProviderNode::new(&self.plan, table, rows)?.into_enum()
            }
            node_tag::CONDITIONAL_TABLE_MODIFY => {
                let mut inputs = self.decode_inputs(r)?;
                Self::expect_arity(&inputs, 3, "ConditionalTableModify")?;
                let prepared = inputs.remove(2);
                let query = inputs.remove(1);
                let modify = inputs.remove(0);
                ConditionalTableModifyNode::new(&self.plan, modify, query, prepared)?.into_enum()
            }
            node_tag::EXTENSION => {
                let kind = r.read_str()?;
                let payload = r.read_bytes()?;
                let inputs = self.decode_inputs(r)?;
                let rebuild = self.rebuild.ok_or_else(|| {
                    CodecError::Configuration(format!(
                        "extension `{}` requires a rebuild context",
                        kind
                    ))
                })?;
                rebuild.rebuild_extension(&kind, &payload, inputs)?
            }
            other => return Err(CodecError::UnsupportedKind(other)),
        };

        let mut node = node;
        for marker in markers {
            node = node.with_marker(&marker);
        }
        Ok(node)
    }

    fn decode_markers(&self, r: &mut EnvelopeReader<'_>) -> Result<Vec<String>, CodecError> {
        let count = r.read_u16()? as usize;
        let mut markers = Vec::with_capacity(count);
        for _ in 0..count {
            markers.push(r.read_str()?);
        }
        Ok(markers)
    }

    fn decode_inputs(&self, r: &mut EnvelopeReader<'_>) -> Result<Vec<OperatorNode>, CodecError> {
        let count = r.read_u8()? as usize;
        let mut inputs = Vec::with_capacity(count);
        for _ in 0..count {
            inputs.push(self.decode_node(r)?);
        }
        Ok(inputs)
    }

    fn expect_arity(
        inputs: &[OperatorNode],
        expected: usize,
        kind: &str,
    ) -> Result<(), CodecError> {
        if inputs.len() != expected {
            return Err(CodecError::InvalidData(format!(
                "{} envelope declares {} inputs, expected {}",
                kind,
                inputs.len(),
                expected
            )));
        }
        Ok(())
    }

    fn decode_table(&self, r: &mut EnvelopeReader<'_>) -> Result<TableHandle, CodecError> {
        let namespace = r.read_str()?;
        let name = r.read_str()?;
        let snapshot = self.decode_schema(r)?;
        match self.rebuild {
            Some(rebuild) => rebuild.resolve_table(&namespace, &name),
            None => Ok(TableHandle::new(namespace, name, snapshot)),
        }
    }

    fn decode_schema(&self, r: &mut EnvelopeReader<'_>) -> Result<Schema, CodecError> {
        let count = r.read_u16()? as usize;
        let mut columns = Vec::with_capacity(count);
        for _ in 0..count {
            let name = r.read_str()?;
            let data_type = self.decode_type(r)?;
            let nullable = r.read_bool()?;
            columns.push(ColumnDef::new(name, data_type, nullable));
        }
        Ok(Schema::new(columns))
    }

    fn decode_type(&self, r: &mut EnvelopeReader<'_>) -> Result<DataType, CodecError> {
        match r.read_u8()? {
            type_tag::NULL => Ok(DataType::Null),
            type_tag::BOOL => Ok(DataType::Bool),
            type_tag::INT => Ok(DataType::Int),
            type_tag::FLOAT => Ok(DataType::Float),
            type_tag::STRING => Ok(DataType::String),
            type_tag::LIST => Ok(DataType::List),
            type_tag::ANY => Ok(DataType::Any),
            other => Err(CodecError::InvalidData(format!(
                "unknown data type tag {:#04x}",
                other
            ))),
        }
    }

    fn decode_value(&self, r: &mut EnvelopeReader<'_>) -> Result<Value, CodecError> {
        match r.read_u8()? {
            value_tag::NULL => Ok(Value::Null),
            value_tag::BOOL => Ok(Value::Bool(r.read_bool()?)),
            value_tag::INT => Ok(Value::Int(r.read_i64()?)),
            value_tag::FLOAT => Ok(Value::Float(r.read_f64()?)),
            value_tag::STRING => Ok(Value::String(r.read_str()?)),
            value_tag::LIST => {
                let count = r.read_u16()? as usize;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.decode_value(r)?);
                }
                Ok(Value::List(items))
            }
            other => Err(CodecError::InvalidData(format!(
                "unknown value tag {:#04x}",
                other
            ))),
        }
    }

    fn decode_operator(&self, r: &mut EnvelopeReader<'_>) -> Result<ScalarOperator, CodecError> {
        let name = r.read_str()?;
        let arity = match r.read_u8()? {
            0 => OperandArity::Fixed(r.read_u32()? as usize),
            1 => OperandArity::Variadic {
                min: r.read_u32()? as usize,
            },
            other => {
                return Err(CodecError::InvalidData(format!(
                    "unknown arity tag {}",
                    other
                )))
            }
        };
        let return_rule = match r.read_u8()? {
            0 => ReturnTypeRule::Boolean,
            1 => ReturnTypeRule::Fixed(self.decode_type(r)?),
            2 => ReturnTypeRule::SameAsOperand(r.read_u32()? as usize),
            other => {
                return Err(CodecError::InvalidData(format!(
                    "unknown return rule tag {}",
                    other
                )))
            }
        };
        Ok(ScalarOperator::new(name, arity, return_rule))
    }

    fn decode_expr(&self, r: &mut EnvelopeReader<'_>) -> Result<ScalarExpression, CodecError> {
        match r.read_u8()? {
            expr_tag::LITERAL => Ok(ScalarExpression::literal(self.decode_value(r)?)),
            expr_tag::INPUT_REF => {
                let index = r.read_u32()? as usize;
                let data_type = self.decode_type(r)?;
                let nullable = r.read_bool()?;
                Ok(ScalarExpression::input_ref(index, data_type, nullable))
            }
            expr_tag::CALL => {
                let op = self.decode_operator(r)?;
                let operand_count = r.read_u16()? as usize;
                let mut operands = Vec::with_capacity(operand_count);
                for _ in 0..operand_count {
                    operands.push(self.decode_expr(r)?);
                }
                Ok(ScalarExpression::call(op, operands)?)
            }
            expr_tag::SUBQUERY => self.decode_subquery(r),
            other => Err(CodecError::UnsupportedKind(other)),
        }
    }

    fn decode_subquery(&self, r: &mut EnvelopeReader<'_>) -> Result<ScalarExpression, CodecError> {
        if self.rebuild.is_none() {
            return Err(CodecError::Configuration(
                "envelope embeds a subquery subtree but no rebuild context was supplied"
                    .to_string(),
            ));
        }
        let variant = r.read_u8()?;
        let comparison = if variant == 1 {
            Some(self.decode_operator(r)?)
        } else {
            None
        };
        let operand_count = r.read_u16()? as usize;
        let mut operands = Vec::with_capacity(operand_count);
        for _ in 0..operand_count {
            operands.push(self.decode_expr(r)?);
        }
        let subtree = self.decode_node(r)?;

        let expr = match variant {
            0 => SubqueryExpression::in_query(subtree, operands)?,
            1 => {
                // 编码侧保证 SOME 一定带比较操作符
                let comparison = comparison.ok_or_else(|| {
                    CodecError::InvalidData("SOME subquery without comparison".to_string())
                })?;
                SubqueryExpression::some_query(subtree, operands, comparison)?
            }
            2 => SubqueryExpression::exists(subtree)?,
            3 => SubqueryExpression::scalar(subtree)?,
            other => {
                return Err(CodecError::InvalidData(format!(
                    "unknown subquery variant {}",
                    other
                )))
            }
        };
        Ok(expr)
    }
}
