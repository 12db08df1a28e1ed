//! 计划编码器
//!
//! 把算子节点树递归编码为自描述信封。编码是纯函数：
//! 不读取任何共享状态，节点 ID 不进入信封（它不是结构的一部分）。

use crate::codec::buffer::EnvelopeWriter;
use crate::codec::tags::{
    expr_tag, node_tag, type_tag, value_tag, ENVELOPE_MAGIC, FORMAT_VERSION,
};
use crate::core::context::TableHandle;
use crate::core::registry::{OperandArity, ReturnTypeRule, ScalarOperator};
use crate::core::types::{DataType, Schema};
use crate::core::value::Value;
use crate::expr::expression::ScalarExpression;
use crate::expr::subquery::{SubqueryExpression, SubqueryVariant};
use crate::plan::node::OperatorNode;
use crate::plan::nodes::aggregate::AggregateFunction;
use crate::plan::nodes::join::JoinKind;
use crate::plan::nodes::modify::ModifyOperation;

/// 计划编码器
#[derive(Debug)]
pub struct PlanEncoder;

impl PlanEncoder {
    /// 编码一棵算子节点树为信封字节串
    pub fn encode(node: &OperatorNode) -> Vec<u8> {
        let mut writer = EnvelopeWriter::new();
        for byte in ENVELOPE_MAGIC {
            writer.write_u8(byte);
        }
        writer.write_u8(FORMAT_VERSION);
        Self::encode_node(&mut writer, node);
        writer.into_bytes()
    }

    fn encode_node(w: &mut EnvelopeWriter, node: &OperatorNode) {
        match node {
            OperatorNode::Scan(scan) => {
                w.write_u8(node_tag::SCAN);
                Self::encode_markers(w, node);
                Self::encode_table(w, scan.table());
            }
            OperatorNode::Values(values) => {
                w.write_u8(node_tag::VALUES);
                Self::encode_markers(w, node);
                Self::encode_schema(w, values.declared_schema());
                w.write_u32(values.tuples().len() as u32);
                for tuple in values.tuples() {
                    w.write_u16(tuple.len() as u16);
                    for value in tuple {
                        Self::encode_value(w, value);
                    }
                }
            }
            OperatorNode::Filter(filter) => {
                w.write_u8(node_tag::FILTER);
                Self::encode_markers(w, node);
                Self::encode_expr(w, filter.condition());
            }
            OperatorNode::Project(project) => {
                w.write_u8(node_tag::PROJECT);
                Self::encode_markers(w, node);
                w.write_u16(project.items().len() as u16);
                for item in project.items() {
                    w.write_str(&item.alias);
                    Self::encode_expr(w, &item.expression);
                }
            }
            OperatorNode::Join(join) => {
                w.write_u8(node_tag::JOIN);
                Self::encode_markers(w, node);
                w.write_u8(match join.join_kind() {
                    JoinKind::Inner => 0,
                    JoinKind::Left => 1,
                    JoinKind::Full => 2,
                });
                Self::encode_expr(w, join.condition());
            }
            OperatorNode::Aggregate(aggregate) => {
                w.write_u8(node_tag::AGGREGATE);
                Self::encode_markers(w, node);
                w.write_u16(aggregate.group_keys().len() as u16);
                for &key in aggregate.group_keys() {
                    w.write_u32(key as u32);
                }
                w.write_u16(aggregate.calls().len() as u16);
                for call in aggregate.calls() {
                    w.write_u8(match call.function {
                        AggregateFunction::Count => 0,
                        AggregateFunction::Sum => 1,
                        AggregateFunction::Min => 2,
                        AggregateFunction::Max => 3,
                        AggregateFunction::Avg => 4,
                    });
                    match call.argument {
                        Some(index) => {
                            w.write_bool(true);
                            w.write_u32(index as u32);
                        }
                        None => w.write_bool(false),
                    }
                    w.write_bool(call.distinct);
                    w.write_str(&call.alias);
                }
            }
            OperatorNode::Sort(sort) => {
                w.write_u8(node_tag::SORT);
                Self::encode_markers(w, node);
                w.write_u16(sort.keys().len() as u16);
                for key in sort.keys() {
                    w.write_u32(key.index as u32);
                    w.write_bool(key.descending);
                }
            }
            OperatorNode::Limit(limit) => {
                w.write_u8(node_tag::LIMIT);
                Self::encode_markers(w, node);
                w.write_u64(limit.offset());
                w.write_u64(limit.count());
            }
            OperatorNode::Union(union) => {
                w.write_u8(node_tag::UNION);
                Self::encode_markers(w, node);
                w.write_bool(union.all());
            }
            OperatorNode::TableModify(modify) => {
                w.write_u8(node_tag::TABLE_MODIFY);
                Self::encode_markers(w, node);
                Self::encode_table(w, modify.table());
                w.write_u8(match modify.operation() {
                    ModifyOperation::Insert => 0,
                    ModifyOperation::Update => 1,
                    ModifyOperation::Delete => 2,
                });
                w.write_u16(modify.update_columns().len() as u16);
                for column in modify.update_columns() {
                    w.write_str(column);
                }
            }
            OperatorNode::Provider(provider) => {
                w.write_u8(node_tag::PROVIDER);
                Self::encode_markers(w, node);
                Self::encode_table(w, provider.table());
                w.write_u32(provider.rows().len() as u32);
                for row in provider.rows() {
                    w.write_u16(row.len() as u16);
                    for value in row {
                        Self::encode_value(w, value);
                    }
                }
            }
            OperatorNode::ConditionalTableModify(_) => {
                w.write_u8(node_tag::CONDITIONAL_TABLE_MODIFY);
                Self::encode_markers(w, node);
            }
            OperatorNode::Extension(extension) => {
                w.write_u8(node_tag::EXTENSION);
                Self::encode_markers(w, node);
                w.write_str(extension.kind_name());
                w.write_bytes(&extension.payload().payload_bytes());
            }
        }

        let inputs = node.inputs();
        w.write_u8(inputs.len() as u8);
        for input in inputs {
            Self::encode_node(w, input);
        }
    }

    fn encode_markers(w: &mut EnvelopeWriter, node: &OperatorNode) {
        let markers = node.markers();
        w.write_u16(markers.len() as u16);
        for marker in markers.iter() {
            w.write_str(marker);
        }
    }

    fn encode_table(w: &mut EnvelopeWriter, table: &TableHandle) {
        w.write_str(table.namespace());
        w.write_str(table.name());
        Self::encode_schema(w, table.schema());
    }

    fn encode_schema(w: &mut EnvelopeWriter, schema: &Schema) {
        w.write_u16(schema.column_count() as u16);
        for column in schema.columns() {
            w.write_str(&column.name);
            Self::encode_type(w, column.data_type);
            w.write_bool(column.nullable);
        }
    }

    fn encode_type(w: &mut EnvelopeWriter, data_type: DataType) {
        w.write_u8(match data_type {
            DataType::Null => type_tag::NULL,
            DataType::Bool => type_tag::BOOL,
            DataType::Int => type_tag::INT,
            DataType::Float => type_tag::FLOAT,
            DataType::String => type_tag::STRING,
            DataType::List => type_tag::LIST,
            DataType::Any => type_tag::ANY,
        });
    }

    fn encode_value(w: &mut EnvelopeWriter, value: &Value) {
        match value {
            Value::Null => w.write_u8(value_tag::NULL),
            Value::Bool(v) => {
                w.write_u8(value_tag::BOOL);
                w.write_bool(*v);
            }
            Value::Int(v) => {
                w.write_u8(value_tag::INT);
                w.write_i64(*v);
            }
            Value::Float(v) => {
                w.write_u8(value_tag::FLOAT);
                w.write_f64(*v);
            }
            Value::String(v) => {
                w.write_u8(value_tag::STRING);
                w.write_str(v);
            }
            Value::List(items) => {
                w.write_u8(value_tag::LIST);
                w.write_u16(items.len() as u16);
                for item in items {
                    Self::encode_value(w, item);
                }
            }
        }
    }

    fn encode_operator(w: &mut EnvelopeWriter, op: &ScalarOperator) {
        w.write_str(op.name());
        match op.arity() {
            OperandArity::Fixed(n) => {
                w.write_u8(0);
                w.write_u32(n as u32);
            }
            OperandArity::Variadic { min } => {
                w.write_u8(1);
                w.write_u32(min as u32);
            }
        }
        match op.return_rule() {
            ReturnTypeRule::Boolean => w.write_u8(0),
            ReturnTypeRule::Fixed(data_type) => {
                w.write_u8(1);
                Self::encode_type(w, data_type);
            }
            ReturnTypeRule::SameAsOperand(i) => {
                w.write_u8(2);
                w.write_u32(i as u32);
            }
        }
    }

    pub(crate) fn encode_expr(w: &mut EnvelopeWriter, expr: &ScalarExpression) {
        match expr {
            ScalarExpression::Literal(value) => {
                w.write_u8(expr_tag::LITERAL);
                Self::encode_value(w, value);
            }
            ScalarExpression::InputRef {
                index,
                data_type,
                nullable,
            } => {
                w.write_u8(expr_tag::INPUT_REF);
                w.write_u32(*index as u32);
                Self::encode_type(w, *data_type);
                w.write_bool(*nullable);
            }
            ScalarExpression::Call(call) => {
                w.write_u8(expr_tag::CALL);
                Self::encode_operator(w, call.op());
                w.write_u16(call.operands().len() as u16);
                for operand in call.operands() {
                    Self::encode_expr(w, operand);
                }
            }
            ScalarExpression::Subquery(sub) => {
                w.write_u8(expr_tag::SUBQUERY);
                Self::encode_subquery(w, sub);
            }
        }
    }

    fn encode_subquery(w: &mut EnvelopeWriter, sub: &SubqueryExpression) {
        w.write_u8(match sub.variant() {
            SubqueryVariant::In => 0,
            SubqueryVariant::Some => 1,
            SubqueryVariant::Exists => 2,
            SubqueryVariant::Scalar => 3,
        });
        if let Some(comparison) = sub.comparison() {
            Self::encode_operator(w, comparison);
        }
        w.write_u16(sub.operands().len() as u16);
        for operand in sub.operands() {
            Self::encode_expr(w, operand);
        }
        Self::encode_node(w, sub.subtree());
    }
}
