//! 聚合节点实现
//!
//! AggregateNode 按分组键分组并求值聚合调用，输出列先是分组列，
//! 然后按声明顺序是各聚合调用的结果列。

use std::fmt;

use crate::core::context::PlanContext;
use crate::core::error::PlanError;
use crate::core::types::{ColumnDef, DataType, Schema};
use crate::define_operator_node;

/// 聚合函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Avg => "AVG",
        }
    }

    /// COUNT 可以无参数（行计数），其余函数必须有参数列
    pub fn requires_argument(&self) -> bool {
        !matches!(self, AggregateFunction::Count)
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 聚合调用：函数、参数列序号、去重标记与输出别名
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    pub function: AggregateFunction,
    pub argument: Option<usize>,
    pub distinct: bool,
    pub alias: String,
}

impl AggregateCall {
    pub fn new(
        function: AggregateFunction,
        argument: Option<usize>,
        distinct: bool,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            function,
            argument,
            distinct,
            alias: alias.into(),
        }
    }
}

define_operator_node! {
    /// 聚合节点
    pub struct AggregateNode [kind = Aggregate, arity = 1] {
        group_keys: Vec<usize>,
        calls: Vec<AggregateCall>,
    }
}

impl AggregateNode {
    pub fn new(
        ctx: &PlanContext,
        input: crate::plan::node::OperatorNode,
        group_keys: Vec<usize>,
        calls: Vec<AggregateCall>,
    ) -> Result<Self, PlanError> {
        for call in &calls {
            if call.function.requires_argument() && call.argument.is_none() {
                return Err(PlanError::MalformedPattern(format!(
                    "{} requires an argument column",
                    call.function
                )));
            }
        }
        Ok(Self::assemble(
            ctx.next_node_id(),
            vec![input],
            group_keys,
            calls,
        ))
    }

    pub fn group_keys(&self) -> &[usize] {
        &self.group_keys
    }

    pub fn calls(&self) -> &[AggregateCall] {
        &self.calls
    }

    fn params_digest(&self) -> String {
        let keys: Vec<String> = self.group_keys.iter().map(|k| k.to_string()).collect();
        let calls: Vec<String> = self
            .calls
            .iter()
            .map(|call| {
                let arg = call
                    .argument
                    .map(|i| format!("${}", i))
                    .unwrap_or_default();
                let distinct = if call.distinct { "DISTINCT " } else { "" };
                format!("{}({}{}):{}", call.function, distinct, arg, call.alias)
            })
            .collect();
        format!("group=[{}], calls=[{}]", keys.join(","), calls.join(", "))
    }

    fn derive_schema(&self) -> Result<Schema, PlanError> {
        let input_schema = self.input(0)?.output_schema()?;
        let mut columns = Vec::with_capacity(self.group_keys.len() + self.calls.len());

        for &key in &self.group_keys {
            let column = input_schema.column(key).ok_or_else(|| {
                PlanError::SchemaDerivation(format!(
                    "group key {} out of range for schema {}",
                    key, input_schema
                ))
            })?;
            columns.push(column.clone());
        }

        for call in &self.calls {
            let argument_type = match call.argument {
                Some(index) => Some(
                    input_schema
                        .column(index)
                        .ok_or_else(|| {
                            PlanError::SchemaDerivation(format!(
                                "aggregate argument {} out of range for schema {}",
                                index, input_schema
                            ))
                        })?
                        .data_type,
                ),
                None => None,
            };
            let column = match call.function {
                AggregateFunction::Count => ColumnDef::new(call.alias.clone(), DataType::Int, false),
                AggregateFunction::Avg => ColumnDef::new(call.alias.clone(), DataType::Float, true),
                AggregateFunction::Sum | AggregateFunction::Min | AggregateFunction::Max => {
                    // new 中已校验参数存在
                    let data_type = argument_type.unwrap_or(DataType::Null);
                    ColumnDef::new(call.alias.clone(), data_type, true)
                }
            };
            columns.push(column);
        }

        Ok(Schema::new(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::TableHandle;
    use crate::plan::node::OperatorNode;

    fn scan(ctx: &PlanContext) -> OperatorNode {
        let handle = TableHandle::new(
            "store",
            "orders",
            Schema::new(vec![
                ColumnDef::new("customer", DataType::Int, false),
                ColumnDef::new("amount", DataType::Float, true),
            ]),
        );
        crate::plan::nodes::scan::ScanNode::new(ctx, handle)
            .unwrap()
            .into_enum()
    }

    #[test]
    fn test_aggregate_schema_order() {
        let ctx = PlanContext::new();
        let agg = AggregateNode::new(
            &ctx,
            scan(&ctx),
            vec![0],
            vec![
                AggregateCall::new(AggregateFunction::Count, None, false, "cnt"),
                AggregateCall::new(AggregateFunction::Sum, Some(1), false, "total"),
            ],
        )
        .unwrap();
        let schema = agg.output_schema().unwrap();
        assert_eq!(schema.column(0).unwrap().name, "customer");
        assert_eq!(schema.column(1).unwrap().data_type, DataType::Int);
        assert!(!schema.column(1).unwrap().nullable);
        assert_eq!(schema.column(2).unwrap().data_type, DataType::Float);
        assert!(schema.column(2).unwrap().nullable);
    }

    #[test]
    fn test_sum_without_argument_rejected() {
        let ctx = PlanContext::new();
        let err = AggregateNode::new(
            &ctx,
            scan(&ctx),
            vec![],
            vec![AggregateCall::new(AggregateFunction::Sum, None, false, "s")],
        );
        assert!(matches!(err, Err(PlanError::MalformedPattern(_))));
    }

    #[test]
    fn test_group_key_out_of_range() {
        let ctx = PlanContext::new();
        let agg = AggregateNode::new(
            &ctx,
            scan(&ctx),
            vec![9],
            vec![AggregateCall::new(AggregateFunction::Count, None, false, "c")],
        )
        .unwrap();
        assert!(matches!(
            agg.output_schema(),
            Err(PlanError::SchemaDerivation(_))
        ));
    }
}
