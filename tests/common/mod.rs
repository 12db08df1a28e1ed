//! 集成测试共享构造器

#![allow(dead_code)]

use planalg::core::{ColumnDef, DataType, PlanContext, Schema, TableHandle, Value};
use planalg::expr::ScalarExpression;
use planalg::plan::{
    FilterNode, JoinKind, JoinNode, OperatorNode, ProjectItem, ProjectNode, ScanNode,
};

pub fn users_handle() -> TableHandle {
    TableHandle::new(
        "store",
        "users",
        Schema::new(vec![
            ColumnDef::new("id", DataType::Int, false),
            ColumnDef::new("name", DataType::String, true),
        ]),
    )
}

pub fn orders_handle() -> TableHandle {
    TableHandle::new(
        "store",
        "orders",
        Schema::new(vec![
            ColumnDef::new("user_id", DataType::Int, false),
            ColumnDef::new("amount", DataType::Float, true),
        ]),
    )
}

pub fn scan(ctx: &PlanContext, handle: TableHandle) -> OperatorNode {
    ScanNode::new(ctx, handle).unwrap().into_enum()
}

pub fn scan_users(ctx: &PlanContext) -> OperatorNode {
    scan(ctx, users_handle())
}

pub fn scan_orders(ctx: &PlanContext) -> OperatorNode {
    scan(ctx, orders_handle())
}

/// `$column > literal` 过滤条件
pub fn gt_condition(ctx: &PlanContext, column: usize, value: i64) -> ScalarExpression {
    let gt = ctx.operators().lookup(">").unwrap().clone();
    ScalarExpression::call(
        gt,
        vec![
            ScalarExpression::input_ref(column, DataType::Int, false),
            ScalarExpression::literal(Value::Int(value)),
        ],
    )
    .unwrap()
}

pub fn filter(ctx: &PlanContext, input: OperatorNode, condition: ScalarExpression) -> OperatorNode {
    FilterNode::new(ctx, input, condition).unwrap().into_enum()
}

/// users ⋈ orders on id = user_id
pub fn users_join_orders(ctx: &PlanContext) -> OperatorNode {
    let eq = ctx.operators().lookup("=").unwrap().clone();
    let condition = ScalarExpression::call(
        eq,
        vec![
            ScalarExpression::input_ref(0, DataType::Int, false),
            ScalarExpression::input_ref(2, DataType::Int, false),
        ],
    )
    .unwrap();
    JoinNode::new(
        ctx,
        scan_users(ctx),
        scan_orders(ctx),
        JoinKind::Inner,
        condition,
    )
    .unwrap()
    .into_enum()
}

/// 单列投影 `$index as alias`
pub fn project_column(
    ctx: &PlanContext,
    input: OperatorNode,
    index: usize,
    data_type: DataType,
    nullable: bool,
    alias: &str,
) -> OperatorNode {
    ProjectNode::new(
        ctx,
        input,
        vec![ProjectItem::new(
            ScalarExpression::input_ref(index, data_type, nullable),
            alias,
        )],
    )
    .unwrap()
    .into_enum()
}
