//! 表达式与子查询集成测试
//!
//! 测试范围:
//! - 调用表达式的签名校验
//! - 子查询四种变体的元数 / 列数 / 可空性契约
//! - 子查询摘要的结构等价性

mod common;

use common::*;
use planalg::core::{ColumnDef, DataType, ExpressionError, PlanContext, Schema, Value};
use planalg::expr::{ScalarExpression, SubqueryExpression, SubqueryVariant};

fn outer_schema() -> Schema {
    Schema::new(vec![
        ColumnDef::new("id", DataType::Int, false),
        ColumnDef::new("name", DataType::String, true),
    ])
}

// ==================== 调用表达式 ====================

#[test]
fn test_call_operand_count_mismatch() {
    let ctx = PlanContext::new();
    let not = ctx.operators().lookup("NOT").unwrap().clone();
    let err = ScalarExpression::call(
        not,
        vec![
            ScalarExpression::literal(Value::Bool(true)),
            ScalarExpression::literal(Value::Bool(false)),
        ],
    );
    assert!(matches!(err, Err(ExpressionError::MalformedPattern(_))));
}

#[test]
fn test_unknown_operator() {
    let ctx = PlanContext::new();
    assert!(matches!(
        ctx.operators().lookup("BOGUS"),
        Err(ExpressionError::UnknownOperator(_))
    ));
}

// ==================== 子查询构造契约 ====================

#[test]
fn test_in_subquery_operand_count_must_match_columns() {
    let ctx = PlanContext::new();

    // users 子树输出两列，单操作数应失败
    let err = SubqueryExpression::in_query(
        scan_users(&ctx),
        vec![ScalarExpression::input_ref(0, DataType::Int, false)],
    );
    assert!(matches!(err, Err(ExpressionError::MalformedPattern(_))));

    // 两个操作数匹配两列
    let ok = SubqueryExpression::in_query(
        scan_users(&ctx),
        vec![
            ScalarExpression::input_ref(0, DataType::Int, false),
            ScalarExpression::input_ref(1, DataType::String, true),
        ],
    );
    assert!(ok.is_ok());
}

#[test]
fn test_scalar_subquery_requires_single_column() {
    let ctx = PlanContext::new();

    let err = SubqueryExpression::scalar(scan_users(&ctx));
    assert!(matches!(err, Err(ExpressionError::MalformedPattern(_))));

    let single = project_column(&ctx, scan_users(&ctx), 0, DataType::Int, false, "id");
    let ok = SubqueryExpression::scalar(single);
    assert!(ok.is_ok());
}

#[test]
fn test_some_subquery_requires_comparison() {
    let ctx = PlanContext::new();
    let single = project_column(&ctx, scan_users(&ctx), 0, DataType::Int, false, "id");
    let operand = vec![ScalarExpression::input_ref(0, DataType::Int, false)];

    let and = ctx.operators().lookup("AND").unwrap().clone();
    let err = SubqueryExpression::some_query(single, operand.clone(), and);
    assert!(matches!(err, Err(ExpressionError::MalformedPattern(_))));

    let gt = ctx.operators().lookup(">").unwrap().clone();
    let single = project_column(&ctx, scan_users(&ctx), 0, DataType::Int, false, "id");
    let ok = SubqueryExpression::some_query(single, operand, gt);
    assert!(ok.is_ok());
}

// ==================== 结果类型与可空性 ====================

#[test]
fn test_exists_is_boolean_never_nullable() {
    let ctx = PlanContext::new();
    let exists = SubqueryExpression::exists(scan_users(&ctx)).unwrap();
    let schema = outer_schema();
    assert_eq!(exists.result_type(&schema).unwrap(), DataType::Bool);
    assert!(!exists.nullable(&schema).unwrap());
}

#[test]
fn test_scalar_subquery_forced_nullable() {
    let ctx = PlanContext::new();
    // 子树列本身不可空，结果仍然强制可空
    let single = project_column(&ctx, scan_users(&ctx), 0, DataType::Int, false, "id");
    let scalar = SubqueryExpression::scalar(single).unwrap();
    let schema = outer_schema();
    assert_eq!(scalar.result_type(&schema).unwrap(), DataType::Int);
    assert!(scalar.nullable(&schema).unwrap());
}

#[test]
fn test_in_subquery_nullability_from_subtree_columns() {
    let ctx = PlanContext::new();
    let schema = outer_schema();

    // name 列可空，使整个 IN 可空
    let in_expr = SubqueryExpression::in_query(
        scan_users(&ctx),
        vec![
            ScalarExpression::literal(Value::Int(1)),
            ScalarExpression::literal(Value::String("x".to_string())),
        ],
    )
    .unwrap();
    assert!(in_expr.nullable(&schema).unwrap());

    // 单列不可空子树 + 不可空操作数 → 不可空
    let single = project_column(&ctx, scan_users(&ctx), 0, DataType::Int, false, "id");
    let in_expr = SubqueryExpression::in_query(
        single,
        vec![ScalarExpression::literal(Value::Int(1))],
    )
    .unwrap();
    assert!(!in_expr.nullable(&schema).unwrap());
    assert_eq!(in_expr.result_type(&schema).unwrap(), DataType::Bool);
}

// ==================== 摘要 ====================

#[test]
fn test_subquery_digest_equal_for_distinct_subtree_instances() {
    let ctx_a = PlanContext::new();
    let ctx_b = PlanContext::new();

    let a = SubqueryExpression::exists(scan_users(&ctx_a)).unwrap();
    let b = SubqueryExpression::exists(scan_users(&ctx_b)).unwrap();
    assert_eq!(a.digest(), b.digest());
    assert!(a.digest().starts_with("EXISTS("));
    assert!(a.digest().contains("query={Scan(table=store.users"));
}

#[test]
fn test_some_digest_includes_comparison() {
    let ctx = PlanContext::new();
    let gt = ctx.operators().lookup(">").unwrap().clone();
    let single = project_column(&ctx, scan_users(&ctx), 0, DataType::Int, false, "id");
    let some = SubqueryExpression::some_query(
        single,
        vec![ScalarExpression::input_ref(0, DataType::Int, false)],
        gt,
    )
    .unwrap();
    let digest = some.digest();
    assert!(digest.starts_with("SOME(op=>,"));

    let sub = some.as_subquery().unwrap();
    assert_eq!(sub.variant(), SubqueryVariant::Some);
    assert_eq!(sub.operands().len(), 1);
}
