//! 计划树模块集成测试
//!
//! 测试范围:
//! - 输入替换与缓存失效
//! - 摘要的结构等价语义
//! - 条件写节点族（Provider / ConditionalTableModify）
//! - 遍历与标记

mod common;

use common::*;
use planalg::core::{
    ColumnDef, DataType, PlanContext, PlanError, Schema, TableHandle, Value,
};
use planalg::plan::{
    describe, dump, ConditionalTableModifyNode, InputVisitor, ModifyOperation, OperatorNode,
    ProviderNode, TableModifyNode,
};

fn kv_handle() -> TableHandle {
    TableHandle::new(
        "store",
        "kv",
        Schema::new(vec![
            ColumnDef::new("id", DataType::Int, false),
            ColumnDef::new("val", DataType::String, true),
        ]),
    )
}

// ==================== 输入替换 ====================

#[test]
fn test_replace_input_updates_child() {
    let ctx = PlanContext::new();
    let mut node = filter(&ctx, scan_users(&ctx), gt_condition(&ctx, 0, 10));

    let replacement = scan_orders(&ctx);
    let replacement_digest = replacement.digest();
    let old = node.replace_input(0, replacement).unwrap();

    assert_eq!(old.kind_name(), "Scan");
    assert_eq!(node.input(0).unwrap().digest(), replacement_digest);
}

#[test]
fn test_replace_input_out_of_range() {
    let ctx = PlanContext::new();
    let mut node = filter(&ctx, scan_users(&ctx), gt_condition(&ctx, 0, 10));
    assert!(matches!(
        node.replace_input(1, scan_users(&ctx)),
        Err(PlanError::IndexOutOfRange { index: 1, .. })
    ));
    assert!(node.input(1).is_err());
}

#[test]
fn test_digest_changes_iff_child_digest_changes() {
    let ctx = PlanContext::new();
    let mut node = filter(&ctx, scan_users(&ctx), gt_condition(&ctx, 0, 10));
    let before = node.digest();

    // 结构相同的新孩子：摘要不变
    node.replace_input(0, scan_users(&ctx)).unwrap();
    assert_eq!(node.digest(), before);

    // 结构不同的孩子：摘要改变
    node.replace_input(0, scan_orders(&ctx)).unwrap();
    assert_ne!(node.digest(), before);
}

#[test]
fn test_replace_input_invalidates_schema() {
    let ctx = PlanContext::new();
    let eq = ctx.operators().lookup("=").unwrap().clone();
    let condition = planalg::expr::ScalarExpression::call(
        eq,
        vec![
            planalg::expr::ScalarExpression::input_ref(0, DataType::Int, false),
            planalg::expr::ScalarExpression::literal(Value::Int(1)),
        ],
    )
    .unwrap();
    let mut node = filter(&ctx, scan_users(&ctx), condition);
    assert_eq!(node.output_schema().unwrap().column_count(), 2);

    node.replace_input(0, scan_orders(&ctx)).unwrap();
    // orders 也有两列且 0 号列是 Int，模式重新推导成功
    let schema = node.output_schema().unwrap();
    assert_eq!(schema.column(0).unwrap().name, "user_id");
}

// ==================== 摘要语义 ====================

#[test]
fn test_digest_is_structural_equality_key() {
    let ctx_a = PlanContext::new();
    let ctx_b = PlanContext::new();
    let a = filter(&ctx_a, scan_users(&ctx_a), gt_condition(&ctx_a, 0, 10));
    let b = filter(&ctx_b, scan_users(&ctx_b), gt_condition(&ctx_b, 0, 10));

    assert_eq!(a.digest(), b.digest());
    assert_eq!(a, b);
}

#[test]
fn test_digest_reflects_parameters() {
    let ctx = PlanContext::new();
    let a = filter(&ctx, scan_users(&ctx), gt_condition(&ctx, 0, 10));
    let b = filter(&ctx, scan_users(&ctx), gt_condition(&ctx, 0, 11));
    assert_ne!(a.digest(), b.digest());
}

#[test]
fn test_marker_is_digest_visible() {
    let ctx = PlanContext::new();
    let plain = scan_users(&ctx);
    let marked = scan_users(&ctx).with_marker("SomeRule");

    assert_ne!(plain.digest(), marked.digest());
    assert!(marked.has_marker("SomeRule"));
    assert!(marked.digest().contains("markers=[SomeRule]"));
}

// ==================== 条件写节点族 ====================

#[test]
fn test_provider_condition_and_values() {
    let ctx = PlanContext::new();
    let provider = ProviderNode::new(
        &ctx,
        kv_handle(),
        vec![
            vec![Value::Int(1), Value::String("a".to_string())],
            vec![Value::Int(2), Value::String("b".to_string())],
        ],
    )
    .unwrap();

    let condition = provider.enumerable_condition(ctx.operators()).unwrap();
    assert_eq!(condition.digest(), "OR(=($0, 1), =($0, 2))");
    assert_eq!(
        provider.update_values(),
        vec![
            Value::String("a".to_string()),
            Value::String("b".to_string())
        ]
    );
}

#[test]
fn test_provider_empty_row_set_is_illegal() {
    let ctx = PlanContext::new();
    assert!(matches!(
        ProviderNode::new(&ctx, kv_handle(), Vec::new()),
        Err(PlanError::IllegalState(_))
    ));
}

#[test]
fn test_conditional_table_modify_contract() {
    let ctx = PlanContext::new();
    let modify = TableModifyNode::new(
        &ctx,
        scan(&ctx, kv_handle()),
        kv_handle(),
        ModifyOperation::Update,
        vec!["val".to_string()],
    )
    .unwrap()
    .into_enum();
    let query = scan(&ctx, kv_handle());
    let prepared = TableModifyNode::new(
        &ctx,
        scan(&ctx, kv_handle()),
        kv_handle(),
        ModifyOperation::Delete,
        Vec::new(),
    )
    .unwrap()
    .into_enum();

    let mut node = ConditionalTableModifyNode::new(&ctx, modify, query, prepared)
        .unwrap()
        .into_enum();

    assert_eq!(node.arity(), 3);
    assert_eq!(node.input(0).unwrap().kind_name(), "TableModify");
    assert_eq!(node.input(1).unwrap().kind_name(), "Scan");
    assert_eq!(node.input(2).unwrap().kind_name(), "TableModify");

    // 标准输入替换契约对条件写节点同样适用
    assert!(matches!(
        node.replace_input(3, scan(&ctx, kv_handle())),
        Err(PlanError::IndexOutOfRange { index: 3, arity: 3, .. })
    ));
    node.replace_input(1, scan(&ctx, kv_handle())).unwrap();
    assert_eq!(node.input(1).unwrap().kind_name(), "Scan");

    // 输出模式 = 首次修改尝试的模式
    assert_eq!(
        node.output_schema().unwrap().column(0).unwrap().name,
        "ROWCOUNT"
    );
}

// ==================== 遍历与描述 ====================

#[test]
fn test_input_visitor_ordinals() {
    struct Collect(Vec<(usize, String)>);
    impl InputVisitor for Collect {
        fn visit_input(&mut self, ordinal: usize, input: &OperatorNode) -> bool {
            self.0.push((ordinal, input.kind_name().to_string()));
            true
        }
    }

    let ctx = PlanContext::new();
    let join = users_join_orders(&ctx);
    let mut collect = Collect(Vec::new());
    join.visit_inputs(&mut collect);

    assert_eq!(collect.0.len(), 2);
    assert_eq!(collect.0[0].0, 0);
    assert_eq!(collect.0[1].0, 1);
}

#[test]
fn test_node_count_and_dump() {
    let ctx = PlanContext::new();
    let tree = filter(&ctx, users_join_orders(&ctx), gt_condition(&ctx, 0, 1));
    assert_eq!(tree.node_count(), 4);

    let text = dump(&tree);
    assert_eq!(text.lines().count(), 4);
    assert!(text.lines().next().unwrap().contains("Filter"));
}

#[test]
fn test_describe_to_json() {
    let ctx = PlanContext::new();
    let tree = filter(&ctx, scan_users(&ctx), gt_condition(&ctx, 0, 10));
    let json = describe(&tree).to_json().unwrap();
    assert!(json.contains("Filter"));
    assert!(json.contains("store.users"));
}
