//! 统一错误处理系统
//!
//! 分层设计：每个子系统（计划树、表达式、重写、编解码）拥有独立的
//! 错误枚举，再通过 `#[from]` 汇聚到统一的 `AlgebraError`。
//! 结构性不变量在构造时立即检查，任何结构非法的节点都无法被创建。

use thiserror::Error;

/// 计划树错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    /// 输入序号越界
    #[error("input ordinal {index} out of range for {kind} (arity {arity})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        arity: usize,
    },

    /// 构造时的数量不匹配（操作数、元组宽度等）
    #[error("malformed pattern: {0}")]
    MalformedPattern(String),

    /// 非法状态（如空的已解析行集）
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// 模式推导失败
    #[error("schema derivation failed: {0}")]
    SchemaDerivation(String),
}

/// 表达式错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    /// 操作数数量与操作符签名不匹配
    #[error("malformed pattern: {0}")]
    MalformedPattern(String),

    /// 未注册的操作符
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// 类型不匹配或引用越界
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// 重写引擎错误
#[derive(Debug, Error)]
pub enum RewriteError {
    /// 规则应用失败
    #[error("rule {rule} failed: {reason}")]
    RuleApplication { rule: &'static str, reason: String },

    /// 重写配置非法
    #[error("invalid rewrite config: {0}")]
    Configuration(String),

    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),
}

/// 编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    /// 信封数据在声明的字段读完之前就结束了
    #[error("truncated envelope: {0}")]
    TruncatedEnvelope(String),

    /// 未识别的种类标签，显式拒绝而不是猜测
    #[error("unsupported kind tag: {0:#04x}")]
    UnsupportedKind(u8),

    /// 目录引用无法重新解析
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),

    /// 缺少重建上下文等配置问题
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 信封格式版本不匹配
    #[error("format version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// 信封内容非法
    #[error("invalid envelope: {0}")]
    InvalidData(String),

    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),
}

/// 统一的代数层错误类型
#[derive(Debug, Error)]
pub enum AlgebraError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    #[error("rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// 统一的结果类型
pub type AlgebraResult<T> = Result<T, AlgebraError>;
