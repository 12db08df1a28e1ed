//! 核心类型系统模块
//!
//! 包含代数层的基础类型定义：值类型、数据类型与模式、
//! 标量操作符注册表、会话上下文以及统一错误类型。

pub mod context;
pub mod error;
pub mod registry;
pub mod types;
pub mod value;

pub use context::{NodeIdGenerator, PlanContext, TableHandle};
pub use error::{
    AlgebraError, AlgebraResult, CodecError, ExpressionError, PlanError, RewriteError,
};
pub use registry::{OperandArity, OperatorRegistry, ReturnTypeRule, ScalarOperator};
pub use types::{ColumnDef, DataType, Schema};
pub use value::Value;
