//! Codec 模块 - 计划信封编解码
//!
//! 将算子节点 / 标量表达式树（含嵌入的子查询子树）编码为
//! 自描述、带版本号的二进制信封，并从信封重建计划树。
//!
//! ## 信封格式
//!
//! - 头部：4 字节魔数 `PALG` + 1 字节格式版本
//! - 节点：1 字节种类标签 + 规则标记 + 每种类字段 + 递归的输入信封
//! - 表达式与值采用同样的递归标签方案
//!
//! 未识别的种类标签被显式拒绝（`UnsupportedKind`），绝不尽力
//! 解析；数据在声明字段读完前结束报 `TruncatedEnvelope`。
//! `encode`/`decode` 都是纯函数式的：每次调用分配一棵新树，
//! 不共享任何缓存。

pub mod buffer;
pub mod context;
pub mod decoder;
pub mod encoder;
pub mod tags;

pub use buffer::{EnvelopeReader, EnvelopeWriter};
pub use context::{CatalogSnapshot, RebuildContext};
pub use decoder::PlanDecoder;
pub use encoder::PlanEncoder;
