//! 信封标签定义
//!
//! 所有标签都是稳定的线上格式的一部分，只增不改。

/// 信封魔数
pub const ENVELOPE_MAGIC: [u8; 4] = *b"PALG";

/// 当前格式版本
pub const FORMAT_VERSION: u8 = 1;

/// 节点种类标签
pub mod node_tag {
    pub const SCAN: u8 = 0x01;
    pub const VALUES: u8 = 0x02;
    pub const FILTER: u8 = 0x03;
    pub const PROJECT: u8 = 0x04;
    pub const JOIN: u8 = 0x05;
    pub const AGGREGATE: u8 = 0x06;
    pub const SORT: u8 = 0x07;
    pub const LIMIT: u8 = 0x08;
    pub const UNION: u8 = 0x09;
    pub const TABLE_MODIFY: u8 = 0x0a;
    pub const PROVIDER: u8 = 0x0b;
    pub const CONDITIONAL_TABLE_MODIFY: u8 = 0x0c;
    pub const EXTENSION: u8 = 0x0d;
}

/// 表达式种类标签
pub mod expr_tag {
    pub const LITERAL: u8 = 0x20;
    pub const INPUT_REF: u8 = 0x21;
    pub const CALL: u8 = 0x22;
    pub const SUBQUERY: u8 = 0x23;
}

/// 值标签
pub mod value_tag {
    pub const NULL: u8 = 0x30;
    pub const BOOL: u8 = 0x31;
    pub const INT: u8 = 0x32;
    pub const FLOAT: u8 = 0x33;
    pub const STRING: u8 = 0x34;
    pub const LIST: u8 = 0x35;
}

/// 数据类型标签
pub mod type_tag {
    pub const NULL: u8 = 0x40;
    pub const BOOL: u8 = 0x41;
    pub const INT: u8 = 0x42;
    pub const FLOAT: u8 = 0x43;
    pub const STRING: u8 = 0x44;
    pub const LIST: u8 = 0x45;
    pub const ANY: u8 = 0x46;
}
