//! PlanAlg - the algebra core of a multi-model query engine
//!
//! This crate provides the relational/graph intermediate representation of
//! query plans, a scalar expression sub-language with correlated subqueries,
//! a rule-based rewrite engine proposing equivalent plans, and a
//! self-describing envelope codec for shipping plan fragments across process
//! or store boundaries.

pub mod codec;
pub mod core;
pub mod expr;
pub mod plan;
pub mod rewrite;
