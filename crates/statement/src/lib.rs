//! Statement trees for CREATE TABLE / ALTER TABLE and the companion
//! statements an elaboration produces, with builders and a SQL renderer.

pub mod action;
pub mod ast;
pub mod builder;
pub mod dialect;
pub mod macros;
pub mod renderer;
