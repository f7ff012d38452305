pub mod arith;
pub mod boundary;
pub mod data_type;
pub mod error;
pub mod identifiers;
pub mod interval;
pub mod value;
