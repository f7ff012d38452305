pub mod column;
pub mod create_table;
