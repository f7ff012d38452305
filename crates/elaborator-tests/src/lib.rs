#![allow(dead_code)]

use elaborator::{
    Elaboration, Elaborator, catalog::MemoryCatalog, error::ElaborateError,
    settings::{ElaborateRequest, ElaborateSettings},
};
use statement::ast::Statement;

pub mod integration;
pub mod utils;

/// Runs one statement through a fresh elaborator.
fn elaborate_with(
    catalog: &MemoryCatalog,
    settings: ElaborateSettings,
    stmt: impl Into<Statement>,
    request: &ElaborateRequest,
) -> Result<Elaboration, ElaborateError> {
    Elaborator::new(catalog, settings).elaborate(&stmt.into(), request)
}

fn elaborate(
    catalog: &MemoryCatalog,
    stmt: impl Into<Statement>,
) -> Result<Elaboration, ElaborateError> {
    elaborate_with(
        catalog,
        ElaborateSettings::default(),
        stmt,
        &ElaborateRequest::default(),
    )
}
