//! Elaborates parsed CREATE TABLE / ALTER TABLE statements into the ordered
//! list of actions that carry them out: implicit sequences, the statement
//! itself with resolved columns and partition boundaries, synthesized
//! indexes, deferred foreign keys and comments.

use crate::{catalog::Catalog, error::ElaborateError, settings::ElaborateSettings};
use serde::{Deserialize, Serialize};
use settings::ElaborateRequest;
use statement::{
    action::Action,
    ast::{Statement, alter_table::AlterTableStmt, create_table::CreateTableStmt},
};
use tracing::info;

pub mod alter;
pub mod catalog;
pub mod column;
pub mod constraint;
pub mod context;
pub mod create;
pub mod error;
pub mod foreign_key;
pub mod index;
pub mod like;
pub mod notice;
pub mod partition;
pub mod settings;

/// Result of one elaboration call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Elaboration {
    /// Before-actions, the main statement, then after-actions.
    pub actions: Vec<Action>,
    /// NOTICE messages raised on the way, in order.
    pub notices: Vec<String>,
}

impl Elaboration {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The elaborated CREATE TABLE, if there is one.
    pub fn create_table(&self) -> Option<&CreateTableStmt> {
        self.actions.iter().find_map(Action::as_create_table)
    }
}

/// Entry point tying a catalog to a set of session settings.
pub struct Elaborator<'a> {
    catalog: &'a dyn Catalog,
    settings: ElaborateSettings,
}

impl<'a> Elaborator<'a> {
    pub fn new(catalog: &'a dyn Catalog, settings: ElaborateSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn settings(&self) -> &ElaborateSettings {
        &self.settings
    }

    pub fn elaborate(
        &self,
        stmt: &Statement,
        request: &ElaborateRequest,
    ) -> Result<Elaboration, ElaborateError> {
        match stmt {
            Statement::CreateTable(create) => self.elaborate_create(create, request),
            Statement::AlterTable(alter) => self.elaborate_alter(alter, request),
        }
    }

    pub fn elaborate_create(
        &self,
        stmt: &CreateTableStmt,
        request: &ElaborateRequest,
    ) -> Result<Elaboration, ElaborateError> {
        info!("Elaborating CREATE TABLE {}", stmt.relation);
        let elaboration = create::elaborate_create(self.catalog, &self.settings, stmt, request)?;
        info!(
            "CREATE TABLE {} elaborated into {} action(s)",
            stmt.relation,
            elaboration.actions.len()
        );
        Ok(elaboration)
    }

    pub fn elaborate_alter(
        &self,
        stmt: &AlterTableStmt,
        request: &ElaborateRequest,
    ) -> Result<Elaboration, ElaborateError> {
        info!("Elaborating ALTER TABLE {}", stmt.relation);
        let elaboration = alter::elaborate_alter(self.catalog, &self.settings, stmt, request)?;
        info!(
            "ALTER TABLE {} elaborated into {} action(s)",
            stmt.relation,
            elaboration.actions.len()
        );
        Ok(elaboration)
    }
}
