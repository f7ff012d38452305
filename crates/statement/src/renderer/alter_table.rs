use crate::{
    ast::{
        alter_table::{AlterTableCmd, AlterTableStmt, PartitionRef},
        comment::{CommentStmt, CommentTarget},
        common::DefElem,
        sequence::{AlterSequenceStmt, CreateSequenceStmt},
    },
    renderer::{Render, Renderer},
};

fn option_list(options: &[DefElem]) -> String {
    options
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Render for PartitionRef {
    fn render(&self, r: &mut Renderer) {
        match self {
            PartitionRef::Name(name) => r.render_ident(name),
            PartitionRef::Value(values) => {
                r.push("FOR ");
                r.render_boundary(values);
            }
        }
    }
}

impl Render for AlterTableCmd {
    fn render(&self, r: &mut Renderer) {
        match self {
            AlterTableCmd::AddColumn(col) => {
                r.push("ADD COLUMN ");
                col.render(r);
            }
            AlterTableCmd::AddConstraint(con) | AlterTableCmd::ProcessedConstraint(con) => {
                r.push("ADD ");
                con.render(r);
            }
            AlterTableCmd::AddIndex(index) | AlterTableCmd::AddIndexConstraint(index) => {
                r.push("ADD ");
                if let Some(name) = &index.name {
                    r.push("CONSTRAINT ");
                    r.render_ident(name);
                    r.sql.push(' ');
                }
                r.push(if index.primary { "PRIMARY KEY " } else { "UNIQUE " });
                let columns: Vec<String> = index
                    .column_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                r.render_ident_list(&columns);
            }
            AlterTableCmd::AddPartition(defs) => {
                r.push("ADD ");
                r.render_list(defs, ", ");
            }
            AlterTableCmd::DropPartition(target) => {
                r.push("DROP PARTITION ");
                target.render(r);
            }
            AlterTableCmd::TruncatePartition(target) => {
                r.push("TRUNCATE PARTITION ");
                target.render(r);
            }
            AlterTableCmd::ExchangePartition { target, table } => {
                r.push("EXCHANGE PARTITION (");
                target.render(r);
                r.push(") WITH TABLE ");
                r.render_range_var(table);
            }
            AlterTableCmd::SplitPartition {
                source,
                split_point,
                dest,
            } => {
                r.push("SPLIT PARTITION ");
                source.render(r);
                if let Some(point) = split_point {
                    r.push(" AT ");
                    r.render_boundary(point);
                }
                r.push(" INTO (");
                r.render_list(dest, ", ");
                r.sql.push(')');
            }
            AlterTableCmd::AlterColumnGenericOptions { column, options } => {
                r.push("ALTER COLUMN ");
                r.render_ident(column);
                r.push(&format!(" OPTIONS ({})", option_list(options)));
            }
            AlterTableCmd::DropColumn { name, missing_ok } => {
                r.push("DROP COLUMN ");
                if *missing_ok {
                    r.push("IF EXISTS ");
                }
                r.render_ident(name);
            }
            AlterTableCmd::SetOptions(options) => {
                r.push(&format!("SET ({})", option_list(options)));
            }
        }
    }
}

impl Render for AlterTableStmt {
    fn render(&self, r: &mut Renderer) {
        r.push("ALTER ");
        if self.is_foreign {
            r.push("FOREIGN ");
        }
        r.push("TABLE ");
        r.render_range_var(&self.relation);
        r.sql.push(' ');
        r.render_list(&self.cmds, ", ");
        r.sql.push(';');
    }
}

impl Render for CreateSequenceStmt {
    fn render(&self, r: &mut Renderer) {
        r.push("CREATE ");
        if self.sequence.is_temp() {
            r.push("TEMPORARY ");
        }
        r.push("SEQUENCE ");
        r.render_range_var(&self.sequence);
        for option in &self.options {
            r.push(&format!(" {}", option.name.to_uppercase()));
            if let Some(arg) = &option.arg {
                r.push(&format!(" {arg}"));
            }
        }
        r.sql.push(';');
    }
}

impl Render for AlterSequenceStmt {
    fn render(&self, r: &mut Renderer) {
        r.push("ALTER SEQUENCE ");
        r.render_range_var(&self.sequence);
        r.push(" OWNED BY ");
        let quoted: Vec<String> = self
            .owned_by
            .iter()
            .map(|part| r.dialect.quote_identifier(part))
            .collect();
        r.push(&quoted.join("."));
        r.sql.push(';');
    }
}

impl Render for CommentStmt {
    fn render(&self, r: &mut Renderer) {
        match &self.target {
            CommentTarget::Column { relation, column } => {
                r.push("COMMENT ON COLUMN ");
                r.render_range_var(relation);
                r.sql.push('.');
                r.render_ident(column);
            }
            CommentTarget::Constraint { relation, name } => {
                r.push("COMMENT ON CONSTRAINT ");
                r.render_ident(name);
                r.push(" ON ");
                r.render_range_var(relation);
            }
        }
        match &self.comment {
            Some(text) => r.push(&format!(" IS '{}';", text.replace('\'', "''"))),
            None => r.push(" IS NULL;"),
        }
    }
}
