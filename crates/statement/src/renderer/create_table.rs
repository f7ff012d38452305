use crate::{
    ast::{
        column::ColumnDef,
        common::{DefElem, Persistence},
        constraint::{ConstraintAttr, ConstraintKind, ConstraintSpec},
        create_table::{CreateTableStmt, DistributionKind, OnCommit, TableElement},
        partition::{PartitionDef, PartitionSpec, PartitionStrategy},
    },
    renderer::{Render, Renderer},
};

impl Render for CreateTableStmt {
    fn render(&self, r: &mut Renderer) {
        r.columns = self.columns().map(|c| c.name.clone()).collect();

        r.push("CREATE ");
        match self.relation.persistence {
            Persistence::Temp => r.push("TEMPORARY "),
            Persistence::Unlogged => r.push("UNLOGGED "),
            Persistence::Permanent => {}
        }
        if self.is_foreign() {
            r.push("FOREIGN ");
        }
        r.push("TABLE ");
        if self.if_not_exists {
            r.push("IF NOT EXISTS ");
        }
        r.render_range_var(&self.relation);

        if let Some(of_type) = &self.of_type {
            r.push(&format!(" OF {of_type}"));
        }

        r.push(" (");
        let mut first = true;
        for element in &self.elements {
            if !first {
                r.push(", ");
            }
            first = false;
            match element {
                TableElement::Column(col) => col.render(r),
                TableElement::Constraint(con) => con.render(r),
                TableElement::Like(like) => {
                    r.push("LIKE ");
                    r.render_range_var(&like.relation);
                    if like.options.is_all() {
                        r.push(" INCLUDING ALL");
                    } else {
                        for (name, _) in like.options.iter_names() {
                            r.push(&format!(" INCLUDING {name}"));
                        }
                    }
                }
            }
        }
        for con in &self.constraints {
            if !first {
                r.push(", ");
            }
            first = false;
            con.render(r);
        }
        r.sql.push(')');

        if !self.inherits.is_empty() {
            r.push(" INHERITS (");
            for (i, parent) in self.inherits.iter().enumerate() {
                if i > 0 {
                    r.push(", ");
                }
                r.render_range_var(parent);
            }
            r.sql.push(')');
        }
        if let Some(foreign) = &self.foreign {
            r.push(" SERVER ");
            r.render_ident(&foreign.server);
            render_options(r, " OPTIONS ", &foreign.options);
        }
        render_options(r, " WITH ", &self.options);
        match self.on_commit {
            OnCommit::Noop => {}
            OnCommit::PreserveRows => r.push(" ON COMMIT PRESERVE ROWS"),
            OnCommit::DeleteRows => r.push(" ON COMMIT DELETE ROWS"),
            OnCommit::Drop => r.push(" ON COMMIT DROP"),
        }
        if let Some(space) = &self.tablespace {
            r.push(" TABLESPACE ");
            r.render_ident(space);
        }
        if let Some(partition) = &self.partition {
            r.sql.push(' ');
            partition.render(r);
        }
        if let Some(dist) = &self.distribute_by {
            let kind = match dist.kind {
                DistributionKind::Hash => "HASH",
                DistributionKind::Replication => "REPLICATION",
                DistributionKind::RoundRobin => "ROUNDROBIN",
                DistributionKind::Modulo => "MODULO",
            };
            r.push(&format!(" DISTRIBUTE BY {kind}"));
            if !dist.columns.is_empty() {
                r.render_ident_list(&dist.columns);
            }
        }
        if let Some(group) = &self.subcluster {
            r.push(" TO GROUP ");
            r.render_ident(group);
        }
        r.sql.push(';');
    }
}

fn render_options(r: &mut Renderer, keyword: &str, options: &[DefElem]) {
    if options.is_empty() {
        return;
    }
    let rendered: Vec<String> = options.iter().map(ToString::to_string).collect();
    r.push(&format!("{keyword}({})", rendered.join(", ")));
}

impl Render for ColumnDef {
    fn render(&self, r: &mut Renderer) {
        r.render_ident(&self.name);
        r.sql.push(' ');
        let type_sql = match &self.data_type {
            Some(dt) => {
                let mut sql = r.dialect.render_data_type(dt);
                if dt.supports_length()
                    && let Some(len) = self.type_name.typmods.first()
                {
                    sql = format!("{sql}({len})");
                }
                for _ in &self.type_name.array_bounds {
                    sql.push_str("[]");
                }
                sql
            }
            None => r.dialect.render_type_name(&self.type_name),
        };
        r.push(&type_sql);
        if let Some(collation) = &self.collation {
            r.push(" COLLATE ");
            r.render_ident(collation);
        }
        if self.is_not_null {
            r.push(" NOT NULL");
        }
        if let Some(default) = self.default_expr() {
            r.push(" DEFAULT ");
            default.render(r);
        }
        for con in &self.constraints {
            r.sql.push(' ');
            con.render(r);
        }
    }
}

impl Render for ConstraintSpec {
    fn render(&self, r: &mut Renderer) {
        if let Some(name) = &self.name {
            r.push("CONSTRAINT ");
            r.render_ident(name);
            r.sql.push(' ');
        }
        r.push(&self.kind.to_string());
        match &self.kind {
            ConstraintKind::Default(expr) => {
                r.sql.push(' ');
                expr.render(r);
            }
            ConstraintKind::Check { raw, cooked } => {
                if let Some(expr) = cooked.as_ref().or(raw.as_ref()) {
                    r.push(" (");
                    expr.render(r);
                    r.sql.push(')');
                }
            }
            ConstraintKind::PrimaryKey(key) | ConstraintKind::Unique(key) => {
                if !key.keys.is_empty() {
                    r.sql.push(' ');
                    r.render_ident_list(&key.keys);
                }
                if let Some(index) = &key.index_name {
                    r.push(" USING INDEX ");
                    r.render_ident(index);
                }
            }
            ConstraintKind::Exclusion(excl) => {
                r.push(&format!(" USING {} (", excl.access_method));
                for (i, (elem, op)) in excl.elements.iter().enumerate() {
                    if i > 0 {
                        r.push(", ");
                    }
                    match (&elem.name, &elem.expr) {
                        (Some(name), _) => r.render_ident(name),
                        (None, Some(expr)) => expr.render(r),
                        (None, None) => {}
                    }
                    r.push(&format!(" WITH {op}"));
                }
                r.sql.push(')');
            }
            ConstraintKind::ForeignKey(fk) => {
                r.sql.push(' ');
                r.render_ident_list(&fk.fk_attrs);
                r.push(" REFERENCES ");
                r.render_range_var(&fk.pk_table);
                if !fk.pk_attrs.is_empty() {
                    r.render_ident_list(&fk.pk_attrs);
                }
                r.push(&format!(" ON UPDATE {} ON DELETE {}", fk.on_update, fk.on_delete));
                if fk.skip_validation {
                    r.push(" NOT VALID");
                }
            }
            ConstraintKind::ClusterKey { keys } => {
                r.sql.push(' ');
                r.render_ident_list(keys);
            }
            ConstraintKind::Null | ConstraintKind::NotNull | ConstraintKind::Attribute(_) => {}
        }
        if !matches!(self.kind, ConstraintKind::Attribute(_)) {
            if self.deferrable {
                r.push(&format!(" {}", ConstraintKind::Attribute(ConstraintAttr::Deferrable)));
            }
            if self.initially_deferred {
                r.push(&format!(
                    " {}",
                    ConstraintKind::Attribute(ConstraintAttr::InitiallyDeferred)
                ));
            }
        }
        if self.not_enforced {
            r.push(" NOT ENFORCED");
        }
    }
}

impl Render for PartitionSpec {
    fn render(&self, r: &mut Renderer) {
        let strategy = match self.strategy {
            PartitionStrategy::Range | PartitionStrategy::Interval => "RANGE",
            PartitionStrategy::List => "LIST",
            PartitionStrategy::Value => "VALUES",
        };
        r.push(&format!("PARTITION BY {strategy} "));
        r.render_ident_list(&self.keys);
        if let Some(interval) = &self.interval {
            r.push(&format!(" INTERVAL ('{}')", interval.replace('\'', "''")));
        }
        if self.definitions.is_empty() {
            return;
        }
        r.push(" (");
        r.render_list(&self.definitions, ", ");
        r.sql.push(')');
        if self.row_movement {
            r.push(" ENABLE ROW MOVEMENT");
        }
    }
}

impl Render for PartitionDef {
    fn render(&self, r: &mut Renderer) {
        r.push("PARTITION ");
        r.render_ident(self.name());
        let tablespace = match self {
            PartitionDef::LessThan(def) => {
                r.push(" VALUES LESS THAN ");
                r.render_boundary(&def.boundary);
                &def.tablespace
            }
            PartitionDef::StartEnd(def) => {
                for (keyword, values) in [
                    (" START ", &def.start),
                    (" END ", &def.end),
                    (" EVERY ", &def.every),
                ] {
                    if let Some(values) = values {
                        r.push(keyword);
                        r.render_boundary(values);
                    }
                }
                &def.tablespace
            }
            PartitionDef::List(def) => {
                r.push(" VALUES ");
                r.render_boundary(&def.values);
                &def.tablespace
            }
        };
        if let Some(space) = tablespace {
            r.push(" TABLESPACE ");
            r.render_ident(space);
        }
    }
}
