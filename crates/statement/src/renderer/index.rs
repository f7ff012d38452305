use crate::{
    ast::index::{IndexElem, IndexSpec, NullsOrder, SortOrder},
    renderer::{Render, Renderer},
};

impl Render for IndexElem {
    fn render(&self, r: &mut Renderer) {
        match (&self.name, &self.expr) {
            (Some(name), _) => r.render_ident(name),
            (None, Some(expr)) => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push(')');
            }
            (None, None) => {}
        }
        if let Some(collation) = &self.collation {
            r.push(" COLLATE ");
            r.render_ident(collation);
        }
        if let Some(opclass) = &self.opclass {
            r.sql.push(' ');
            r.push(opclass);
        }
        match self.ordering {
            SortOrder::Default => {}
            SortOrder::Asc => r.push(" ASC"),
            SortOrder::Desc => r.push(" DESC"),
        }
        match self.nulls_ordering {
            NullsOrder::Default => {}
            NullsOrder::First => r.push(" NULLS FIRST"),
            NullsOrder::Last => r.push(" NULLS LAST"),
        }
    }
}

impl Render for IndexSpec {
    fn render(&self, r: &mut Renderer) {
        r.push("CREATE ");
        if self.unique {
            r.push("UNIQUE ");
        }
        r.push("INDEX ");
        if let Some(name) = &self.name {
            r.render_ident(name);
            r.sql.push(' ');
        }
        r.push("ON ");
        r.render_range_var(&self.relation);
        r.push(&format!(" USING {} (", self.access_method));
        r.render_list(&self.params, ", ");
        r.sql.push(')');
        if !self.options.is_empty() {
            let rendered: Vec<String> = self.options.iter().map(ToString::to_string).collect();
            r.push(&format!(" WITH ({})", rendered.join(", ")));
        }
        if let Some(space) = &self.table_space {
            r.push(" TABLESPACE ");
            r.render_ident(space);
        }
        if self.is_partitioned {
            r.push(" LOCAL");
        }
        if let Some(predicate) = &self.where_clause {
            r.push(" WHERE ");
            predicate.render(r);
        }
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::index::{IndexElem, IndexSpec, SortOrder},
        dialect::Postgres,
        range_var,
        renderer::{Render, Renderer},
    };

    #[test]
    fn test_render_unique_index() {
        let mut index = IndexSpec::new(range_var!("public", "orders"), "btree");
        index.name = Some("orders_label_key".to_string());
        index.unique = true;
        let mut created = IndexElem::column("created_at");
        created.ordering = SortOrder::Desc;
        index.params = vec![IndexElem::column("label"), created];

        let mut renderer = Renderer::new(&Postgres);
        index.render(&mut renderer);

        assert_eq!(
            renderer.finish(),
            r#"CREATE UNIQUE INDEX "orders_label_key" ON "public"."orders" USING btree ("label", "created_at" DESC);"#
        );
    }
}
