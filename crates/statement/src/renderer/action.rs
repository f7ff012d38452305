use crate::{
    action::Action,
    renderer::{Render, Renderer},
};

impl Render for Action {
    fn render(&self, r: &mut Renderer) {
        match self {
            Action::CreateSequence(stmt) => stmt.render(r),
            Action::AlterSequence(stmt) => stmt.render(r),
            Action::CreateTable(stmt) => stmt.render(r),
            Action::AlterTable(stmt) => stmt.render(r),
            Action::CreateIndex(stmt) => stmt.render(r),
            Action::Comment(stmt) => stmt.render(r),
        }
    }
}

/// Renders an action list as a script, one statement per line.
pub fn render_script(actions: &[Action]) -> String {
    actions
        .iter()
        .map(super::to_sql)
        .collect::<Vec<_>>()
        .join("\n")
}
