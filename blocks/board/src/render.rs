use serde::Serialize;
use tera::{Context, Tera};

/// Board templates, compiled into the binary and autoescaped (`.html`).
const TEMPLATES: [(&str, &str); 6] = [
    ("home.html", include_str!("../templates/home.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
    ("partials/all_columns.html", include_str!("../templates/partials/all_columns.html")),
    ("partials/task_card.html", include_str!("../templates/partials/task_card.html")),
    ("partials/edit_task_form.html", include_str!("../templates/partials/edit_task_form.html")),
];

#[derive(Debug)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Self { tera })
    }

    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String, tera::Error> {
        let ctx = Context::from_serialize(context)?;
        self.tera.render(template_name, &ctx)
    }
}
