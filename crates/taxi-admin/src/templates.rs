//! The admin's embedded tera templates.

use serde::Serialize;
use tera::{Context, Tera};

use taxi_core::{TaxiError, TaxiResult};

const TEMPLATES: [(&str, &str); 5] = [
    ("admin/base.html", include_str!("../templates/admin/base.html")),
    ("admin/index.html", include_str!("../templates/admin/index.html")),
    ("admin/change_list.html", include_str!("../templates/admin/change_list.html")),
    ("admin/change_form.html", include_str!("../templates/admin/change_form.html")),
    (
        "admin/delete_confirmation.html",
        include_str!("../templates/admin/delete_confirmation.html"),
    ),
];

pub(crate) fn template_error(err: &tera::Error) -> TaxiError {
    // Tera keeps the useful detail in the source chain.
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    TaxiError::TemplateError(message)
}

/// Parses the admin templates. HTML autoescaping is on.
pub fn admin_templates() -> TaxiResult<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())
        .map_err(|e| template_error(&e))?;
    tera.autoescape_on(vec![".html"]);
    Ok(tera)
}

/// Renders `name` with a serializable context.
pub fn render<C: Serialize>(tera: &Tera, name: &str, context: &C) -> TaxiResult<String> {
    let context = Context::from_serialize(context).map_err(|e| template_error(&e))?;
    tera.render(name, &context).map_err(|e| template_error(&e))
}
