//! Embedded page templates and rendering.
//!
//! Every rendered response carries its context as a [`TemplateContext`]
//! extension, so tests can inspect context keys as well as the HTML.

use axum::response::{Html, IntoResponse};
use serde_json::{json, Value};
use tera::{Context, Tera};

use taxi_core::{TaxiError, TaxiResult};
use taxi_db::Driver;

use crate::error::ViewResult;
use crate::state::AppState;

macro_rules! template {
    ($name:literal) => {
        ($name, include_str!(concat!("../templates/", $name)))
    };
}

const TEMPLATES: &[(&str, &str)] = &[
    template!("base.html"),
    template!("registration/login.html"),
    template!("taxi/index.html"),
    template!("taxi/search_form.html"),
    template!("taxi/form.html"),
    template!("taxi/confirm_delete.html"),
    template!("taxi/manufacturer_list.html"),
    template!("taxi/car_list.html"),
    template!("taxi/car_detail.html"),
    template!("taxi/driver_list.html"),
    template!("taxi/driver_detail.html"),
];

/// The context a page was rendered with.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub template: &'static str,
    pub context: Value,
}

fn template_error(err: &tera::Error) -> TaxiError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    TaxiError::TemplateError(message)
}

/// Parses the site templates. HTML autoescaping is on.
pub fn site_templates() -> TaxiResult<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())
        .map_err(|e| template_error(&e))?;
    tera.autoescape_on(vec![".html"]);
    Ok(tera)
}

/// Renders `template` with `context` plus the logged-in `user`.
pub fn render(
    state: &AppState,
    template: &'static str,
    user: Option<&Driver>,
    mut context: Value,
) -> ViewResult {
    if let Some(obj) = context.as_object_mut() {
        let user = user.map_or(Value::Null, |u| {
            json!({
                "id": u.id,
                "username": u.username,
                "is_staff": u.is_staff,
                "url": u.get_absolute_url(),
            })
        });
        obj.insert("user".to_string(), user);
    }
    let tera_context = Context::from_serialize(&context).map_err(|e| template_error(&e))?;
    let html = state
        .templates
        .render(template, &tera_context)
        .map_err(|e| template_error(&e))?;

    let mut response = Html(html).into_response();
    response
        .extensions_mut()
        .insert(TemplateContext { template, context });
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_parse() {
        let tera = site_templates().unwrap();
        for (name, _) in TEMPLATES {
            assert!(tera.get_template_names().any(|n| n == *name), "{name}");
        }
    }
}
