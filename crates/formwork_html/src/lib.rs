#![forbid(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]

//! # Formwork HTML
//!
//! An HTML5 [`Renderer`] for formwork forms.
//!
//! Every field type formwork users reach for maps to a control:
//!
//! | Type | Markup |
//! |------|--------|
//! | `text`, `email`, `url`, `number`, `date`, `hidden`, `password`, `file` | `<input type=..>` |
//! | `textarea` | `<textarea>` |
//! | `select` | `<select>` with `<option>`s from the `options` property |
//! | `select_range`, `select_year` | `<select>` over the integers `begin..=end` |
//! | `select_month` | `<select>` over the months, valued `1` to `12` |
//! | `checkbox`, `radio` | `<input>` followed by its label |
//! | `submit`, `button` | `<button>` |
//! | `reset`, `image` | `<input type="reset">`, `<input type="image">` |
//! | `label` | `<label>` |
//! | `token` | hidden CSRF token input |
//!
//! A few more HTML input types (`color`, `tel`, `search`, ...) are accepted
//! and rendered as plain `<input>`s; [`HtmlRenderer::accept_input_type`]
//! adds others.
//!
//! Labels are emitted for labelled fields, and fields are wrapped in their
//! container element unless it was removed. All text and attribute values
//! are escaped.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use formwork::Form;
//! use formwork_html::HtmlRenderer;
//!
//! let mut form = Form::new(Rc::new(HtmlRenderer::new()));
//! form.add("email", "email").unwrap().no_container();
//!
//! assert_eq!(
//!     form.render().unwrap(),
//!     "<label for=\"email\">Email</label>\n<input type=\"email\" name=\"email\" id=\"email\">"
//! );
//! ```

use std::fmt::Write;
use std::rc::Rc;

use formwork::{ActionType, AttrValue, AttributeBag, Element, Field, Form, Renderer, SelectOption};
use serde_json::Value;
use tracing::trace;

/// Field types with dedicated markup.
pub const FIELD_TYPES: [&str; 21] = [
    "text", "password", "hidden", "email", "url", "number", "date", "file", "textarea", "select", "select_range",
    "select_year", "select_month", "checkbox", "radio", "reset", "image", "submit", "button", "label", "token",
];

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October", "November",
    "December",
];

/// Extra input types rendered as a plain `<input type=..>`.
pub const GENERIC_INPUT_TYPES: [&str; 8] = ["color", "datetime-local", "month", "range", "search", "tel", "time", "week"];

/// Field types that never get a separate label element.
const UNLABELLED_TYPES: [&str; 7] = ["hidden", "token", "submit", "button", "reset", "image", "label"];

/// Name of the hidden input carrying the CSRF token.
pub const TOKEN_FIELD: &str = "_token";

/// Name of the hidden input carrying a spoofed method.
pub const METHOD_FIELD: &str = "_method";

/// Resolves a route or controller action name to a URL.
pub type ActionResolver = Rc<dyn Fn(ActionType, &str) -> String>;

/// Renders forms as HTML5.
#[derive(Clone, Default)]
pub struct HtmlRenderer {
    csrf_token: Option<String>,
    extra_input_types: Vec<String>,
    resolver: Option<ActionResolver>,
    description_class: Option<String>,
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "<set>"))
            .field("extra_input_types", &self.extra_input_types)
            .field("resolver", &self.resolver.is_some())
            .field("description_class", &self.description_class)
            .finish()
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the CSRF token written by `token` fields and into non-GET forms.
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Accepts `input_type` and renders it as a plain `<input>`.
    pub fn accept_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.extra_input_types.push(input_type.into());
        self
    }

    /// Resolves route and action targets. Without a resolver every target
    /// is used as the URL verbatim.
    pub fn action_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(ActionType, &str) -> String + 'static,
    {
        self.resolver = Some(Rc::new(resolver));
        self
    }

    /// CSS class for field descriptions.
    pub fn description_class(mut self, class: impl Into<String>) -> Self {
        self.description_class = Some(class.into());
        self
    }

    fn is_generic_input(&self, field_type: &str) -> bool {
        GENERIC_INPUT_TYPES.contains(&field_type) || self.extra_input_types.iter().any(|t| t == field_type)
    }

    fn resolve_action(&self, form: &Form) -> Option<String> {
        let action = form.get_action()?;
        Some(match (action.kind, &self.resolver) {
            (ActionType::Url, _) | (_, None) => action.target.clone(),
            (kind, Some(resolve)) => resolve(kind, &action.target),
        })
    }

    fn control(&self, form: &Form, field: &Field) -> String {
        let value = form.value_of(field);
        let text = value.map(value_text).unwrap_or_default();
        let name = field.name();
        let name = name.as_deref();

        match field.field_type() {
            "password" | "file" => input(field.field_type(), name, None, field),
            "hidden" | "text" | "email" | "url" | "number" | "date" => {
                input(field.field_type(), name, Some(text.as_str()), field)
            }
            "textarea" => textarea(name, &text, field),
            "select" => select(name, value, field.properties().options(), field),
            "select_range" | "select_year" => {
                let chosen = chosen_value(value, field);
                select(name, chosen.as_ref(), &range_options(field), field)
            }
            "select_month" => {
                let chosen = chosen_value(value, field);
                select(name, chosen.as_ref(), &month_options(), field)
            }
            "checkbox" | "radio" => checkable(form, name, field),
            "reset" => input("reset", None, Some(text.as_str()), field),
            "image" => image(name, field),
            "submit" | "button" => button(field.field_type(), name, &text, field),
            "label" => label_field(name, &text, field),
            "token" => {
                let token = self.csrf_token.clone().unwrap_or_default();
                input("hidden", Some(TOKEN_FIELD), Some(token.as_str()), field)
            }
            other => {
                trace!(field.slug = field.slug(), field.field_type = other, "Rendering as generic input");
                input(other, name, Some(text.as_str()), field)
            }
        }
    }

    fn description(&self, field: &Field) -> Option<String> {
        let description = field.properties().description()?;
        let mut html = String::from("<p");
        if let Some(class) = &self.description_class {
            write_attr(&mut html, "class", class);
        }
        let _ = write!(html, ">{}</p>", escape_html(description));
        Some(html)
    }
}

impl Renderer for HtmlRenderer {
    fn is_valid_type(&self, field_type: &str) -> bool {
        FIELD_TYPES.contains(&field_type) || self.is_generic_input(field_type)
    }

    fn form_open(&self, form: &Form) -> String {
        let method = form.get_method().to_ascii_uppercase();
        let spoofed = !matches!(method.as_str(), "GET" | "POST");

        let mut html = String::from("<form");
        write_attr(&mut html, "method", if spoofed { "POST" } else { method.as_str() });
        if let Some(action) = self.resolve_action(form) {
            write_attr(&mut html, "action", &action);
        }
        let charset = form.attributes().get_str("accept-charset").unwrap_or("UTF-8");
        write_attr(&mut html, "accept-charset", charset);
        if form.fields().any(|f| f.field_type() == "file") && !form.attributes().contains("enctype") {
            write_attr(&mut html, "enctype", "multipart/form-data");
        }
        write_attrs_except(&mut html, form.attributes(), &["method", "action", "accept-charset"]);
        html.push('>');

        if spoofed {
            let _ = write!(
                html,
                r#"<input type="hidden" name="{}" value="{}">"#,
                METHOD_FIELD,
                escape_attr(&method)
            );
        }
        if method != "GET" {
            if let Some(token) = &self.csrf_token {
                let _ = write!(
                    html,
                    r#"<input type="hidden" name="{}" value="{}">"#,
                    TOKEN_FIELD,
                    escape_attr(token)
                );
            }
        }
        html
    }

    fn form_close(&self, _form: &Form) -> String {
        "</form>".to_string()
    }

    fn row_open(&self, row: &Element, _fields: &[&Field]) -> String {
        let mut html = format!("<{}", row.tag());
        write_attrs(&mut html, row.attributes());
        html.push_str(r#"><div class="row">"#);
        html
    }

    fn row_close(&self, row: &Element, _fields: &[&Field]) -> String {
        format!("</div></{}>", row.tag())
    }

    fn field(&self, form: &Form, field: &Field) -> String {
        let labelled = field.properties().label().is_some() && !UNLABELLED_TYPES.contains(&field.field_type());
        let label_after = matches!(field.field_type(), "checkbox" | "radio");

        let mut parts = Vec::with_capacity(5);
        if let Some(container) = field.properties().container() {
            let mut open = format!("<{}", container.tag());
            write_attrs(&mut open, container.attributes());
            open.push('>');
            parts.push(open);
        }
        let label = labelled.then(|| field_label(field)).flatten();
        if !label_after {
            parts.extend(label.clone());
        }
        parts.push(self.control(form, field));
        if label_after {
            parts.extend(label);
        }
        parts.extend(self.description(field));
        if let Some(container) = field.properties().container() {
            parts.push(format!("</{}>", container.tag()));
        }
        parts.join("\n")
    }
}

/// Escape a string for use in an HTML attribute value.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a string for use in HTML content.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_attr(html: &mut String, name: &str, value: &str) {
    let _ = write!(html, r#" {}="{}""#, name, escape_attr(value));
}

fn write_attrs(html: &mut String, attributes: &AttributeBag) {
    write_attrs_except(html, attributes, &[]);
}

fn write_attrs_except(html: &mut String, attributes: &AttributeBag, skip: &[&str]) {
    for (name, value) in attributes.export() {
        if skip.contains(&name.as_str()) {
            continue;
        }
        match value {
            AttrValue::Flag(true) => {
                html.push(' ');
                html.push_str(&name);
            }
            AttrValue::Flag(false) => {}
            AttrValue::Text(text) => write_attr(html, &name, &text),
        }
    }
}

/// The id a control gets: its explicit `id` attribute, or its safe name
/// when it has a label to point at it.
fn control_id(field: &Field) -> Option<String> {
    if let Some(id) = field.attributes().get_str("id") {
        return Some(id.to_string());
    }
    field.properties().label().map(|_| field.safe_name())
}

/// Opening tag attributes shared by every control: type, name, id, then the
/// field's own attributes.
fn open_tag(tag: &str, input_type: Option<&str>, name: Option<&str>, field: &Field) -> String {
    let mut html = format!("<{tag}");
    if let Some(input_type) = input_type {
        write_attr(&mut html, "type", input_type);
    }
    if let Some(name) = name {
        write_attr(&mut html, "name", name);
    }
    if let Some(id) = control_id(field) {
        write_attr(&mut html, "id", &id);
    }
    html
}

fn input(input_type: &str, name: Option<&str>, value: Option<&str>, field: &Field) -> String {
    let mut html = open_tag("input", Some(input_type), name, field);
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        write_attr(&mut html, "value", value);
    }
    write_attrs_except(&mut html, field.attributes(), &["type", "name", "id", "value"]);
    html.push('>');
    html
}

fn textarea(name: Option<&str>, text: &str, field: &Field) -> String {
    let mut html = open_tag("textarea", None, name, field);
    write_attrs_except(&mut html, field.attributes(), &["name", "id"]);
    let _ = write!(html, ">{}</textarea>", escape_html(text));
    html
}

fn select(name: Option<&str>, value: Option<&Value>, options: &[SelectOption], field: &Field) -> String {
    let selected: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().map(value_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![value_text(other)],
    };

    let mut html = open_tag("select", None, name, field);
    if field.properties().multiple() && !field.attributes().contains("multiple") {
        html.push_str(" multiple");
    }
    write_attrs_except(&mut html, field.attributes(), &["name", "id"]);
    html.push('>');
    for option in options {
        html.push_str("<option");
        write_attr(&mut html, "value", &option.value);
        if selected.contains(&option.value) {
            html.push_str(" selected");
        }
        let _ = write!(html, ">{}</option>", escape_html(&option.label));
    }
    html.push_str("</select>");
    html
}

/// The `selected` property wins over the field or model value.
fn chosen_value(value: Option<&Value>, field: &Field) -> Option<Value> {
    match field.property("selected") {
        Value::Null => value.cloned(),
        selected => Some(selected),
    }
}

/// Options for every integer from `begin` to `end` inclusive, counting down
/// when `end` is smaller. Empty unless both bounds are integers.
fn range_options(field: &Field) -> Vec<SelectOption> {
    let bound = |key: &str| match field.property(key) {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    let (Some(begin), Some(end)) = (bound("begin"), bound("end")) else {
        return Vec::new();
    };
    let values: Box<dyn Iterator<Item = i64>> = if begin <= end {
        Box::new(begin..=end)
    } else {
        Box::new((end..=begin).rev())
    };
    values
        .map(|v| {
            let v = v.to_string();
            SelectOption::new(v.clone(), v)
        })
        .collect()
}

fn month_options() -> Vec<SelectOption> {
    MONTHS
        .iter()
        .zip(1..)
        .map(|(month, number): (&&str, u8)| SelectOption::new(number.to_string(), *month))
        .collect()
}

/// Checkboxes and radios submit their own value (default `1`) and are
/// checked by a `checked` property or a bound model value that matches.
fn checkable(form: &Form, name: Option<&str>, field: &Field) -> String {
    let own = if field.has_empty_value() {
        "1".to_string()
    } else {
        value_text(field.get_value())
    };
    let bound = form.get_model().and_then(|model| model.get(&field.dot_name()));
    let checked = field.property("checked") == Value::Bool(true)
        || match bound {
            Some(Value::Bool(b)) => *b,
            Some(Value::Array(items)) => items.iter().any(|v| value_text(v) == own),
            Some(other) => value_text(other) == own,
            None => false,
        };

    let mut html = open_tag("input", Some(field.field_type()), name, field);
    write_attr(&mut html, "value", &own);
    if checked {
        html.push_str(" checked");
    }
    write_attrs_except(&mut html, field.attributes(), &["type", "name", "id", "value", "checked"]);
    html.push('>');
    html
}

fn image(name: Option<&str>, field: &Field) -> String {
    let mut html = open_tag("input", Some("image"), name, field);
    if let Value::String(src) = field.property("url") {
        write_attr(&mut html, "src", &src);
    }
    write_attrs_except(&mut html, field.attributes(), &["type", "name", "id", "src"]);
    html.push('>');
    html
}

/// With a label the label is the button text and the value is submitted;
/// without one the value is the text.
fn button(button_type: &str, name: Option<&str>, text: &str, field: &Field) -> String {
    let mut html = open_tag("button", Some(button_type), name, field);
    let content = match field.properties().label() {
        Some(label) => {
            if !text.is_empty() {
                write_attr(&mut html, "value", text);
            }
            label.to_string()
        }
        None => text.to_string(),
    };
    write_attrs_except(&mut html, field.attributes(), &["type", "name", "id", "value"]);
    let _ = write!(html, ">{}</button>", escape_html(&content));
    html
}

fn label_field(name: Option<&str>, text: &str, field: &Field) -> String {
    let mut html = String::from("<label");
    if let Some(target) = name {
        write_attr(&mut html, "for", &formwork::naming::safe_name(target));
    }
    write_attrs_except(&mut html, field.attributes(), &["for"]);
    let _ = write!(html, ">{}</label>", escape_html(text));
    html
}

fn field_label(field: &Field) -> Option<String> {
    let label = field.properties().label()?;
    let mut html = String::from("<label");
    if let Some(id) = control_id(field) {
        write_attr(&mut html, "for", &id);
    }
    let _ = write!(html, ">{}</label>", escape_html(label));
    Some(html)
}
