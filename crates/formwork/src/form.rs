//! The form aggregate: fields, rows, listeners, and rendering.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::attributes::{AttrValue, AttributeBag};
use crate::buffer::RowBuffer;
use crate::config::FormOptions;
use crate::element::Element;
use crate::error::{FormError, Result};
use crate::events::{Binder, EventArgs, EventBus, Lifecycle};
use crate::field::{Field, RAW_FIELD_TYPE};
use crate::kinds::FieldKinds;
use crate::macros::Macros;
use crate::model::Model;
use crate::naming;
use crate::properties::PropertyKey;
use crate::renderer::Renderer;
use crate::table::OrderedTable;

/// Where [`Form::add_kind`] places a new field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
    /// After every existing field.
    #[default]
    End,
    /// Immediately before the named field.
    Before(String),
    /// Immediately after the named field.
    After(String),
}

impl Placement {
    pub fn before(slug: impl Into<String>) -> Self {
        Self::Before(slug.into())
    }

    pub fn after(slug: impl Into<String>) -> Self {
        Self::After(slug.into())
    }
}

/// How a renderer should interpret the form's action target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    /// A literal URL.
    Url,
    /// A named route.
    Route,
    /// A controller action.
    Action,
}

/// The form's submission target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormAction {
    pub kind: ActionType,
    pub target: String,
}

/// A form under construction.
///
/// Fields are kept in an ordered table keyed by slug. Rows are wrapper
/// elements that fields join through their `row` property; a row renders
/// where its first field would. Markup comes from the injected
/// [`Renderer`], with lifecycle events fired around every form, row, and
/// field.
pub struct Form {
    attributes: AttributeBag,
    options: FormOptions,
    fields: OrderedTable<Field>,
    rows: OrderedTable<Element>,
    field_names: Vec<String>,
    model: Option<Model>,
    action: Option<FormAction>,
    events: EventBus,
    buffer: RowBuffer,
    renderer: Rc<dyn Renderer>,
    macros: Macros,
    kinds: FieldKinds,
    row_counter: usize,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("attributes", &self.attributes)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("rows", &self.rows.keys().collect::<Vec<_>>())
            .field("field_names", &self.field_names)
            .field("action", &self.action)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Form {
    /// Creates a form with default options.
    pub fn new(renderer: Rc<dyn Renderer>) -> Self {
        Self::with_options(renderer, FormOptions::default())
    }

    pub fn with_options(renderer: Rc<dyn Renderer>, options: FormOptions) -> Self {
        let mut fields = OrderedTable::new();
        fields.set_overwrite(options.allow_field_overwrite);
        let mut attributes = AttributeBag::new();
        attributes.set("method", options.method.as_str());

        Self {
            attributes,
            options,
            fields,
            rows: OrderedTable::new(),
            field_names: Vec::new(),
            model: None,
            action: None,
            events: EventBus::new(),
            buffer: RowBuffer::new(),
            renderer,
            macros: Macros::new(),
            kinds: FieldKinds::with_builtins(),
            row_counter: 0,
        }
    }

    /// Shares a macro registry with this form.
    pub fn with_macros(mut self, macros: Macros) -> Self {
        self.macros = macros;
        self
    }

    /// Shares a kind registry with this form.
    pub fn with_kinds(mut self, kinds: FieldKinds) -> Self {
        self.kinds = kinds;
        self
    }

    /// Copies every binder and binding of `defaults` into this form.
    pub fn with_events(mut self, defaults: &EventBus) -> Self {
        self.events.extend_from(defaults);
        self
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn macros(&self) -> &Macros {
        &self.macros
    }

    pub fn kinds(&self) -> &FieldKinds {
        &self.kinds
    }

    /// Allows re-adding a slug, replacing the old field in place.
    pub fn set_allow_field_overwrite(&mut self, allow: bool) -> &mut Self {
        self.options.allow_field_overwrite = allow;
        self.fields.set_overwrite(allow);
        self
    }

    // -------------------------------------------------------------------------
    // Form attributes and action
    // -------------------------------------------------------------------------

    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeBag {
        &mut self.attributes
    }

    pub fn attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.attributes.set(key, value);
        self
    }

    pub fn add_class(&mut self, classes: &str) -> &mut Self {
        self.attributes.add_class(classes);
        self
    }

    /// Submits to a literal URL.
    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_action(ActionType::Url, url)
    }

    /// Submits to a named route.
    pub fn route(&mut self, name: impl Into<String>) -> &mut Self {
        self.set_action(ActionType::Route, name)
    }

    /// Submits to a controller action.
    pub fn action(&mut self, action: impl Into<String>) -> &mut Self {
        self.set_action(ActionType::Action, action)
    }

    fn set_action(&mut self, kind: ActionType, target: impl Into<String>) -> &mut Self {
        self.action = Some(FormAction {
            kind,
            target: target.into(),
        });
        self
    }

    pub fn get_action(&self) -> Option<&FormAction> {
        self.action.as_ref()
    }

    /// Sets the submission method.
    pub fn method(&mut self, method: impl Into<String>) -> &mut Self {
        let method = method.into();
        self.attributes.set("method", method.as_str());
        self.options.method = method;
        self
    }

    pub fn get_method(&self) -> &str {
        &self.options.method
    }

    // -------------------------------------------------------------------------
    // Model binding
    // -------------------------------------------------------------------------

    /// Binds model data used to pre-fill fields whose own value is empty.
    pub fn model(&mut self, model: Value) -> &mut Self {
        self.model = Some(Model::new(model));
        self
    }

    /// Binds any serializable value as the model.
    pub fn model_from<T: Serialize>(&mut self, model: &T) -> Result<&mut Self> {
        self.model = Some(Model::from_serialize(model)?);
        Ok(self)
    }

    pub fn get_model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// The value to render for `field`: its own value when non-empty,
    /// otherwise the model value at its dotted name.
    pub fn value_of<'a>(&'a self, field: &'a Field) -> Option<&'a Value> {
        if !field.has_empty_value() {
            return Some(field.get_value());
        }
        self.model.as_ref().and_then(|model| model.get(&field.dot_name()))
    }

    // -------------------------------------------------------------------------
    // Field management
    // -------------------------------------------------------------------------

    /// Returns true if `field_type` can be attached: the raw type, a
    /// registered macro, or a type the renderer accepts.
    pub fn is_valid_type(&self, field_type: &str) -> bool {
        field_type == RAW_FIELD_TYPE
            || self.macros.contains(field_type)
            || self.renderer.is_valid_type(field_type)
    }

    /// Appends a new field.
    ///
    /// # Errors
    ///
    /// `DuplicateField` if the slug is taken (and overwriting is off),
    /// `UnknownFieldType` if nothing can render `field_type`.
    pub fn add(&mut self, slug: &str, field_type: &str) -> Result<&mut Field> {
        self.attach(self.fields.len(), slug, field_type)
    }

    /// Adds a field immediately before `existing`.
    pub fn add_before(&mut self, existing: &str, slug: &str, field_type: &str) -> Result<&mut Field> {
        let position = self.index_of(existing)?;
        self.attach(position, slug, field_type)
    }

    /// Adds a field immediately after `existing`.
    pub fn add_after(&mut self, existing: &str, slug: &str, field_type: &str) -> Result<&mut Field> {
        let position = self.index_of(existing)?;
        self.attach(position + 1, slug, field_type)
    }

    /// Adds a field at `position` (clamped to the end).
    pub fn add_at(&mut self, position: usize, slug: &str, field_type: &str) -> Result<&mut Field> {
        self.attach(position, slug, field_type)
    }

    /// Adds a field by kind name.
    ///
    /// Registered kinds supply the field type and extra configuration;
    /// any other name is used as the type. Anchors in `placement` may be
    /// given in camelCase (`firstName` finds `first_name`).
    pub fn add_kind(&mut self, kind: &str, slug: &str, label: Option<&str>, placement: Placement) -> Result<&mut Field> {
        let registered = self.kinds.get(kind);
        let field_type = registered
            .as_ref()
            .map_or_else(|| kind.to_string(), |k| k.field_type().to_string());
        let position = match &placement {
            Placement::End => self.fields.len(),
            Placement::Before(anchor) => self.anchor_index(anchor)?,
            Placement::After(anchor) => self.anchor_index(anchor)? + 1,
        };

        let field = self.attach(position, slug, &field_type)?;
        if let Some(kind) = &registered {
            kind.configure(field);
        }
        if let Some(label) = label {
            field.label(label);
        }
        Ok(field)
    }

    /// Adds a submit button (slug `submit` unless given).
    pub fn add_submit(&mut self, label: Option<&str>, slug: Option<&str>) -> Result<&mut Field> {
        self.add_kind("submit", slug.unwrap_or("submit"), label, Placement::End)
    }

    /// Adds a hidden field with a value.
    pub fn add_hidden(&mut self, slug: &str, value: impl Into<Value>) -> Result<&mut Field> {
        let field = self.add_kind("hidden", slug, None, Placement::End)?;
        field.value(value);
        Ok(field)
    }

    /// Adds markup that is emitted verbatim.
    pub fn add_raw(&mut self, slug: &str, html: impl Into<String>) -> Result<&mut Field> {
        let field = self.add_kind(RAW_FIELD_TYPE, slug, None, Placement::End)?;
        field.value(html.into());
        Ok(field)
    }

    fn anchor_index(&self, anchor: &str) -> Result<usize> {
        self.fields
            .index_of(anchor)
            .or_else(|| {
                self.fields
                    .index_of(&naming::slug_from_camel(anchor, self.options.slug_char))
            })
            .ok_or_else(|| FormError::FieldNotFound(anchor.to_string()))
    }

    fn attach(&mut self, position: usize, slug: &str, field_type: &str) -> Result<&mut Field> {
        let replacing = self.fields.contains(slug);
        if replacing && !self.options.allow_field_overwrite {
            return Err(FormError::DuplicateField(slug.to_string()));
        }
        if !self.is_valid_type(field_type) {
            return Err(FormError::UnknownFieldType(field_type.to_string()));
        }

        let mut field = Field::new(slug, field_type);
        field.set_form_names(self.field_names.clone());
        if self.options.wants_auto_label(field_type) {
            field.label(naming::title_from_slug(slug));
        }

        self.events
            .fire(Lifecycle::NewField.as_str(), &mut EventArgs::NewField(&mut field))?;
        let studly = naming::studly(field_type);
        if !studly.is_empty() {
            self.events
                .fire(&format!("new{studly}Field"), &mut EventArgs::NewField(&mut field))?;
        }

        if replacing {
            warn!(field.slug = slug, "Replacing existing field");
        }
        let index = self.fields.insert_at(position, slug, field)?;
        self.buffer.record(slug);
        debug!(
            field.slug = slug,
            field.field_type = field_type,
            field.position = index,
            "Field attached"
        );

        self.fields
            .get_mut(slug)
            .ok_or_else(|| FormError::FieldNotFound(slug.to_string()))
    }

    pub fn has_field(&self, slug: &str) -> bool {
        self.fields.contains(slug)
    }

    pub fn get(&self, slug: &str) -> Result<&Field> {
        self.fields
            .get(slug)
            .ok_or_else(|| FormError::FieldNotFound(slug.to_string()))
    }

    /// Alias of [`get`](Self::get).
    pub fn find(&self, slug: &str) -> Result<&Field> {
        self.get(slug)
    }

    pub fn get_mut(&mut self, slug: &str) -> Result<&mut Field> {
        self.fields
            .get_mut(slug)
            .ok_or_else(|| FormError::FieldNotFound(slug.to_string()))
    }

    /// Render position of `slug`.
    pub fn index_of(&self, slug: &str) -> Result<usize> {
        self.fields
            .index_of(slug)
            .ok_or_else(|| FormError::FieldNotFound(slug.to_string()))
    }

    /// Detaches a field and returns it.
    pub fn remove(&mut self, slug: &str) -> Result<Field> {
        let field = self.fields.remove(slug)?;
        debug!(field.slug = slug, "Field removed");
        Ok(field)
    }

    /// Sets the render order. Listed slugs come first; the rest keep their
    /// relative order after them.
    pub fn reorder<S: AsRef<str>>(&mut self, positions: &[S]) -> Result<()> {
        self.fields.reorder(positions)?;
        Ok(())
    }

    /// Fields in render order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Slugs in render order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // -------------------------------------------------------------------------
    // Names
    // -------------------------------------------------------------------------

    /// Adds a prefix to every field's name, inside any added earlier.
    pub fn add_field_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.field_names.push(name.into());
        for field in self.fields.values_mut() {
            field.set_form_names(self.field_names.clone());
        }
        self
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    // -------------------------------------------------------------------------
    // Buffering and rows
    // -------------------------------------------------------------------------

    /// Runs `body`, then applies `properties` to every field it created.
    ///
    /// Scopes nest: a field created in an inner call also receives the
    /// outer call's properties (applied after the inner ones). If `body`
    /// fails the error is returned and no properties are applied.
    pub fn run_buffered<I, K, F>(&mut self, properties: I, body: F) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
        F: FnOnce(&mut Form) -> Result<()>,
    {
        let properties: Vec<(String, Value)> = properties.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let scope = self.buffer.open();
        let outcome = body(self);
        let created = self.buffer.close(scope);
        outcome?;

        for slug in &created {
            if let Some(field) = self.fields.get_mut(slug) {
                field
                    .properties_mut()
                    .merge(properties.iter().map(|(k, v)| (k, v)))?;
            }
        }
        Ok(())
    }

    /// Groups the fields `body` creates into a row and returns the row id.
    ///
    /// Without an explicit id the form numbers rows `row-1`, `row-2`, ...
    /// Reusing an existing id adds more fields to that row. The row element
    /// is registered before `body` runs, so `body` can configure it through
    /// [`Form::row_mut`]. A new row is dropped again if `body` fails.
    pub fn add_row<F>(&mut self, body: F, row_id: Option<&str>) -> Result<String>
    where
        F: FnOnce(&mut Form) -> Result<()>,
    {
        let row_id = match row_id {
            Some(id) => id.to_string(),
            None => self.next_row_id(),
        };
        let created = !self.rows.contains(&row_id);
        if created {
            let row = Element::row(row_id.as_str(), &self.options.row_class);
            self.rows.push(row_id.as_str(), row)?;
        }

        let outcome = self.run_buffered([(PropertyKey::Row.as_str(), Value::String(row_id.clone()))], body);
        if let Err(err) = outcome {
            if created {
                self.rows.remove(&row_id)?;
            }
            return Err(err);
        }
        debug!(row.id = %row_id, "Row added");
        Ok(row_id)
    }

    fn next_row_id(&mut self) -> String {
        loop {
            self.row_counter += 1;
            let id = format!("row-{}", self.row_counter);
            if !self.rows.contains(&id) {
                return id;
            }
        }
    }

    pub fn row(&self, id: &str) -> Option<&Element> {
        self.rows.get(id)
    }

    pub fn row_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.rows.get_mut(id)
    }

    /// Registered rows in creation order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.rows.iter()
    }

    /// Fields grouped by their `row` property, groups in order of first
    /// appearance. Fields without a row form the `None` group.
    pub fn fields_by_row(&self) -> Vec<(Option<&str>, Vec<&Field>)> {
        let mut groups: Vec<(Option<&str>, Vec<&Field>)> = Vec::new();
        for field in self.fields.values() {
            let row = field.properties().row();
            match groups.iter_mut().find(|(r, _)| *r == row) {
                Some((_, fields)) => fields.push(field),
                None => groups.push((row, vec![field])),
            }
        }
        groups
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// See [`EventBus::bind`].
    pub fn bind<F>(&mut self, event: &str, callback: F, identifier: Option<&str>) -> &mut Self
    where
        F: Fn(&mut EventArgs<'_>) -> Option<String> + 'static,
    {
        self.events.bind(event, callback, identifier);
        self
    }

    pub fn unbind(&mut self, event: &str, identifier: Option<&str>) -> &mut Self {
        self.events.unbind(event, identifier);
        self
    }

    /// Number of callbacks bound for `event`.
    pub fn binding(&self, event: &str) -> usize {
        self.events.binding_count(event)
    }

    /// See [`EventBus::add_binder`].
    pub fn add_binder<B: Binder + 'static>(&mut self, binder: B, name: Option<&str>) -> String {
        self.events.add_binder(binder, name)
    }

    pub fn remove_binder(&mut self, name: &str) -> bool {
        self.events.remove_binder(name)
    }

    /// Fires an event on this form's bus.
    pub fn fire(&self, event: &str, args: &mut EventArgs<'_>) -> Result<String> {
        self.events.fire(event, args)
    }

    /// Runs `callback` on every new field before it is attached.
    pub fn on_new_field<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Field) + 'static,
    {
        self.bind(
            Lifecycle::NewField.as_str(),
            move |args: &mut EventArgs<'_>| {
                if let EventArgs::NewField(field) = args {
                    callback(&mut **field);
                }
                None
            },
            None,
        )
    }

    pub fn before_field<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Form, &Field) -> Option<String> + 'static,
    {
        self.bind_field_hook(Lifecycle::BeforeField, callback)
    }

    pub fn after_field<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Form, &Field) -> Option<String> + 'static,
    {
        self.bind_field_hook(Lifecycle::AfterField, callback)
    }

    pub fn before_row<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Element, &[&Field]) -> Option<String> + 'static,
    {
        self.bind_row_hook(Lifecycle::BeforeRow, callback)
    }

    pub fn after_row<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Element, &[&Field]) -> Option<String> + 'static,
    {
        self.bind_row_hook(Lifecycle::AfterRow, callback)
    }

    pub fn before_form<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Form) -> Option<String> + 'static,
    {
        self.bind_form_hook(Lifecycle::BeforeForm, callback)
    }

    pub fn after_form<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Form) -> Option<String> + 'static,
    {
        self.bind_form_hook(Lifecycle::AfterForm, callback)
    }

    fn bind_field_hook<F>(&mut self, event: Lifecycle, callback: F) -> &mut Self
    where
        F: Fn(&Form, &Field) -> Option<String> + 'static,
    {
        self.bind(
            event.as_str(),
            move |args: &mut EventArgs<'_>| match *args {
                EventArgs::Field { form, field } => callback(form, field),
                _ => None,
            },
            None,
        )
    }

    fn bind_row_hook<F>(&mut self, event: Lifecycle, callback: F) -> &mut Self
    where
        F: Fn(&Element, &[&Field]) -> Option<String> + 'static,
    {
        self.bind(
            event.as_str(),
            move |args: &mut EventArgs<'_>| match *args {
                EventArgs::Row { row, fields } => callback(row, fields),
                _ => None,
            },
            None,
        )
    }

    fn bind_form_hook<F>(&mut self, event: Lifecycle, callback: F) -> &mut Self
    where
        F: Fn(&Form) -> Option<String> + 'static,
    {
        self.bind(
            event.as_str(),
            move |args: &mut EventArgs<'_>| match *args {
                EventArgs::Form(form) => callback(form),
                _ => None,
            },
            None,
        )
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// `beforeForm` output followed by the renderer's opening tag.
    pub fn open(&self) -> Result<String> {
        let mut out = self.fire(Lifecycle::BeforeForm.as_str(), &mut EventArgs::Form(self))?;
        out.push_str(&self.renderer.form_open(self));
        Ok(out)
    }

    /// `afterForm` output followed by the renderer's closing tag.
    pub fn close(&self) -> Result<String> {
        let mut out = self.fire(Lifecycle::AfterForm.as_str(), &mut EventArgs::Form(self))?;
        out.push_str(&self.renderer.form_close(self));
        Ok(out)
    }

    /// Renders every non-skipped field in position order.
    ///
    /// Fields sharing a registered row render together, wrapped in the row
    /// markup, at the position of the row's first field. Each field's
    /// `rowSize` is refreshed first: the number of visible fields in its row,
    /// or 0 for standalone and skipped fields. Chunks are joined with
    /// newlines.
    pub fn render(&mut self) -> Result<String> {
        let layout = self.layout();
        let row_sizes: HashMap<&str, usize> = layout
            .iter()
            .filter(|(row, _)| row.is_some())
            .flat_map(|(_, slugs)| slugs.iter().map(move |slug| (slug.as_str(), slugs.len())))
            .collect();
        for field in self.fields.values_mut() {
            let size = row_sizes.get(field.slug()).copied().unwrap_or(0);
            field.properties_mut().set_row_size(size);
        }

        let mut chunks = Vec::with_capacity(layout.len());
        for (row, slugs) in &layout {
            let fields: Vec<&Field> = slugs.iter().filter_map(|slug| self.fields.get(slug)).collect();
            match row.as_deref().and_then(|id| self.rows.get(id)) {
                Some(element) => chunks.push(self.render_row(element, &fields)?),
                None => {
                    for field in fields {
                        chunks.push(self.emit_field(field)?);
                    }
                }
            }
        }
        Ok(chunks.join("\n"))
    }

    /// `open`, `render`, and `close`, joined with newlines.
    pub fn html(&mut self) -> Result<String> {
        let body = self.render()?;
        Ok([self.open()?, body, self.close()?].join("\n"))
    }

    /// Renders one field (with its field events) outside of any row.
    pub fn render_field(&self, slug: &str) -> Result<String> {
        self.emit_field(self.get(slug)?)
    }

    fn render_row(&self, row: &Element, fields: &[&Field]) -> Result<String> {
        let mut out = self.fire(Lifecycle::BeforeRow.as_str(), &mut EventArgs::Row { row, fields })?;

        let mut parts = Vec::with_capacity(fields.len() + 2);
        parts.push(self.renderer.row_open(row, fields));
        for field in fields {
            parts.push(self.emit_field(field)?);
        }
        parts.push(self.renderer.row_close(row, fields));
        out.push_str(&parts.join("\n"));

        out.push_str(&self.fire(Lifecycle::AfterRow.as_str(), &mut EventArgs::Row { row, fields })?);
        Ok(out)
    }

    fn emit_field(&self, field: &Field) -> Result<String> {
        let mut out = self.fire(
            Lifecycle::BeforeField.as_str(),
            &mut EventArgs::Field { form: self, field },
        )?;

        let markup = if field.is_raw() {
            field.value_text()
        } else if self.macros.contains(field.field_type()) {
            self.macros
                .call(field.field_type(), self, field, self.renderer.as_ref())?
        } else {
            self.renderer.field(self, field)
        };
        out.push_str(&markup);

        out.push_str(&self.fire(
            Lifecycle::AfterField.as_str(),
            &mut EventArgs::Field { form: self, field },
        )?);
        Ok(out)
    }

    /// Render chunks: a registered row with all its visible fields, or a
    /// single standalone field.
    fn layout(&self) -> Vec<(Option<String>, Vec<String>)> {
        let mut layout: Vec<(Option<String>, Vec<String>)> = Vec::new();
        let mut row_slots: HashMap<&str, usize> = HashMap::new();
        let mut unregistered: HashSet<&str> = HashSet::new();

        for field in self.fields.values().filter(|f| !f.properties().skip()) {
            let slug = field.slug().to_string();
            match field.properties().row() {
                Some(row) if self.rows.contains(row) => match row_slots.get(row) {
                    Some(&slot) => layout[slot].1.push(slug),
                    None => {
                        row_slots.insert(row, layout.len());
                        layout.push((Some(row.to_string()), vec![slug]));
                    }
                },
                Some(row) => {
                    if unregistered.insert(row) {
                        warn!(row.id = row, "Field references an unregistered row; rendering it standalone");
                    }
                    layout.push((None, vec![slug]));
                }
                None => layout.push((None, vec![slug])),
            }
        }
        layout
    }
}
