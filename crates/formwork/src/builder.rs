//! The form factory: renderer registry, shared macros and kinds, and the
//! listeners every new form starts with.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::config::BuilderConfig;
use crate::context::FormContext;
use crate::error::{FormError, Result};
use crate::events::{Binder, EventArgs, EventBus};
use crate::field::Field;
use crate::form::Form;
use crate::kinds::{FieldKind, FieldKinds};
use crate::macros::Macros;
use crate::renderer::Renderer;

/// Name reported when no renderer is configured at all.
const DEFAULT_RENDERER_NAME: &str = "default";

struct RendererSlot {
    factory: Box<dyn Fn() -> Rc<dyn Renderer>>,
    resolved: OnceCell<Rc<dyn Renderer>>,
}

/// Creates forms that share renderers, macros, field kinds, and default
/// listeners.
///
/// Renderers are registered as factories and built on first use; later
/// requests reuse the same instance.
///
/// # Example
///
/// ```rust
/// use formwork::{Element, Field, Form, FormBuilder, Renderer};
///
/// struct Plain;
///
/// impl Renderer for Plain {
///     fn is_valid_type(&self, _: &str) -> bool { true }
///     fn form_open(&self, _: &Form) -> String { "<form>".into() }
///     fn form_close(&self, _: &Form) -> String { "</form>".into() }
///     fn row_open(&self, _: &Element, _: &[&Field]) -> String { String::new() }
///     fn row_close(&self, _: &Element, _: &[&Field]) -> String { String::new() }
///     fn field(&self, _: &Form, f: &Field) -> String { format!("<{}>", f.slug()) }
/// }
///
/// let mut builder = FormBuilder::new();
/// builder.add_renderer("plain", || Plain).set_default_renderer("plain");
///
/// let mut form = builder
///     .build(|form| {
///         form.add("email", "email")?;
///         Ok(())
///     })
///     .unwrap();
/// assert_eq!(form.render().unwrap(), "<email>");
/// ```
pub struct FormBuilder {
    config: BuilderConfig,
    renderers: HashMap<String, RendererSlot>,
    macros: Macros,
    kinds: FieldKinds,
    defaults: EventBus,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut renderers: Vec<_> = self.renderers.keys().collect();
        renderers.sort_unstable();
        f.debug_struct("FormBuilder")
            .field("config", &self.config)
            .field("renderers", &renderers)
            .field("macros", &self.macros)
            .field("kinds", &self.kinds)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            renderers: HashMap::new(),
            macros: Macros::new(),
            kinds: FieldKinds::with_builtins(),
            defaults: EventBus::new(),
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BuilderConfig {
        &mut self.config
    }

    // -------------------------------------------------------------------------
    // Renderers
    // -------------------------------------------------------------------------

    /// Registers a renderer factory. The factory runs at most once.
    pub fn add_renderer<R, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        R: Renderer + 'static,
        F: Fn() -> R + 'static,
    {
        let slot = RendererSlot {
            factory: Box::new(move || Rc::new(factory()) as Rc<dyn Renderer>),
            resolved: OnceCell::new(),
        };
        self.renderers.insert(name.to_string(), slot);
        debug!(renderer.name = name, "Renderer registered");
        self
    }

    pub fn has_renderer(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    pub fn set_default_renderer(&mut self, name: impl Into<String>) -> &mut Self {
        self.config.default_renderer = Some(name.into());
        self
    }

    /// The renderer forms get unless they ask for another.
    pub fn default_renderer(&self) -> Option<&str> {
        self.config
            .form
            .renderer
            .as_deref()
            .or(self.config.default_renderer.as_deref())
    }

    /// Resolves a renderer by name, building it on first request.
    ///
    /// # Errors
    ///
    /// `RendererNotFound` if nothing is registered under `name`.
    pub fn renderer(&self, name: &str) -> Result<Rc<dyn Renderer>> {
        let slot = self
            .renderers
            .get(name)
            .ok_or_else(|| FormError::RendererNotFound(name.to_string()))?;
        let renderer = slot.resolved.get_or_init(|| {
            debug!(renderer.name = name, "Resolving renderer");
            (slot.factory)()
        });
        Ok(Rc::clone(renderer))
    }

    // -------------------------------------------------------------------------
    // Macros and kinds
    // -------------------------------------------------------------------------

    pub fn macros(&self) -> &Macros {
        &self.macros
    }

    pub fn add_macro<F>(&mut self, name: &str, render: F) -> &mut Self
    where
        F: Fn(&Form, &Field, &dyn Renderer) -> String + 'static,
    {
        self.macros.add(name, render);
        self
    }

    /// Registers a macro whose `init` runs once, just before its first use.
    pub fn add_macro_with_init<F, I>(&mut self, name: &str, render: F, init: I) -> &mut Self
    where
        F: Fn(&Form, &Field, &dyn Renderer) -> String + 'static,
        I: FnOnce() + 'static,
    {
        self.macros.add_with_init(name, render, init);
        self
    }

    pub fn is_macro(&self, name: &str) -> bool {
        self.macros.contains(name)
    }

    /// Invokes a macro directly.
    pub fn call_macro(&self, name: &str, form: &Form, field: &Field) -> Result<String> {
        self.macros.call(name, form, field, form.renderer())
    }

    pub fn kinds(&self) -> &FieldKinds {
        &self.kinds
    }

    pub fn register_kind(&mut self, name: &str, kind: FieldKind) -> &mut Self {
        self.kinds.register(name, kind);
        self
    }

    // -------------------------------------------------------------------------
    // Default listeners
    // -------------------------------------------------------------------------

    /// Listeners copied into every form created afterwards.
    pub fn defaults(&self) -> &EventBus {
        &self.defaults
    }

    pub fn bind<F>(&mut self, event: &str, callback: F, identifier: Option<&str>) -> &mut Self
    where
        F: Fn(&mut EventArgs<'_>) -> Option<String> + 'static,
    {
        self.defaults.bind(event, callback, identifier);
        self
    }

    pub fn unbind(&mut self, event: &str, identifier: Option<&str>) -> &mut Self {
        self.defaults.unbind(event, identifier);
        self
    }

    pub fn add_binder<B: Binder + 'static>(&mut self, binder: B, name: Option<&str>) -> String {
        self.defaults.add_binder(binder, name)
    }

    pub fn remove_binder(&mut self, name: &str) -> bool {
        self.defaults.remove_binder(name)
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    /// A new form using the default renderer.
    pub fn form(&self) -> Result<Form> {
        let name = self
            .default_renderer()
            .ok_or_else(|| FormError::RendererNotFound(DEFAULT_RENDERER_NAME.to_string()))?;
        self.form_with_renderer(name)
    }

    /// A new form using the renderer registered as `name`.
    pub fn form_with_renderer(&self, name: &str) -> Result<Form> {
        let renderer = self.renderer(name)?;
        let form = Form::with_options(renderer, self.config.form.clone())
            .with_macros(self.macros.clone())
            .with_kinds(self.kinds.clone())
            .with_events(&self.defaults);
        debug!(renderer.name = name, "Form created");
        Ok(form)
    }

    /// A new form, configured by `configure` before it is returned.
    pub fn build<F>(&self, configure: F) -> Result<Form>
    where
        F: FnOnce(&mut Form) -> Result<()>,
    {
        let mut form = self.form()?;
        configure(&mut form)?;
        Ok(form)
    }

    /// A context wrapping a fresh default form.
    pub fn context(&self) -> Result<FormContext> {
        Ok(FormContext::new(self.form()?))
    }
}
