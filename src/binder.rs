//! Template Binder - Render a template against observable state.
//!
//! A binder owns a template, a [`Surface`] and an ordered list of bindings
//! (name → [`Observable`]). Binding a container subscribes the binder to it;
//! from then on every change of that container re-renders the whole surface.
//!
//! # Example
//!
//! ```
//! use spark_bind::{Observable, TemplateBinder, TextBuffer};
//!
//! let count = Observable::new(5);
//! let binder = TemplateBinder::new("Count: %count%", TextBuffer::new());
//! binder.add_state("count", &count);
//!
//! // Binding alone does not render.
//! assert_eq!(binder.surface().content(), "");
//!
//! binder.render().unwrap();
//! assert_eq!(binder.surface().content(), "Count: 5");
//!
//! count.set(6);
//! assert_eq!(binder.surface().content(), "Count: 6");
//! ```
//!
//! # Lifetimes
//!
//! The binder keeps its containers alive; containers only hold a weak link
//! back to the binder. Removing a binding, clearing all bindings, or dropping
//! the last binder handle releases the matching subscriptions.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::fmt::Display;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::state::Observable;
use crate::surface::{Surface, SurfaceError};
use crate::template::{substitute, tokens, DEFAULT_DELIMITER};
use crate::types::ListenerId;

// =============================================================================
// Options
// =============================================================================

/// Binder configuration.
///
/// ```
/// use spark_bind::{BinderOptions, TemplateBinder, TextBuffer};
///
/// let binder = TemplateBinder::with_options(
///     "$name$ is 100% done",
///     TextBuffer::new(),
///     BinderOptions { delimiter: '$', ..Default::default() },
/// );
/// assert_eq!(binder.rendered(), "$name$ is 100% done");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderOptions {
    /// Character wrapped around a name to form its token.
    pub delimiter: char,
    /// Render once right after each `add_state`.
    pub render_on_bind: bool,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            render_on_bind: false,
        }
    }
}

// =============================================================================
// Bindings
// =============================================================================

/// Type-erased view of a bound container.
trait BoundSource {
    /// Current value as text.
    fn text(&self) -> String;
    /// Drop the listener the binder registered on this container.
    fn release(&self, id: ListenerId);
}

impl<T> BoundSource for Observable<T>
where
    T: Clone + PartialEq + Display + 'static,
{
    fn text(&self) -> String {
        self.with(|value| value.to_string())
    }

    fn release(&self, id: ListenerId) {
        self.off_update(id);
    }
}

struct Binding {
    name: String,
    source: Box<dyn BoundSource>,
    listener: ListenerId,
}

struct BinderInner<S> {
    template: RefCell<String>,
    surface: RefCell<S>,
    bindings: RefCell<Vec<Binding>>,
    options: BinderOptions,
}

impl<S: Surface> BinderInner<S> {
    fn rendered(&self) -> String {
        let template = self.template.borrow();
        let bindings = self.bindings.borrow();
        substitute(
            &template,
            bindings
                .iter()
                .map(|binding| (binding.name.as_str(), binding.source.text())),
            self.options.delimiter,
        )
    }

    fn render(&self) -> Result<(), SurfaceError> {
        let content = self.rendered();
        let mut surface = self
            .surface
            .try_borrow_mut()
            .map_err(|_| SurfaceError::Busy)?;
        trace!(bytes = content.len(), "rendering template");
        surface.replace_content(&content)
    }

    /// Render from a context that has nobody to report errors to.
    fn render_or_warn(&self) {
        if let Err(err) = self.render() {
            warn!(error = %err, "template render failed");
        }
    }
}

impl<S> Drop for BinderInner<S> {
    fn drop(&mut self) {
        for binding in self.bindings.get_mut().drain(..) {
            binding.source.release(binding.listener);
        }
    }
}

// =============================================================================
// Template Binder
// =============================================================================

/// Surface whose content is a template rendered against bound containers.
///
/// `TemplateBinder` is a handle; clones share the same template, surface and
/// bindings.
pub struct TemplateBinder<S: Surface + 'static> {
    inner: Rc<BinderInner<S>>,
}

impl<S: Surface + 'static> Clone for TemplateBinder<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Surface + 'static> TemplateBinder<S> {
    /// Create a binder with default options and no bindings. Does not render.
    pub fn new(template: impl Into<String>, surface: S) -> Self {
        Self::with_options(template, surface, BinderOptions::default())
    }

    /// Create a binder with explicit options and no bindings. Does not render.
    pub fn with_options(template: impl Into<String>, surface: S, options: BinderOptions) -> Self {
        Self {
            inner: Rc::new(BinderInner {
                template: RefCell::new(template.into()),
                surface: RefCell::new(surface),
                bindings: RefCell::new(Vec::new()),
                options,
            }),
        }
    }

    /// Bind `state` under `name` and re-render on each of its changes.
    ///
    /// Names are not deduplicated: binding the same name twice adds a second
    /// entry, and the earlier entry consumes the token first.
    pub fn add_state<T>(&self, name: impl Into<String>, state: &Observable<T>)
    where
        T: Clone + PartialEq + Display + 'static,
    {
        let name = name.into();
        let weak: Weak<BinderInner<S>> = Rc::downgrade(&self.inner);
        let listener = state.on_update(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.render_or_warn();
            }
        });

        debug!(name = %name, listener = %listener, "state bound");
        self.inner.bindings.borrow_mut().push(Binding {
            name,
            source: Box::new(state.clone()),
            listener,
        });

        if self.inner.options.render_on_bind {
            self.inner.render_or_warn();
        }
    }

    /// Remove the first binding named `name` and release its subscription.
    ///
    /// Unknown names are ignored. Does not re-render.
    pub fn remove_state(&self, name: &str) {
        let removed = {
            let mut bindings = self.inner.bindings.borrow_mut();
            let index = bindings.iter().position(|binding| binding.name == name);
            index.map(|index| bindings.remove(index))
        };

        if let Some(binding) = removed {
            binding.source.release(binding.listener);
            debug!(name = %name, listener = %binding.listener, "state unbound");
        }
    }

    /// Remove every binding and release every subscription. Does not re-render.
    pub fn clear_states(&self) {
        let removed = std::mem::take(&mut *self.inner.bindings.borrow_mut());
        debug!(count = removed.len(), "all states unbound");
        for binding in removed {
            binding.source.release(binding.listener);
        }
    }

    /// Substitute the template and replace the surface content with the result.
    pub fn render(&self) -> Result<(), SurfaceError> {
        self.inner.render()
    }

    /// The text [`render`](Self::render) would write, without touching the surface.
    pub fn rendered(&self) -> String {
        self.inner.rendered()
    }

    /// Current template.
    pub fn template(&self) -> String {
        self.inner.template.borrow().clone()
    }

    /// Replace the template. Does not re-render.
    pub fn set_template(&self, template: impl Into<String>) {
        *self.inner.template.borrow_mut() = template.into();
    }

    /// Names of the bindings, in substitution order.
    pub fn binding_names(&self) -> Vec<String> {
        self.inner
            .bindings
            .borrow()
            .iter()
            .map(|binding| binding.name.clone())
            .collect()
    }

    /// Token names in the template that no binding covers, in template order.
    ///
    /// Rendering leaves these tokens as they are.
    pub fn unbound_tokens(&self) -> Vec<String> {
        let template = self.inner.template.borrow();
        let bindings = self.inner.bindings.borrow();
        let mut unbound: Vec<String> = Vec::new();

        for name in tokens(&template, self.inner.options.delimiter) {
            let bound = bindings.iter().any(|binding| binding.name == name);
            if !bound && !unbound.iter().any(|seen| seen == name) {
                unbound.push(name.to_string());
            }
        }

        unbound
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.inner.bindings.borrow().len()
    }

    /// Whether there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Options this binder was created with.
    pub fn options(&self) -> BinderOptions {
        self.inner.options
    }

    /// Borrow the surface.
    ///
    /// Renders triggered while this borrow is alive fail with
    /// [`SurfaceError::Busy`].
    pub fn surface(&self) -> Ref<'_, S> {
        self.inner.surface.borrow()
    }

    /// Mutably borrow the surface. Same caveat as [`surface`](Self::surface).
    pub fn surface_mut(&self) -> RefMut<'_, S> {
        self.inner.surface.borrow_mut()
    }
}

impl<S: Surface + 'static> fmt::Debug for TemplateBinder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateBinder")
            .field("template", &*self.inner.template.borrow())
            .field("bindings", &self.binding_names())
            .field("options", &self.inner.options)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
