//! The host page, as seen by the interceptor and the normalizer.
//!
//! A browser binding implements [`HostPage`] over the DOM and translates DOM
//! events into [`PageEvent`]s dispatched at the capture phase. Tests and the
//! terminal composer implement it over plain data.

/// Opaque handle to an element on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// An element together with its stable test identifier, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: ElementId,
    pub test_id: Option<String>,
}

impl Element {
    pub fn new(id: u64, test_id: Option<&str>) -> Self {
        Self {
            id: ElementId(id),
            test_id: test_id.map(String::from),
        }
    }
}

/// The key part of a keydown event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn enter() -> Self {
        Self {
            key: "Enter".into(),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Enter without Shift, or Enter with Ctrl/Cmd.
    pub fn is_submit_combo(&self) -> bool {
        self.key == "Enter" && (self.ctrl || self.meta || !self.shift)
    }
}

/// Input the page session reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Pointer activation. `path[0]` is the target, followed by its ancestors
    /// innermost first.
    Click { path: Vec<Element>, trusted: bool },

    /// A key pressed while `focused` had focus.
    KeyDown {
        key: KeyPress,
        focused: Option<Element>,
        trusted: bool,
    },

    /// A batch of DOM mutations was observed.
    Mutation,
}

/// What the host must do with an event after the interceptor saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the event reach the page.
    Continue,
    /// Prevent the default action and stop all further propagation.
    Suppress,
}

/// Operations the gate needs from the host page.
pub trait HostPage: Send + Sync {
    /// Elements whose test id satisfies `matches`, in document order.
    fn query_test_ids(&self, matches: &dyn Fn(&str) -> bool) -> Vec<Element>;

    /// The element's text content.
    fn text_content(&self, id: ElementId) -> Option<String>;

    /// The element's form value, for textarea-like composers.
    fn form_value(&self, id: ElementId) -> Option<String>;

    /// Dispatch a synthetic (untrusted) bubbling, cancelable click.
    fn dispatch_click(&self, id: ElementId);

    fn remove_attribute(&self, id: ElementId, name: &str);

    fn set_style(&self, id: ElementId, property: &str, value: &str);
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
