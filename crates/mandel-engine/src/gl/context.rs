use std::cell::Cell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use super::api::GlApi;

/// Shared handle to the GL function table of the shell's context.
///
/// Every resource keeps a clone so it can release its object on drop. The
/// shell clears the liveness flag before it destroys the context; resources
/// dropped after that point leave their objects to the driver instead of
/// calling into a dead context.
#[derive(Clone)]
pub struct Gl {
    inner: Rc<GlInner>,
}

struct GlInner {
    api: Box<dyn GlApi>,
    alive: Cell<bool>,
}

impl Gl {
    pub fn new(api: Box<dyn GlApi>) -> Self {
        Self {
            inner: Rc::new(GlInner {
                api,
                alive: Cell::new(true),
            }),
        }
    }

    /// Whether the owning context still exists.
    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    pub(crate) fn mark_lost(&self) {
        self.inner.alive.set(false);
    }
}

impl Deref for Gl {
    type Target = dyn GlApi;

    fn deref(&self) -> &Self::Target {
        &*self.inner.api
    }
}

impl fmt::Debug for Gl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gl")
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}
