//! A log of callback invocations to assert on dispatch order.
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

/// Records `(name, payload)` pairs in the order the callbacks ran.
///
/// Clones share the same log.
#[derive(Debug)]
pub struct Recorder<P> {
    calls: Rc<RefCell<Vec<(&'static str, P)>>>,
}

impl<P> Clone for Recorder<P> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
        }
    }
}

impl<P> Default for Recorder<P> {
    fn default() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<P: Clone + Debug + 'static> Recorder<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records its payload under the given name.
    pub fn callback(&self, name: &'static str) -> impl Fn(&P) + 'static {
        let calls = self.calls.clone();
        move |payload: &P| calls.borrow_mut().push((name, payload.clone()))
    }

    #[must_use]
    pub fn calls(&self) -> Vec<(&'static str, P)> {
        self.calls.borrow().clone()
    }

    /// Names of the callbacks in the order they ran.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|(name, _)| *name).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}
