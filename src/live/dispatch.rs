//! Dispatch table: notification kind -> handler
//!
//! Built once by the dashboard and handed to the live channel manager, so the
//! routing is a value that can be listed and exercised on its own.

use super::Notification;
use std::collections::HashMap;
use std::fmt;

/// A registered reaction to one notification kind
pub type Handler = Box<dyn Fn(&Notification) + Send + Sync>;

#[derive(Default)]
pub struct DispatchTable {
    handlers: HashMap<String, Handler>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`, replacing any previous one
    pub fn register<F>(&mut self, kind: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.handlers.insert(kind.into(), Box::new(handler));
        self
    }

    /// Invoke the handler for the notification's kind
    ///
    /// Returns false when the kind has no handler (ignored, not an error).
    pub fn dispatch(&self, notification: &Notification) -> bool {
        match self.handlers.get(&notification.kind) {
            Some(handler) => {
                handler(notification);
                true
            }
            None => false,
        }
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("kinds", &self.kinds())
            .finish()
    }
}
