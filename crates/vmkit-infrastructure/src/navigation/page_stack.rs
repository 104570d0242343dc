//! In-memory page history

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use vmkit_domain::error::Result;
use vmkit_domain::ports::navigation::PlatformNavigator;

/// Platform navigator keeping page names on a stack
///
/// Route actions push pages; back navigation pops them. The bottom page
/// is never popped.
#[derive(Debug, Default)]
pub struct PageStack {
    pages: Mutex<Vec<String>>,
}

impl PageStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack starting at `root`
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            pages: Mutex::new(vec![root.into()]),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Show `page` on top of the current one
    pub fn push(&self, page: impl Into<String>) {
        let page = page.into();
        debug!(page = %page, "Pushed page");
        self.lock().push(page);
    }

    /// Page currently on top
    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    /// Number of pages in the history
    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    /// Every page, bottom first
    pub fn pages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Remove the top page unless it is the only one
    pub fn pop(&self) -> Option<String> {
        let mut pages = self.lock();
        if pages.len() > 1 { pages.pop() } else { None }
    }
}

#[async_trait]
impl PlatformNavigator for PageStack {
    async fn go_back(&self) -> Result<bool> {
        Ok(self.pop().is_some())
    }

    fn can_go_back(&self) -> bool {
        self.depth() > 1
    }
}
