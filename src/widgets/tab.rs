//! Navigation tab indicator

use crate::config::NavItemConfig;

/// Which navigation item the indicator sits under
#[derive(Debug, Clone)]
pub struct TabIndicator {
    items: Vec<NavItemConfig>,
    active: usize,
}

impl TabIndicator {
    /// Place the indicator for the current path
    pub fn new(items: Vec<NavItemConfig>, pathname: &str) -> Self {
        let active = active_index(&items, pathname);
        Self { items, active }
    }

    /// Follow a route change
    pub fn navigate(&mut self, pathname: &str) {
        self.active = active_index(&self.items, pathname);
    }

    /// Move the indicator to a clicked item. Unknown names are ignored.
    pub fn select(&mut self, name: &str) -> bool {
        match self.items.iter().position(|item| item.name == name) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> Option<&NavItemConfig> {
        self.items.get(self.active)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active().map(|item| item.name == name).unwrap_or(false)
    }

    pub fn items(&self) -> &[NavItemConfig] {
        &self.items
    }
}

/// Exact path match, otherwise the first item
fn active_index(items: &[NavItemConfig], pathname: &str) -> usize {
    items
        .iter()
        .position(|item| item.href == pathname)
        .unwrap_or(0)
}
