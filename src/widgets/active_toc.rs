//! Active-heading tracking for the table of contents

/// Viewport band a heading must enter to become active, in percent of the
/// viewport height trimmed from the top and bottom edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top_percent: f64,
    pub bottom_percent: f64,
}

/// `-20% 0% -35% 0px`: the band runs from 20% to 65% of the viewport height
pub const ROOT_MARGIN: RootMargin = RootMargin {
    top_percent: 20.0,
    bottom_percent: 35.0,
};

impl RootMargin {
    /// CSS `rootMargin` string for an IntersectionObserver
    pub fn to_css(&self) -> String {
        format!("-{}% 0% -{}% 0px", self.top_percent, self.bottom_percent)
    }

    /// Whether a point `top` pixels below the viewport's top edge is inside the band
    pub fn in_band(&self, top: f64, viewport_height: f64) -> bool {
        let start = viewport_height * self.top_percent / 100.0;
        let end = viewport_height * (1.0 - self.bottom_percent / 100.0);
        top >= start && top <= end
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        ROOT_MARGIN
    }
}

/// Tracks which heading of a post is currently being read
///
/// Reference model for the observer in `folio.js`; the script mirrors
/// `observe` and shares `ROOT_MARGIN`.
#[derive(Debug, Clone, Default)]
pub struct ActiveHeadingTracker {
    ids: Vec<String>,
    active: Option<String>,
}

impl ActiveHeadingTracker {
    /// Track the given anchor ids
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids, active: None }
    }

    /// Feed one visibility change.
    ///
    /// A heading entering the band becomes active. Leaving the band never
    /// clears the active heading, so the last one entered stays highlighted.
    /// Returns whether the active id changed.
    pub fn observe(&mut self, id: &str, is_intersecting: bool) -> bool {
        if !is_intersecting || !self.ids.iter().any(|tracked| tracked == id) {
            return false;
        }
        if self.active.as_deref() == Some(id) {
            return false;
        }
        self.active = Some(id.to_string());
        true
    }

    /// Feed a batch of visibility changes in delivery order
    pub fn observe_all<'a, I>(&mut self, entries: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let before = self.active.clone();
        for (id, is_intersecting) in entries {
            self.observe(id, is_intersecting);
        }
        before != self.active
    }

    /// Replace the tracked ids, e.g. after navigating to another post
    pub fn retrack(&mut self, ids: Vec<String>) {
        if let Some(active) = &self.active {
            if !ids.contains(active) {
                self.active = None;
            }
        }
        self.ids = ids;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active() == Some(id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ActiveHeadingTracker {
        ActiveHeadingTracker::new(vec!["intro".into(), "setup".into(), "usage".into()])
    }

    #[test]
    fn test_nothing_active_initially() {
        assert_eq!(tracker().active(), None);
    }

    #[test]
    fn test_latest_intersecting_wins() {
        let mut t = tracker();
        assert!(t.observe("intro", true));
        assert!(t.observe("setup", true));
        assert_eq!(t.active(), Some("setup"));
        // leaving does not clear
        assert!(!t.observe("setup", false));
        assert_eq!(t.active(), Some("setup"));
    }

    #[test]
    fn test_untracked_ids_ignored() {
        let mut t = tracker();
        assert!(!t.observe("comments", true));
        assert_eq!(t.active(), None);
    }

    #[test]
    fn test_batch_applies_in_order() {
        let mut t = tracker();
        let changed = t.observe_all([("intro", true), ("usage", true), ("setup", false)]);
        assert!(changed);
        assert!(t.is_active("usage"));
        assert!(!t.observe_all([("usage", true)]));
    }

    #[test]
    fn test_retrack_drops_stale_active() {
        let mut t = tracker();
        t.observe("intro", true);
        t.retrack(vec!["intro".into()]);
        assert_eq!(t.active(), Some("intro"));
        t.retrack(vec!["other".into()]);
        assert_eq!(t.active(), None);
    }

    #[test]
    fn test_root_margin_band() {
        assert_eq!(ROOT_MARGIN.to_css(), "-20% 0% -35% 0px");
        assert!(!ROOT_MARGIN.in_band(100.0, 1000.0));
        assert!(ROOT_MARGIN.in_band(200.0, 1000.0));
        assert!(ROOT_MARGIN.in_band(650.0, 1000.0));
        assert!(!ROOT_MARGIN.in_band(651.0, 1000.0));
    }
}
