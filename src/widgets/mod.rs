//! Interactive page behaviors as plain state machines
//!
//! The browser script shipped with the site (`folio.js`) is generated from
//! the constants defined here, so the two never drift apart.

pub mod active_toc;
pub mod script;
pub mod tab;
pub mod theme;
pub mod tooltip;

pub use active_toc::{ActiveHeadingTracker, RootMargin};
pub use tab::TabIndicator;
pub use theme::Theme;
pub use tooltip::TooltipState;
