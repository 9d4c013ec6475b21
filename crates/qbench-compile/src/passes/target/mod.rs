//! Target-specific compilation passes.
//!
//! These passes require target properties from the [`PropertySet`]
//! (coupling map, basis gates, layout) and produce circuits the target can
//! execute directly.
//!
//! [`PropertySet`]: crate::PropertySet

pub mod layout;
pub mod routing;
pub mod translation;

pub use layout::TrivialLayout;
pub use routing::BasicRouting;
pub use translation::BasisTranslation;
