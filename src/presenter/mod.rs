//! Presenter module
//!
//! Pure mappings from timer state to the values a renderer displays. Nothing
//! here touches the timer itself.

pub mod animation;
pub mod view;

pub use animation::{AnimationDescriptor, Easing, Repeat};
pub use view::StageView;
