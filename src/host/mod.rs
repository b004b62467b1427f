mod binding;
mod properties;

pub use binding::{ChangeCallback, ErrorBoundary, HostBinding, RenderCallback};
pub use properties::{PropertyBag, SharedProperties};
