//! Value-holding views and the stock controls built on them.

pub mod button;
/// Control capability and listener.
pub mod control;
pub mod label;
pub mod slider;

pub use button::OnOffButton;
pub use control::{Control, ControlBase, ControlListener};
pub use label::TextLabel;
pub use slider::HorizontalSlider;
