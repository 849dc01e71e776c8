pub mod labels;
pub mod panel;
pub mod tooltips;

pub use labels::hub_label_overlay;
pub use panel::ui_panel;
pub use tooltips::tooltip_overlay;
