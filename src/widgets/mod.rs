mod controls_panel;
pub use self::controls_panel::{ControlsPanel, PanelError, PanelView, INVALID_UNIT_HEADER};

mod format_selector;
pub use self::format_selector::{apply_format_choice, FormatSelection};

mod gtk_view;
pub use self::gtk_view::GtkPanelView;

mod unit_control_widget;
pub use self::unit_control_widget::UnitControlWidget;
