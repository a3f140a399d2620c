pub mod view;

mod control_ui;
pub use self::control_ui::ControlUi;

mod numeric_control;
pub use self::numeric_control::{
    digit_count, range_width, NumericControl, NumericPresentation, NumericWidget,
};

mod boolean_control;
pub use self::boolean_control::{BooleanControl, BooleanWidget};

mod menu_control;
pub use self::menu_control::MenuControl;

mod string_control;
pub use self::string_control::{StringCompanion, StringControl};

mod binding;
pub use self::binding::{BoundControl, ControlBinding};

mod factory;
pub use self::factory::{build_binding, RangeSpec, WidgetFactory};

mod sync;
pub use self::sync::{SyncController, Suppression};
