use crate::unit::{Control, ControlValue};

pub trait ControlUi {
    /// Mirrors the control's enabled state (and for menus, the availability
    /// of each entry) onto the widgets.
    fn apply_sensitivity(&self, control: &Control);

    /// Shows `value` without asking the unit for anything.
    fn pull_value(&self, value: &ControlValue);

    /// The value the widget currently displays, or `None` for widgets that
    /// hold no state.
    fn widget_value(&self) -> Option<ControlValue>;

    /// Re-renders secondary displays derived from the widget's value.
    fn refresh_display(&self) {}
}
