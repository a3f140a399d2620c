use crate::unit::{Control, ControlId, ControlValue};

use super::{BooleanControl, ControlUi, MenuControl, NumericControl, StringControl};

/// The widgets installed for one control, by control kind.
#[derive(Clone)]
pub enum BoundControl {
    Integer(NumericControl),
    Float(NumericControl),
    Boolean(BooleanControl),
    Enumeration(MenuControl),
    String(StringControl),
}

/// Association between a unit's control and the widgets showing it.
#[derive(Clone)]
pub struct ControlBinding {
    id: ControlId,
    name: String,
    bound: BoundControl,
}

impl ControlBinding {
    pub fn new(id: ControlId, name: impl Into<String>, bound: BoundControl) -> Self {
        ControlBinding {
            id,
            name: name.into(),
            bound,
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bound(&self) -> &BoundControl {
        &self.bound
    }

    fn ui(&self) -> &dyn ControlUi {
        match &self.bound {
            BoundControl::Integer(c) | BoundControl::Float(c) => c,
            BoundControl::Boolean(c) => c,
            BoundControl::Enumeration(c) => c,
            BoundControl::String(c) => c,
        }
    }

    pub fn apply_sensitivity(&self, control: &Control) {
        self.ui().apply_sensitivity(control)
    }

    pub fn pull_value(&self, value: &ControlValue) {
        self.ui().pull_value(value)
    }

    pub fn widget_value(&self) -> Option<ControlValue> {
        self.ui().widget_value()
    }

    pub fn refresh_display(&self) {
        self.ui().refresh_display()
    }
}
