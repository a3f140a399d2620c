use std::rc::Rc;

use log::warn;

use crate::unit::{Control, ControlValue};

use super::view::{Sensitive, ToggleView};
use super::ControlUi;

#[derive(Clone)]
pub enum BooleanWidget {
    /// Momentary action; the control is set to `true` on every press.
    OneShot(Rc<dyn Sensitive>),
    Toggle(Rc<dyn ToggleView>),
    Check(Rc<dyn ToggleView>),
}

#[derive(Clone)]
pub struct BooleanControl {
    widget: BooleanWidget,
}

impl BooleanControl {
    pub fn new(widget: BooleanWidget) -> Self {
        BooleanControl { widget }
    }

    pub fn is_one_shot(&self) -> bool {
        matches!(self.widget, BooleanWidget::OneShot(_))
    }

    fn toggle(&self) -> Option<&Rc<dyn ToggleView>> {
        match &self.widget {
            BooleanWidget::OneShot(_) => None,
            BooleanWidget::Toggle(t) | BooleanWidget::Check(t) => Some(t),
        }
    }
}

impl ControlUi for BooleanControl {
    fn apply_sensitivity(&self, control: &Control) {
        match &self.widget {
            BooleanWidget::OneShot(button) => button.set_interactive(control.enabled),
            BooleanWidget::Toggle(t) | BooleanWidget::Check(t) => {
                t.set_interactive(control.enabled)
            }
        }
    }

    fn pull_value(&self, value: &ControlValue) {
        let Some(toggle) = self.toggle() else {
            return;
        };

        match value {
            ControlValue::Boolean(active) => toggle.set_toggled_on(*active),
            other => warn!("Toggle cannot show a {} value", other.type_name()),
        }
    }

    fn widget_value(&self) -> Option<ControlValue> {
        self.toggle()
            .map(|t| ControlValue::Boolean(t.toggled_on()))
    }
}
