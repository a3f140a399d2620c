use std::rc::Rc;

use log::warn;

use crate::unit::{Control, ControlValue};

use super::view::{LabelView, NumericView};
use super::ControlUi;

/// Number of characters needed to print `n`, counting one for the sign of
/// non-positive numbers.
pub fn digit_count(n: i64) -> usize {
    let mut count = if n <= 0 { 1 } else { 0 };
    let mut magnitude = n.unsigned_abs();

    while magnitude != 0 {
        magnitude /= 10;
        count += 1;
    }
    count
}

/// Width of the widest value in `[min, max]`.
pub fn range_width(min: i64, max: i64) -> usize {
    digit_count(min).max(digit_count(max))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericPresentation {
    pub max_chars: usize,
    pub use_int: bool,
    pub display_width: usize,
    pub display_precision: usize,
}

impl NumericPresentation {
    pub fn integer(min: i64, max: i64) -> Self {
        NumericPresentation {
            max_chars: range_width(min, max),
            use_int: true,
            display_width: 0,
            display_precision: 0,
        }
    }

    pub fn float(min: f64, max: f64, display_width: usize, display_precision: usize) -> Self {
        NumericPresentation {
            max_chars: range_width(min as i64, max as i64),
            use_int: false,
            display_width,
            display_precision,
        }
    }

    pub fn format(&self, value: f64) -> String {
        if self.use_int {
            format!("{:>width$}", value.round() as i64, width = self.max_chars)
        } else {
            format!(
                "{:>width$.prec$}",
                value,
                width = self.display_width,
                prec = self.display_precision
            )
        }
    }
}

#[derive(Clone)]
pub enum NumericWidget {
    Slider {
        scale: Rc<dyn NumericView>,
        value_label: Rc<dyn LabelView>,
    },
    SpinButton(Rc<dyn NumericView>),
}

#[derive(Clone)]
pub struct NumericControl {
    label: Rc<dyn LabelView>,
    widget: NumericWidget,
    presentation: NumericPresentation,
}

impl NumericControl {
    pub fn new(
        label: Rc<dyn LabelView>,
        widget: NumericWidget,
        presentation: NumericPresentation,
    ) -> Self {
        NumericControl {
            label,
            widget,
            presentation,
        }
    }

    pub fn presentation(&self) -> &NumericPresentation {
        &self.presentation
    }

    pub fn is_spin_button(&self) -> bool {
        matches!(self.widget, NumericWidget::SpinButton(_))
    }

    fn primary(&self) -> &Rc<dyn NumericView> {
        match &self.widget {
            NumericWidget::Slider { scale, .. } => scale,
            NumericWidget::SpinButton(spin) => spin,
        }
    }
}

impl ControlUi for NumericControl {
    fn apply_sensitivity(&self, control: &Control) {
        self.primary().set_interactive(control.enabled);
        self.label.set_interactive(control.enabled);

        if let NumericWidget::Slider { value_label, .. } = &self.widget {
            value_label.set_interactive(control.enabled);
        }
    }

    fn pull_value(&self, value: &ControlValue) {
        let new_value = match (self.presentation.use_int, value) {
            (true, ControlValue::Integer(v)) => *v as f64,
            (false, ControlValue::Float(v)) => *v,
            (_, other) => {
                warn!("Numeric widget cannot show a {} value", other.type_name());
                return;
            }
        };

        self.primary().set_numeric_value(new_value);
        self.refresh_display();
    }

    fn widget_value(&self) -> Option<ControlValue> {
        let value = self.primary().numeric_value();

        if self.presentation.use_int {
            Some(ControlValue::Integer(value.round() as i64))
        } else {
            Some(ControlValue::Float(value))
        }
    }

    fn refresh_display(&self) {
        if let NumericWidget::Slider { scale, value_label } = &self.widget {
            value_label.set_label_text(&self.presentation.format(scale.numeric_value()));
        }
    }
}
