use std::rc::Rc;

use log::warn;

use crate::unit::{Control, ControlKind, ControlValue, EnumEntry, UiHints};

use super::view::{
    ChoiceView, EventCallback, LabelView, NumericView, Sensitive, TextView, ToggleView,
};
use super::{
    BooleanControl, BooleanWidget, BoundControl, ControlBinding, MenuControl, NumericControl,
    NumericPresentation, NumericWidget, StringCompanion, StringControl,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Decimal places the widget rounds to.
    pub digits: u32,
}

/// Creates the widgets of one table row and wires their signals to
/// `on_event`. Column 0 holds the name label, the interactive widgets fill
/// columns 1 and 2.
pub trait WidgetFactory {
    fn name_label(&self, row: i32, text: &str) -> Rc<dyn LabelView>;

    /// Slider plus the monospace label mirroring its value.
    fn slider(
        &self,
        row: i32,
        range: &RangeSpec,
        on_event: EventCallback,
    ) -> (Rc<dyn NumericView>, Rc<dyn LabelView>);

    fn spin_button(
        &self,
        row: i32,
        range: &RangeSpec,
        on_event: EventCallback,
    ) -> Rc<dyn NumericView>;

    fn momentary_button(&self, row: i32, label: &str, on_event: EventCallback) -> Rc<dyn Sensitive>;
    fn toggle_button(&self, row: i32, label: &str, on_event: EventCallback) -> Rc<dyn ToggleView>;
    fn check_button(&self, row: i32, label: &str, on_event: EventCallback) -> Rc<dyn ToggleView>;

    fn dropdown(
        &self,
        row: i32,
        entries: &[EnumEntry],
        on_event: EventCallback,
    ) -> Rc<dyn ChoiceView>;

    /// Read-only entry plus a button opening a save dialog.
    fn file_entry(
        &self,
        row: i32,
        on_event: EventCallback,
    ) -> (Rc<dyn TextView>, Rc<dyn Sensitive>);

    /// Editable entry plus a "Set" button.
    fn text_entry(
        &self,
        row: i32,
        on_event: EventCallback,
    ) -> (Rc<dyn TextView>, Rc<dyn Sensitive>);

    /// Removes every row created so far.
    fn clear_rows(&self);
}

/// Builds the widgets for `control` in `row` and returns their binding, or
/// `None` if the control cannot be shown.
///
/// Widgets are created with the control's sensitivity and, when known, its
/// current value. Callers are expected to suppress `on_event` while this runs.
pub fn build_binding(
    factory: &dyn WidgetFactory,
    row: i32,
    control: &Control,
    value: Option<&ControlValue>,
    on_event: EventCallback,
) -> Option<ControlBinding> {
    let bound = match &control.kind {
        ControlKind::Integer { min, max, step } => {
            if *step == 0 {
                warn!(
                    "Refusing to add a widget for integer control [{}] with step 0",
                    control.name
                );
                return None;
            }

            let range = RangeSpec {
                min: *min as f64,
                max: *max as f64,
                step: *step as f64,
                digits: 0,
            };
            let presentation = NumericPresentation::integer(*min, *max);
            let label = factory.name_label(row, &format!("{}:", control.name));

            let widget = if control.hints.contains(UiHints::SPIN_BUTTON) {
                NumericWidget::SpinButton(factory.spin_button(row, &range, on_event))
            } else {
                let (scale, value_label) = factory.slider(row, &range, on_event);
                NumericWidget::Slider { scale, value_label }
            };

            BoundControl::Integer(NumericControl::new(label, widget, presentation))
        }

        ControlKind::Float {
            min,
            max,
            step,
            display_width,
            display_precision,
        } => {
            let range = RangeSpec {
                min: *min,
                max: *max,
                step: *step,
                digits: *display_precision as u32,
            };
            let presentation =
                NumericPresentation::float(*min, *max, *display_width, *display_precision);
            let label = factory.name_label(row, &format!("{}:", control.name));
            let (scale, value_label) = factory.slider(row, &range, on_event);

            BoundControl::Float(NumericControl::new(
                label,
                NumericWidget::Slider { scale, value_label },
                presentation,
            ))
        }

        ControlKind::Boolean => {
            let widget = if control.hints.contains(UiHints::ONE_SHOT) {
                BooleanWidget::OneShot(factory.momentary_button(row, &control.name, on_event))
            } else if control.hints.contains(UiHints::TOGGLE_BUTTON) {
                BooleanWidget::Toggle(factory.toggle_button(row, &control.name, on_event))
            } else {
                BooleanWidget::Check(factory.check_button(row, &control.name, on_event))
            };

            BoundControl::Boolean(BooleanControl::new(widget))
        }

        ControlKind::Enumeration { entries } => {
            let label = factory.name_label(row, &format!("{}:", control.name));
            let combo = factory.dropdown(row, entries, on_event);

            BoundControl::Enumeration(MenuControl::new(label, combo))
        }

        ControlKind::String => {
            let label = factory.name_label(row, &format!("{}:", control.name));

            let (entry, companion) = if control.hints.contains(UiHints::FILENAME) {
                let (entry, chooser) = factory.file_entry(row, on_event);
                (entry, StringCompanion::FileChooser(chooser))
            } else {
                let (entry, set_button) = factory.text_entry(row, on_event);
                (entry, StringCompanion::SetButton(set_button))
            };

            BoundControl::String(StringControl::new(label, entry, companion))
        }

        ControlKind::Unsupported { type_name } => {
            warn!(
                "Unrecognized control type {} of [{}], no widget added",
                type_name, control.name
            );
            return None;
        }
    };

    let binding = ControlBinding::new(control.id, control.name.clone(), bound);
    binding.apply_sensitivity(control);

    match value {
        Some(v) => binding.pull_value(v),
        None => binding.refresh_display(),
    }

    Some(binding)
}
