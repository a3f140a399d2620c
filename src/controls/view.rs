//! Toolkit-neutral handles on the widgets a control row is made of.
//!
//! Programmatic setters behave like the toolkit's: changing a value may fire
//! the widget's own change signal.

use std::path::PathBuf;
use std::rc::Rc;

/// User interaction reported by a control widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Slider, spin button, check/toggle button or dropdown changed.
    ValueChanged,
    /// Momentary button was pressed.
    Pressed,
    /// Text entry was activated or its "Set" button clicked.
    Commit,
    /// Escape was pressed in a text entry.
    Cancel,
    /// A path was accepted in the file chooser.
    FileChosen(PathBuf),
}

pub type EventCallback = Rc<dyn Fn(WidgetEvent)>;

pub trait Sensitive {
    fn set_interactive(&self, interactive: bool);
    fn is_interactive(&self) -> bool;
}

pub trait LabelView: Sensitive {
    fn set_label_text(&self, text: &str);
    fn label_text(&self) -> String;
}

/// Slider or spin button.
pub trait NumericView: Sensitive {
    fn numeric_value(&self) -> f64;
    fn set_numeric_value(&self, value: f64);
}

/// Check button or toggle button.
pub trait ToggleView: Sensitive {
    fn toggled_on(&self) -> bool;
    fn set_toggled_on(&self, on: bool);
}

pub trait ChoiceView: Sensitive {
    /// `None` when nothing is selected.
    fn selected_index(&self) -> Option<u32>;
    fn select_index(&self, index: Option<u32>);
    /// Per-entry availability, in entry order.
    fn set_entries_enabled(&self, enabled: &[bool]);
}

pub trait TextView: Sensitive {
    fn entry_text(&self) -> String;
    fn set_entry_text(&self, text: &str);
    fn cursor_to_end(&self);
}
