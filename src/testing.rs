//! In-memory widgets standing in for GTK in unit tests.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use crate::controls::view::{
    ChoiceView, EventCallback, LabelView, NumericView, Sensitive, TextView, ToggleView, WidgetEvent,
};
use crate::controls::{RangeSpec, WidgetFactory};
use crate::unit::EnumEntry;
use crate::widgets::PanelView;

pub fn noop_callback() -> EventCallback {
    Rc::new(|_| {})
}

/// One fake widget playing every role. Programmatic setters emit
/// `ValueChanged` on an actual change, the way GTK widgets do; the `user_*`
/// helpers simulate interaction and do nothing while the widget is
/// insensitive.
pub struct FakeWidget {
    text: RefCell<String>,
    value: Cell<f64>,
    bounds: Cell<(f64, f64)>,
    on: Cell<bool>,
    selected: Cell<Option<u32>>,
    entries_enabled: RefCell<Vec<bool>>,
    interactive: Cell<bool>,
    cursor: Cell<usize>,
    press_event: Option<WidgetEvent>,
    callback: Option<EventCallback>,
}

impl FakeWidget {
    fn new(callback: Option<EventCallback>, press_event: Option<WidgetEvent>) -> Rc<Self> {
        Rc::new(FakeWidget {
            text: RefCell::new(String::new()),
            value: Cell::new(0.0),
            bounds: Cell::new((f64::MIN, f64::MAX)),
            on: Cell::new(false),
            selected: Cell::new(None),
            entries_enabled: RefCell::new(vec![]),
            interactive: Cell::new(true),
            cursor: Cell::new(0),
            press_event,
            callback,
        })
    }

    fn emit(&self, event: WidgetEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected.get()
    }

    pub fn entries_enabled(&self) -> Vec<bool> {
        self.entries_enabled.borrow().clone()
    }

    pub fn interactive(&self) -> bool {
        self.interactive.get()
    }

    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }

    pub fn user_set_value(&self, value: f64) {
        if self.interactive.get() {
            self.set_numeric_value(value);
        }
    }

    /// Emits `ValueChanged` without moving the value, like a slider dragged
    /// back to where it started.
    pub fn user_emit_value_changed(&self) {
        if self.interactive.get() {
            self.emit(WidgetEvent::ValueChanged);
        }
    }

    pub fn user_toggle(&self) {
        if self.interactive.get() {
            self.set_toggled_on(!self.on.get());
        }
    }

    pub fn user_select(&self, index: u32) {
        if self.interactive.get() {
            self.select_index(Some(index));
        }
    }

    /// Replaces the text without committing it.
    pub fn user_type(&self, text: &str) {
        if self.interactive.get() {
            *self.text.borrow_mut() = text.to_string();
            self.cursor.set(text.chars().count());
        }
    }

    pub fn user_press(&self) {
        if let (true, Some(event)) = (self.interactive.get(), &self.press_event) {
            self.emit(event.clone());
        }
    }

    pub fn user_commit(&self) {
        if self.interactive.get() {
            self.emit(WidgetEvent::Commit);
        }
    }

    pub fn user_cancel(&self) {
        if self.interactive.get() {
            self.emit(WidgetEvent::Cancel);
        }
    }

    pub fn user_choose_file(&self, path: PathBuf) {
        if self.interactive.get() {
            self.emit(WidgetEvent::FileChosen(path));
        }
    }
}

impl Sensitive for FakeWidget {
    fn set_interactive(&self, interactive: bool) {
        self.interactive.set(interactive);
    }

    fn is_interactive(&self) -> bool {
        self.interactive.get()
    }
}

impl LabelView for FakeWidget {
    fn set_label_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    fn label_text(&self) -> String {
        self.text()
    }
}

impl NumericView for FakeWidget {
    fn numeric_value(&self) -> f64 {
        self.value.get()
    }

    fn set_numeric_value(&self, value: f64) {
        let (min, max) = self.bounds.get();
        let value = value.max(min).min(max);

        if self.value.replace(value) != value {
            self.emit(WidgetEvent::ValueChanged);
        }
    }
}

impl ToggleView for FakeWidget {
    fn toggled_on(&self) -> bool {
        self.on.get()
    }

    fn set_toggled_on(&self, on: bool) {
        if self.on.replace(on) != on {
            self.emit(WidgetEvent::ValueChanged);
        }
    }
}

impl ChoiceView for FakeWidget {
    fn selected_index(&self) -> Option<u32> {
        self.selected.get()
    }

    fn select_index(&self, index: Option<u32>) {
        if self.selected.replace(index) != index {
            self.emit(WidgetEvent::ValueChanged);
        }
    }

    fn set_entries_enabled(&self, enabled: &[bool]) {
        *self.entries_enabled.borrow_mut() = enabled.to_vec();
    }
}

impl TextView for FakeWidget {
    fn entry_text(&self) -> String {
        self.text()
    }

    fn set_entry_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
        self.cursor.set(0);
    }

    fn cursor_to_end(&self) {
        self.cursor.set(self.text.borrow().chars().count());
    }
}

type Row = (i32, &'static str, Rc<FakeWidget>);

/// Records every widget it creates by row and kind.
#[derive(Default)]
pub struct FakeFactory {
    rows: RefCell<Vec<Row>>,
    clears: Cell<usize>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<(i32, &'static str)> {
        self.rows.borrow().iter().map(|(row, kind, _)| (*row, *kind)).collect()
    }

    pub fn widget(&self, row: i32, kind: &str) -> Option<Rc<FakeWidget>> {
        self.rows
            .borrow()
            .iter()
            .rev()
            .find(|(r, k, _)| *r == row && *k == kind)
            .map(|(_, _, w)| w.clone())
    }

    pub fn clear_count(&self) -> usize {
        self.clears.get()
    }

    fn add(
        &self,
        row: i32,
        kind: &'static str,
        callback: Option<EventCallback>,
        press_event: Option<WidgetEvent>,
    ) -> Rc<FakeWidget> {
        let widget = FakeWidget::new(callback, press_event);
        self.rows.borrow_mut().push((row, kind, widget.clone()));
        widget
    }

    fn ranged(
        &self,
        row: i32,
        kind: &'static str,
        range: &RangeSpec,
        on_event: EventCallback,
    ) -> Rc<FakeWidget> {
        let widget = self.add(row, kind, Some(on_event), None);
        widget.bounds.set((range.min, range.max));
        widget.value.set(range.min);
        widget
    }
}

impl WidgetFactory for FakeFactory {
    fn name_label(&self, row: i32, text: &str) -> Rc<dyn LabelView> {
        let label = self.add(row, "name_label", None, None);
        label.set_label_text(text);
        label
    }

    fn slider(
        &self,
        row: i32,
        range: &RangeSpec,
        on_event: EventCallback,
    ) -> (Rc<dyn NumericView>, Rc<dyn LabelView>) {
        let scale = self.ranged(row, "slider", range, on_event);
        let value_label = self.add(row, "value_label", None, None);
        (scale, value_label)
    }

    fn spin_button(
        &self,
        row: i32,
        range: &RangeSpec,
        on_event: EventCallback,
    ) -> Rc<dyn NumericView> {
        self.ranged(row, "spin_button", range, on_event)
    }

    fn momentary_button(
        &self,
        row: i32,
        label: &str,
        on_event: EventCallback,
    ) -> Rc<dyn Sensitive> {
        let button = self.add(row, "momentary_button", Some(on_event), Some(WidgetEvent::Pressed));
        button.set_label_text(label);
        button
    }

    fn toggle_button(&self, row: i32, label: &str, on_event: EventCallback) -> Rc<dyn ToggleView> {
        let button = self.add(row, "toggle_button", Some(on_event), None);
        button.set_label_text(label);
        button
    }

    fn check_button(&self, row: i32, label: &str, on_event: EventCallback) -> Rc<dyn ToggleView> {
        let button = self.add(row, "check_button", Some(on_event), None);
        button.set_label_text(label);
        button
    }

    fn dropdown(
        &self,
        row: i32,
        entries: &[EnumEntry],
        on_event: EventCallback,
    ) -> Rc<dyn ChoiceView> {
        let combo = self.add(row, "dropdown", Some(on_event), None);
        combo.set_entries_enabled(&entries.iter().map(|e| e.enabled).collect::<Vec<_>>());
        combo
    }

    fn file_entry(
        &self,
        row: i32,
        on_event: EventCallback,
    ) -> (Rc<dyn TextView>, Rc<dyn Sensitive>) {
        let entry = self.add(row, "file_entry", None, None);
        let chooser = self.add(row, "chooser_button", Some(on_event), None);
        (entry, chooser)
    }

    fn text_entry(
        &self,
        row: i32,
        on_event: EventCallback,
    ) -> (Rc<dyn TextView>, Rc<dyn Sensitive>) {
        let entry = self.add(row, "text_entry", Some(on_event.clone()), None);
        let set_button = self.add(row, "set_button", Some(on_event), Some(WidgetEvent::Commit));
        (entry, set_button)
    }

    fn clear_rows(&self) {
        self.rows.borrow_mut().clear();
        self.clears.set(self.clears.get() + 1);
    }
}

/// Panel chrome without a display.
pub struct FakePanelView {
    header: RefCell<String>,
    formats: RefCell<Vec<String>>,
    selected_format: Cell<Option<u32>>,
    expanded: Cell<bool>,
    on_format: RefCell<Option<Rc<dyn Fn(u32)>>>,
    on_close: RefCell<Option<Rc<dyn Fn()>>>,
}

impl Default for FakePanelView {
    fn default() -> Self {
        FakePanelView {
            header: RefCell::new(String::new()),
            formats: RefCell::new(vec![]),
            selected_format: Cell::new(None),
            expanded: Cell::new(true),
            on_format: RefCell::new(None),
            on_close: RefCell::new(None),
        }
    }
}

impl FakePanelView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> String {
        self.header.borrow().clone()
    }

    pub fn formats(&self) -> Vec<String> {
        self.formats.borrow().clone()
    }

    pub fn selected_format(&self) -> Option<u32> {
        self.selected_format.get()
    }

    pub fn user_select_format(&self, index: u32) {
        self.selected_format.set(Some(index));
        self.fire_format(index);
    }

    pub fn user_click_close(&self) {
        let callback = self.on_close.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn fire_format(&self, index: u32) {
        let callback = self.on_format.borrow().clone();
        if let Some(callback) = callback {
            callback(index);
        }
    }
}

impl PanelView for FakePanelView {
    fn set_header_text(&self, text: &str) {
        *self.header.borrow_mut() = text.to_string();
    }

    fn set_format_names(&self, names: &[String], selected: Option<u32>) {
        *self.formats.borrow_mut() = names.to_vec();

        if self.selected_format.replace(selected) != selected {
            if let Some(index) = selected {
                self.fire_format(index);
            }
        }
    }

    fn set_expanded(&self, expanded: bool) {
        self.expanded.set(expanded);
    }

    fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    fn connect_format_selected(&self, callback: Rc<dyn Fn(u32)>) {
        *self.on_format.borrow_mut() = Some(callback);
    }

    fn connect_close_clicked(&self, callback: Rc<dyn Fn()>) {
        *self.on_close.borrow_mut() = Some(callback);
    }
}
