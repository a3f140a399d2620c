use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gtk::prelude::*;
use gtk::{
    gdk, gio, glib, Adjustment, Align, Button, CheckButton, DropDown, Entry, EventControllerKey,
    Expander, FileDialog, Frame, Grid, Label, ListItem, Orientation, Scale, SignalListItemFactory,
    SpinButton, StringList, ToggleButton,
};
use log::debug;

use crate::components::{create_hbox, create_label, create_value_label};
use crate::controls::view::{
    ChoiceView, EventCallback, LabelView, NumericView, Sensitive, TextView, ToggleView, WidgetEvent,
};
use crate::controls::{RangeSpec, WidgetFactory};
use crate::enum_entry_item::EnumEntryItem;
use crate::unit::EnumEntry;

use super::PanelView;

const FILE_DIALOG_TITLE: &str = "New Log File";

macro_rules! impl_sensitive {
    ($($widget:ty),* $(,)?) => {
        $(
            impl Sensitive for $widget {
                fn set_interactive(&self, interactive: bool) {
                    self.set_sensitive(interactive);
                }

                fn is_interactive(&self) -> bool {
                    self.is_sensitive()
                }
            }
        )*
    };
}

impl_sensitive!(Label, Scale, SpinButton, Button, ToggleButton, CheckButton, Entry);

impl LabelView for Label {
    fn set_label_text(&self, text: &str) {
        self.set_label(text);
    }

    fn label_text(&self) -> String {
        self.label().to_string()
    }
}

impl NumericView for Scale {
    fn numeric_value(&self) -> f64 {
        self.value()
    }

    fn set_numeric_value(&self, value: f64) {
        self.set_value(value);
    }
}

impl NumericView for SpinButton {
    fn numeric_value(&self) -> f64 {
        self.value()
    }

    fn set_numeric_value(&self, value: f64) {
        self.set_value(value);
    }
}

impl ToggleView for ToggleButton {
    fn toggled_on(&self) -> bool {
        self.is_active()
    }

    fn set_toggled_on(&self, on: bool) {
        self.set_active(on);
    }
}

impl ToggleView for CheckButton {
    fn toggled_on(&self) -> bool {
        self.is_active()
    }

    fn set_toggled_on(&self, on: bool) {
        self.set_active(on);
    }
}

impl TextView for Entry {
    fn entry_text(&self) -> String {
        self.text().to_string()
    }

    fn set_entry_text(&self, text: &str) {
        self.set_text(text);
    }

    fn cursor_to_end(&self) {
        self.set_position(-1);
    }
}

/// Dropdown over the entries of an enumeration control.
struct EnumDropDown {
    dropdown: DropDown,
    store: gio::ListStore,
}

impl EnumDropDown {
    fn new(entries: &[EnumEntry]) -> Self {
        let store = gio::ListStore::new::<EnumEntryItem>();
        for (index, entry) in entries.iter().enumerate() {
            store.append(&EnumEntryItem::new(index as u32, entry));
        }

        let factory = SignalListItemFactory::new();

        factory.connect_setup(|_, list_item| {
            let Some(list_item) = list_item.downcast_ref::<ListItem>() else {
                return;
            };
            list_item.set_child(Some(&Label::builder().xalign(0.0).build()));
        });

        factory.connect_bind(|_, list_item| {
            let Some(list_item) = list_item.downcast_ref::<ListItem>() else {
                return;
            };
            let Some(item) = list_item.item().and_downcast::<EnumEntryItem>() else {
                return;
            };
            let Some(label) = list_item.child().and_downcast::<Label>() else {
                return;
            };

            label.set_label(&item.label());
            label.set_sensitive(item.enabled());
            list_item.set_selectable(item.enabled());
            list_item.set_activatable(item.enabled());
        });

        let dropdown = DropDown::builder()
            .factory(&factory)
            .hexpand(true)
            .model(&store)
            .build();

        EnumDropDown { dropdown, store }
    }
}

impl Sensitive for EnumDropDown {
    fn set_interactive(&self, interactive: bool) {
        self.dropdown.set_sensitive(interactive);
    }

    fn is_interactive(&self) -> bool {
        self.dropdown.is_sensitive()
    }
}

impl ChoiceView for EnumDropDown {
    fn selected_index(&self) -> Option<u32> {
        let selected = self.dropdown.selected();
        (selected != gtk::INVALID_LIST_POSITION).then_some(selected)
    }

    fn select_index(&self, index: Option<u32>) {
        self.dropdown
            .set_selected(index.unwrap_or(gtk::INVALID_LIST_POSITION));
    }

    fn set_entries_enabled(&self, enabled: &[bool]) {
        let mut changed = false;

        for (position, enabled) in enabled.iter().enumerate() {
            let Some(item) = self.store.item(position as u32).and_downcast::<EnumEntryItem>() else {
                continue;
            };
            if item.enabled() != *enabled {
                item.set_enabled(*enabled);
                changed = true;
            }
        }

        if changed {
            // Rebinds every row so the factory picks up the new flags.
            let selected = self.dropdown.selected();
            let n_items = self.store.n_items();
            self.store.items_changed(0, n_items, n_items);
            if self.dropdown.selected() != selected {
                self.dropdown.set_selected(selected);
            }
        }
    }
}

/// GTK widgets of one unit control panel.
///
/// A frame holding a header row (expander, title, close button), the
/// controls grid and the output format selector.
pub struct GtkPanelView {
    frame: Frame,
    expander: Expander,
    header_label: Label,
    close_button: Button,
    grid: Grid,
    format_box: gtk::Box,
    format_model: StringList,
    format_dropdown: DropDown,
    updating_formats: Rc<Cell<bool>>,
    on_format_selected: Rc<RefCell<Option<Rc<dyn Fn(u32)>>>>,
}

impl GtkPanelView {
    pub fn new() -> Rc<Self> {
        let frame = Frame::new(None);
        let content = gtk::Box::builder()
            .margin_bottom(6)
            .margin_end(6)
            .margin_start(6)
            .margin_top(6)
            .orientation(Orientation::Vertical)
            .spacing(6)
            .build();
        frame.set_child(Some(&content));

        let header = create_hbox();
        let expander = Expander::new(None);
        let header_label = create_label("");
        header_label.set_hexpand(true);
        let close_button = Button::builder()
            .css_classes(["flat"])
            .icon_name("window-close-symbolic")
            .tooltip_text("Close")
            .build();

        header.append(&expander);
        header.append(&header_label);
        header.append(&close_button);
        content.append(&header);

        let grid = Grid::builder()
            .column_spacing(12)
            .row_spacing(6)
            .visible(false)
            .build();
        content.append(&grid);

        let grid_for_expander = grid.clone();
        expander.connect_expanded_notify(move |expander| {
            grid_for_expander.set_visible(expander.is_expanded());
        });

        let format_box = create_hbox();
        let format_model = StringList::new(&[]);
        let format_dropdown = DropDown::builder()
            .hexpand(true)
            .model(&format_model)
            .build();
        format_box.append(&Label::builder().label("Format:").xalign(1.0).build());
        format_box.append(&format_dropdown);
        format_box.set_visible(false);
        content.append(&format_box);

        let updating_formats = Rc::new(Cell::new(false));
        let on_format_selected: Rc<RefCell<Option<Rc<dyn Fn(u32)>>>> = Rc::new(RefCell::new(None));

        let updating = updating_formats.clone();
        let callback = on_format_selected.clone();
        format_dropdown.connect_selected_notify(move |dropdown| {
            let index = dropdown.selected();
            if updating.get() || index == gtk::INVALID_LIST_POSITION {
                return;
            }

            // The selection may rebuild this very dropdown, so leave its
            // signal emission first.
            if let Some(callback) = callback.borrow().clone() {
                glib::idle_add_local_once(move || callback(index));
            }
        });

        Rc::new(GtkPanelView {
            frame,
            expander,
            header_label,
            close_button,
            grid,
            format_box,
            format_model,
            format_dropdown,
            updating_formats,
            on_format_selected,
        })
    }

    /// The top-level widget to put into a container.
    pub fn widget(&self) -> &Frame {
        &self.frame
    }

    fn attach_row_widget(&self, widget: &impl IsA<gtk::Widget>, row: i32) {
        self.grid.attach(widget, 1, row, 1, 1);
    }

    fn attach_spanning(&self, widget: &impl IsA<gtk::Widget>, row: i32) {
        self.grid.attach(widget, 1, row, 2, 1);
    }
}

fn adjustment(range: &RangeSpec) -> Adjustment {
    Adjustment::new(range.min, range.min, range.max, range.step, range.step * 10.0, 0.0)
}

impl PanelView for GtkPanelView {
    fn set_header_text(&self, text: &str) {
        self.header_label.set_label(text);
        self.header_label.set_tooltip_text(Some(text));
    }

    fn set_format_names(&self, names: &[String], selected: Option<u32>) {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();

        self.updating_formats.set(true);
        self.format_model.splice(0, self.format_model.n_items(), &names);
        self.format_dropdown
            .set_selected(selected.unwrap_or(gtk::INVALID_LIST_POSITION));
        self.updating_formats.set(false);

        self.format_box.set_visible(!names.is_empty());
    }

    fn set_expanded(&self, expanded: bool) {
        self.expander.set_expanded(expanded);
    }

    fn is_expanded(&self) -> bool {
        self.expander.is_expanded()
    }

    fn connect_format_selected(&self, callback: Rc<dyn Fn(u32)>) {
        *self.on_format_selected.borrow_mut() = Some(callback);
    }

    fn connect_close_clicked(&self, callback: Rc<dyn Fn()>) {
        self.close_button.connect_clicked(move |_| callback());
    }
}

impl WidgetFactory for GtkPanelView {
    fn name_label(&self, row: i32, text: &str) -> Rc<dyn LabelView> {
        let label = create_label(text);
        self.grid.attach(&label, 0, row, 1, 1);
        Rc::new(label)
    }

    fn slider(
        &self,
        row: i32,
        range: &RangeSpec,
        on_event: EventCallback,
    ) -> (Rc<dyn NumericView>, Rc<dyn LabelView>) {
        let scale = Scale::new(Orientation::Horizontal, Some(&adjustment(range)));
        scale.set_draw_value(false);
        scale.set_digits(range.digits as i32);
        scale.set_round_digits(range.digits as i32);
        scale.set_hexpand(true);
        scale.connect_value_changed(move |_| on_event(WidgetEvent::ValueChanged));

        let value_label = create_value_label();

        self.attach_row_widget(&scale, row);
        self.grid.attach(&value_label, 2, row, 1, 1);

        (Rc::new(scale), Rc::new(value_label))
    }

    fn spin_button(
        &self,
        row: i32,
        range: &RangeSpec,
        on_event: EventCallback,
    ) -> Rc<dyn NumericView> {
        let spin = SpinButton::new(Some(&adjustment(range)), range.step, range.digits);
        spin.set_hexpand(true);
        spin.connect_value_changed(move |_| on_event(WidgetEvent::ValueChanged));

        self.attach_spanning(&spin, row);
        Rc::new(spin)
    }

    fn momentary_button(
        &self,
        row: i32,
        label: &str,
        on_event: EventCallback,
    ) -> Rc<dyn Sensitive> {
        let button = Button::with_label(label);
        button.connect_clicked(move |_| on_event(WidgetEvent::Pressed));

        self.attach_spanning(&button, row);
        Rc::new(button)
    }

    fn toggle_button(&self, row: i32, label: &str, on_event: EventCallback) -> Rc<dyn ToggleView> {
        let button = ToggleButton::with_label(label);
        button.connect_toggled(move |_| on_event(WidgetEvent::ValueChanged));

        self.attach_spanning(&button, row);
        Rc::new(button)
    }

    fn check_button(&self, row: i32, label: &str, on_event: EventCallback) -> Rc<dyn ToggleView> {
        let button = CheckButton::with_label(label);
        button.connect_toggled(move |_| on_event(WidgetEvent::ValueChanged));

        self.attach_spanning(&button, row);
        Rc::new(button)
    }

    fn dropdown(
        &self,
        row: i32,
        entries: &[EnumEntry],
        on_event: EventCallback,
    ) -> Rc<dyn ChoiceView> {
        let combo = EnumDropDown::new(entries);
        combo
            .dropdown
            .connect_selected_notify(move |_| on_event(WidgetEvent::ValueChanged));

        self.attach_spanning(&combo.dropdown, row);
        Rc::new(combo)
    }

    fn file_entry(
        &self,
        row: i32,
        on_event: EventCallback,
    ) -> (Rc<dyn TextView>, Rc<dyn Sensitive>) {
        let entry = Entry::builder().editable(false).hexpand(true).build();
        let chooser = Button::builder()
            .icon_name("document-open-symbolic")
            .tooltip_text("Choose file")
            .build();

        chooser.connect_clicked(move |button| {
            let window = button.root().and_downcast::<gtk::Window>();
            let on_event = on_event.clone();

            glib::MainContext::default().spawn_local(async move {
                let dialog = FileDialog::builder()
                    .title(FILE_DIALOG_TITLE)
                    .modal(true)
                    .build();

                match dialog.save_future(window.as_ref()).await {
                    Ok(file) => match file.path() {
                        Some(path) => on_event(WidgetEvent::FileChosen(path)),
                        None => debug!("Chosen file has no local path"),
                    },
                    Err(e) => debug!("File dialog dismissed: {}", e),
                }
            });
        });

        let hbox = create_hbox();
        hbox.append(&entry);
        hbox.append(&chooser);
        self.attach_spanning(&hbox, row);

        (Rc::new(entry), Rc::new(chooser))
    }

    fn text_entry(
        &self,
        row: i32,
        on_event: EventCallback,
    ) -> (Rc<dyn TextView>, Rc<dyn Sensitive>) {
        let entry = Entry::builder().hexpand(true).build();

        let on_activate = on_event.clone();
        entry.connect_activate(move |_| on_activate(WidgetEvent::Commit));

        let keys = EventControllerKey::new();
        let on_escape = on_event.clone();
        keys.connect_key_pressed(move |_, key, _, _| {
            if key == gdk::Key::Escape {
                on_escape(WidgetEvent::Cancel);
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });
        entry.add_controller(keys);

        let set_button = Button::with_label("Set");
        set_button.set_valign(Align::Center);
        set_button.connect_clicked(move |_| on_event(WidgetEvent::Commit));

        let hbox = create_hbox();
        hbox.append(&entry);
        hbox.append(&set_button);
        self.attach_spanning(&hbox, row);

        (Rc::new(entry), Rc::new(set_button))
    }

    fn clear_rows(&self) {
        while let Some(child) = self.grid.first_child() {
            self.grid.remove(&child);
        }
    }
}
