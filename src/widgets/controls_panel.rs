use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};
use thiserror::Error;

use crate::controls::view::{EventCallback, WidgetEvent};
use crate::controls::{build_binding, ControlBinding, SyncController, WidgetFactory};
use crate::unit::{ControlId, ControlValue, HandlerId, Unit, UnitEvent, UnitSignal};

use super::format_selector::{apply_format_choice, FormatSelection};

/// Header shown while no unit is attached.
pub const INVALID_UNIT_HEADER: &str = "INVALID UNIT";

/// The chrome around the controls table: header, format selector, expander
/// and close button.
pub trait PanelView {
    fn set_header_text(&self, text: &str);

    /// Replaces the format selector's entries. Selection callbacks fired
    /// while this runs are ignored by the panel.
    fn set_format_names(&self, names: &[String], selected: Option<u32>);

    fn set_expanded(&self, expanded: bool);
    fn is_expanded(&self) -> bool;

    fn connect_format_selected(&self, callback: Rc<dyn Fn(u32)>);
    fn connect_close_clicked(&self, callback: Rc<dyn Fn()>);
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("panel is already attached to unit {0}")]
    AlreadyAttached(String),
}

struct Attachment {
    unit: Rc<dyn Unit>,
    bindings: HashMap<ControlId, ControlBinding>,
    rows: Vec<ControlId>,
    handlers: Vec<HandlerId>,
    formats: FormatSelection,
}

struct PanelInner {
    view: Rc<dyn PanelView>,
    factory: Rc<dyn WidgetFactory>,
    attachment: RefCell<Option<Attachment>>,
    sync: SyncController,
    close_handlers: RefCell<Vec<Rc<dyn Fn()>>>,
}

/// Presents the controls of one unit and keeps them in sync with it.
///
/// Cloning yields another handle on the same panel. Dropping the last handle
/// while attached disconnects from the unit.
#[derive(Clone)]
pub struct ControlsPanel {
    inner: Rc<PanelInner>,
}

impl ControlsPanel {
    pub fn new(view: Rc<dyn PanelView>, factory: Rc<dyn WidgetFactory>) -> Self {
        let inner = Rc::new(PanelInner {
            view,
            factory,
            attachment: RefCell::new(None),
            sync: SyncController::new(),
            close_handlers: RefCell::new(vec![]),
        });

        let weak = Rc::downgrade(&inner);
        inner.view.connect_format_selected(Rc::new(move |index| {
            if let Some(inner) = weak.upgrade() {
                inner.on_format_selected(index);
            }
        }));

        let weak = Rc::downgrade(&inner);
        inner.view.connect_close_clicked(Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.request_close();
            }
        }));

        inner.refresh_header();

        ControlsPanel { inner }
    }

    pub fn with_unit(
        view: Rc<dyn PanelView>,
        factory: Rc<dyn WidgetFactory>,
        unit: Rc<dyn Unit>,
    ) -> Self {
        let panel = Self::new(view, factory);
        panel.inner.attach_unit(unit);
        panel
    }

    pub fn attach(&self, unit: Rc<dyn Unit>) -> Result<(), PanelError> {
        if let Some(current) = self.unit() {
            warn!(
                "Refusing to attach {}, panel already shows {}",
                unit.id(),
                current.id()
            );
            return Err(PanelError::AlreadyAttached(current.id().to_string()));
        }

        self.inner.attach_unit(unit);
        Ok(())
    }

    /// Returns `false` if nothing was attached.
    pub fn detach(&self) -> bool {
        self.inner.detach_unit()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.attachment.borrow().is_some()
    }

    pub fn unit(&self) -> Option<Rc<dyn Unit>> {
        self.inner.unit()
    }

    pub fn set_expanded(&self, expanded: bool) {
        self.inner.view.set_expanded(expanded);
    }

    pub fn is_expanded(&self) -> bool {
        self.inner.view.is_expanded()
    }

    pub fn connect_close_requested<F: Fn() + 'static>(&self, handler: F) {
        self.inner.close_handlers.borrow_mut().push(Rc::new(handler));
    }

    pub fn request_close(&self) {
        self.inner.request_close();
    }

    pub fn binding_count(&self) -> usize {
        self.inner
            .attachment
            .borrow()
            .as_ref()
            .map_or(0, |a| a.bindings.len())
    }

    pub fn binding(&self, id: ControlId) -> Option<ControlBinding> {
        self.inner.binding(id)
    }

    /// Control ids in table row order.
    pub fn row_ids(&self) -> Vec<ControlId> {
        self.inner
            .attachment
            .borrow()
            .as_ref()
            .map_or(vec![], |a| a.rows.clone())
    }

    pub fn format_selection(&self) -> FormatSelection {
        self.inner
            .attachment
            .borrow()
            .as_ref()
            .map(|a| a.formats.clone())
            .unwrap_or_default()
    }

    /// Switches the unit to the format at `index`, as if chosen by the user.
    pub fn select_format(&self, index: u32) {
        self.inner.apply_format(index);
    }
}

impl PanelInner {
    fn unit(&self) -> Option<Rc<dyn Unit>> {
        self.attachment.borrow().as_ref().map(|a| a.unit.clone())
    }

    fn binding(&self, id: ControlId) -> Option<ControlBinding> {
        self.attachment
            .borrow()
            .as_ref()
            .and_then(|a| a.bindings.get(&id).cloned())
    }

    fn unit_and_binding(&self, id: ControlId) -> Option<(Rc<dyn Unit>, ControlBinding)> {
        let attachment = self.attachment.borrow();
        let attachment = attachment.as_ref()?;
        let binding = attachment.bindings.get(&id)?.clone();

        Some((attachment.unit.clone(), binding))
    }

    fn attach_unit(self: &Rc<Self>, unit: Rc<dyn Unit>) {
        debug!("Attaching panel to {} ({})", unit.id(), unit.name());

        let mut handlers = vec![
            self.subscribe(unit.as_ref(), UnitSignal::OutputFormatsChanged, |inner, _| {
                inner.refresh_formats()
            }),
            self.subscribe(unit.as_ref(), UnitSignal::StatusChanged, |inner, _| {
                inner.refresh_formats();
                inner.refresh_header();
            }),
        ];

        let mut bindings = HashMap::new();
        let mut rows = vec![];
        {
            let _guard = self.sync.suppress();

            for control in unit.controls() {
                if bindings.contains_key(&control.id) {
                    warn!("{} lists control [{}] twice", unit.id(), control.name);
                    continue;
                }

                let value = unit.control_value(control.id);
                let binding = build_binding(
                    self.factory.as_ref(),
                    rows.len() as i32,
                    &control,
                    value.as_ref(),
                    self.event_callback(control.id),
                );

                if let Some(binding) = binding {
                    rows.push(control.id);
                    bindings.insert(control.id, binding);
                }
            }
        }

        handlers.push(self.subscribe(
            unit.as_ref(),
            UnitSignal::ControlValueChanged,
            |inner, event| {
                if let UnitEvent::ControlValueChanged { id, value } = event {
                    inner.on_value_changed(*id, value);
                }
            },
        ));
        handlers.push(self.subscribe(
            unit.as_ref(),
            UnitSignal::ControlParametersChanged,
            |inner, event| {
                if let UnitEvent::ControlParametersChanged { id } = event {
                    inner.on_parameters_changed(*id);
                }
            },
        ));

        *self.attachment.borrow_mut() = Some(Attachment {
            unit,
            bindings,
            rows,
            handlers,
            formats: FormatSelection::default(),
        });

        self.refresh_formats();
        self.refresh_header();
        self.view.set_expanded(false);
    }

    fn detach_unit(&self) -> bool {
        let Some(attachment) = self.attachment.borrow_mut().take() else {
            return false;
        };

        debug!("Detaching panel from {}", attachment.unit.id());

        for handler in &attachment.handlers {
            attachment.unit.signals().disconnect(*handler);
        }
        drop(attachment);

        self.factory.clear_rows();
        {
            let _guard = self.sync.suppress();
            self.view.set_format_names(&[], None);
        }
        self.refresh_header();

        true
    }

    fn subscribe<F>(self: &Rc<Self>, unit: &dyn Unit, signal: UnitSignal, handler: F) -> HandlerId
    where
        F: Fn(&PanelInner, &UnitEvent) + 'static,
    {
        let weak: Weak<PanelInner> = Rc::downgrade(self);

        unit.signals().connect(signal, move |event| {
            if let Some(inner) = weak.upgrade() {
                handler(inner.as_ref(), event);
            }
        })
    }

    fn event_callback(self: &Rc<Self>, id: ControlId) -> EventCallback {
        let weak = Rc::downgrade(self);

        Rc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_widget_event(id, &event);
            }
        })
    }

    fn on_widget_event(&self, id: ControlId, event: &WidgetEvent) {
        if self.sync.is_suppressed() {
            trace!("Ignoring {:?} of control {} during update", event, id);
            return;
        }

        let Some((unit, binding)) = self.unit_and_binding(id) else {
            return;
        };

        self.sync.push(unit.as_ref(), &binding, event);
    }

    fn on_value_changed(&self, id: ControlId, value: &ControlValue) {
        if let Some(binding) = self.binding(id) {
            self.sync.pull(&binding, value);
        }
    }

    fn on_parameters_changed(&self, id: ControlId) {
        let Some((unit, binding)) = self.unit_and_binding(id) else {
            return;
        };

        if let Some(control) = unit.control(id) {
            let _guard = self.sync.suppress();
            binding.apply_sensitivity(&control);
        }
    }

    fn on_format_selected(&self, index: u32) {
        if self.sync.is_suppressed() {
            trace!("Ignoring format selection {} during update", index);
            return;
        }

        self.apply_format(index);
    }

    fn apply_format(&self, index: u32) {
        let chosen = {
            let attachment = self.attachment.borrow();
            attachment
                .as_ref()
                .map(|a| (a.unit.clone(), a.formats.get(index).cloned()))
        };

        let Some((unit, format)) = chosen else {
            return;
        };

        let Some(format) = format else {
            warn!("{} offers no output format at position {}", unit.id(), index);
            return;
        };

        match apply_format_choice(unit.as_ref(), &format) {
            Ok(true) => debug!("{} now delivers {}", unit.id(), format.name),
            Ok(false) => {}
            Err(e) => warn!(
                "Could not switch {} to format {}: {}",
                unit.id(),
                format.name,
                e
            ),
        }

        self.refresh_formats();
    }

    fn refresh_formats(&self) {
        let Some(unit) = self.unit() else {
            return;
        };

        let selection = FormatSelection::from_unit(unit.as_ref());
        let names = selection.names();
        let selected = selection.selected_index();

        if let Some(attachment) = self.attachment.borrow_mut().as_mut() {
            attachment.formats = selection;
        }

        let _guard = self.sync.suppress();
        self.view.set_format_names(&names, selected);
    }

    fn refresh_header(&self) {
        let text = match self.unit() {
            Some(unit) => format!("{} [{}]", unit.name(), unit.status()),
            None => INVALID_UNIT_HEADER.to_string(),
        };

        self.view.set_header_text(&text);
    }

    fn request_close(&self) {
        let handlers = self.close_handlers.borrow().clone();

        for handler in handlers {
            handler();
        }
    }
}

impl Drop for PanelInner {
    fn drop(&mut self) {
        if let Some(attachment) = self.attachment.get_mut().take() {
            debug!("Panel of {} dropped while attached", attachment.unit.id());

            for handler in &attachment.handlers {
                attachment.unit.signals().disconnect(*handler);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::testing::{FakeFactory, FakePanelView};
    use crate::unit::{
        Control, ControlKind, EnumEntry, OutputFormat, SimulatedUnit, UiHints, UnitStatus,
    };

    struct Harness {
        panel: ControlsPanel,
        view: Rc<FakePanelView>,
        factory: Rc<FakeFactory>,
    }

    fn harness() -> Harness {
        let view = Rc::new(FakePanelView::new());
        let factory = Rc::new(FakeFactory::new());
        let panel = ControlsPanel::new(view.clone(), factory.clone());

        Harness { panel, view, factory }
    }

    fn camera() -> Rc<SimulatedUnit> {
        Rc::new(
            SimulatedUnit::new("cam0", "Camera")
                .with_control(
                    Control::new(1, "Gain", ControlKind::Integer { min: 0, max: 10, step: 1 }),
                    ControlValue::Integer(3),
                )
                .with_control(
                    Control::new(2, "Auto", ControlKind::Boolean),
                    ControlValue::Boolean(false),
                ),
        )
    }

    fn mode_entries() -> Vec<EnumEntry> {
        vec![
            EnumEntry::new("Off"),
            EnumEntry::new("50 Hz"),
            EnumEntry::new("60 Hz"),
            EnumEntry::new("Auto"),
            EnumEntry::disabled("Outdoor"),
        ]
    }

    #[test]
    fn test_attach_builds_rows_and_follows_unit() {
        let h = harness();
        let unit = camera();

        h.panel.attach(unit.clone()).unwrap();

        assert_eq!(h.panel.binding_count(), 2);
        assert_eq!(h.panel.row_ids(), vec![1, 2]);
        assert_eq!(
            h.factory.kinds(),
            vec![(0, "name_label"), (0, "slider"), (0, "value_label"), (1, "check_button")]
        );

        let slider = h.factory.widget(0, "slider").unwrap();
        let value_label = h.factory.widget(0, "value_label").unwrap();
        assert_eq!(slider.value(), 3.0);
        assert_eq!(value_label.text().trim(), "3");
        assert!(!h.factory.widget(1, "check_button").unwrap().is_on());

        unit.set_external_value(1, ControlValue::Integer(7));

        assert_eq!(slider.value(), 7.0);
        assert_eq!(value_label.text().trim(), "7");
        assert_eq!(unit.write_count(), 0);
    }

    #[test]
    fn test_header_and_expander() {
        let h = harness();
        assert_eq!(h.view.header(), INVALID_UNIT_HEADER);

        h.panel.attach(camera()).unwrap();
        assert_eq!(h.view.header(), "Camera [IDLE]");
        assert!(!h.panel.is_expanded());

        h.panel.set_expanded(true);
        assert!(h.view.is_expanded());

        h.panel.detach();
        assert_eq!(h.view.header(), INVALID_UNIT_HEADER);
    }

    #[test]
    fn test_second_attach_is_rejected() {
        let h = harness();
        let unit = camera();
        let other = camera();

        h.panel.attach(unit.clone()).unwrap();
        let result = h.panel.attach(other.clone());

        assert!(matches!(result, Err(PanelError::AlreadyAttached(id)) if id == "cam0"));
        assert_eq!(h.panel.binding_count(), 2);
        assert_eq!(unit.signals().handler_count(), 4);
        assert_eq!(other.signals().handler_count(), 0);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let h = harness();
        let unit = camera();

        h.panel.attach(unit.clone()).unwrap();
        assert_eq!(unit.signals().handler_count(), 4);

        assert!(h.panel.detach());
        assert_eq!(unit.signals().handler_count(), 0);
        assert_eq!(h.panel.binding_count(), 0);
        assert!(h.panel.unit().is_none());
        assert_eq!(h.factory.clear_count(), 1);
        assert!(h.view.formats().is_empty());
        assert_eq!(Rc::strong_count(&unit), 1);

        assert!(!h.panel.detach());
        assert_eq!(h.factory.clear_count(), 1);
    }

    #[test]
    fn test_reattach_after_detach() {
        let h = harness();
        let other = Rc::new(
            SimulatedUnit::new("cam1", "Other")
                .with_control(
                    Control::new(9, "Title", ControlKind::String),
                    ControlValue::String("x".into()),
                ),
        );

        h.panel.attach(camera()).unwrap();
        h.panel.detach();
        h.panel.attach(other.clone()).unwrap();

        assert_eq!(h.panel.row_ids(), vec![9]);
        assert_eq!(h.view.header(), "Other [IDLE]");
        assert_eq!(h.factory.widget(0, "text_entry").unwrap().text(), "x");
    }

    #[test]
    fn test_widget_events_after_detach_are_dropped() {
        let h = harness();
        let unit = camera();

        h.panel.attach(unit.clone()).unwrap();
        let slider = h.factory.widget(0, "slider").unwrap();
        h.panel.detach();

        slider.user_set_value(9.0);
        assert_eq!(unit.write_count(), 0);
    }

    #[test]
    fn test_rejected_write_rolls_back() {
        let h = harness();
        let unit = camera();
        unit.set_rejecting(1, true);

        h.panel.attach(unit.clone()).unwrap();
        let slider = h.factory.widget(0, "slider").unwrap();
        slider.user_set_value(9.0);

        assert_eq!(unit.write_count(), 1);
        assert_eq!(slider.value(), 3.0);
        assert_eq!(h.factory.widget(0, "value_label").unwrap().text().trim(), "3");
    }

    #[test]
    fn test_accepted_write_reaches_unit_once() {
        let h = harness();
        let unit = camera();

        h.panel.attach(unit.clone()).unwrap();
        h.factory.widget(0, "slider").unwrap().user_set_value(6.0);
        h.factory.widget(1, "check_button").unwrap().user_toggle();

        assert_eq!(
            unit.writes(),
            vec![(1, ControlValue::Integer(6)), (2, ControlValue::Boolean(true))]
        );
        assert_eq!(h.factory.widget(0, "value_label").unwrap().text().trim(), "6");
    }

    #[test]
    fn test_unchanged_value_is_not_written() {
        let h = harness();
        let unit = camera();

        h.panel.attach(unit.clone()).unwrap();
        h.factory.widget(0, "slider").unwrap().user_emit_value_changed();

        assert_eq!(unit.write_count(), 0);
    }

    #[test]
    fn test_float_follows_external_change() {
        let h = harness();
        let unit = Rc::new(SimulatedUnit::new("cam0", "Camera").with_control(
            Control::new(
                8,
                "Exposure time",
                ControlKind::Float {
                    min: 0.0,
                    max: 10.0,
                    step: 0.5,
                    display_width: 5,
                    display_precision: 1,
                },
            ),
            ControlValue::Float(2.5),
        ));

        h.panel.attach(unit.clone()).unwrap();
        let slider = h.factory.widget(0, "slider").unwrap();
        assert_eq!(h.factory.widget(0, "value_label").unwrap().text(), "  2.5");

        unit.set_external_value(8, ControlValue::Float(6.5));

        assert_eq!(slider.value(), 6.5);
        assert_eq!(h.factory.widget(0, "value_label").unwrap().text(), "  6.5");
        assert_eq!(unit.write_count(), 0);

        slider.user_set_value(4.0);
        assert_eq!(unit.writes(), vec![(8, ControlValue::Float(4.0))]);
    }

    #[test]
    fn test_spin_button_follows_unit() {
        let h = harness();
        let unit = Rc::new(SimulatedUnit::new("cam0", "Camera").with_control(
            Control::new(9, "Pan", ControlKind::Integer { min: -10, max: 10, step: 1 })
                .with_hints(UiHints::SPIN_BUTTON),
            ControlValue::Integer(0),
        ));

        h.panel.attach(unit.clone()).unwrap();
        assert_eq!(h.factory.kinds(), vec![(0, "name_label"), (0, "spin_button")]);
        let spin = h.factory.widget(0, "spin_button").unwrap();

        unit.set_external_value(9, ControlValue::Integer(-7));
        assert_eq!(spin.value(), -7.0);
        assert_eq!(unit.write_count(), 0);

        spin.user_set_value(4.0);
        assert_eq!(unit.writes(), vec![(9, ControlValue::Integer(4))]);
        assert_eq!(unit.control_value(9), Some(ControlValue::Integer(4)));
    }

    #[test]
    fn test_toggle_button_round_trip() {
        let h = harness();
        let unit = Rc::new(SimulatedUnit::new("cam0", "Camera").with_control(
            Control::new(10, "Privacy", ControlKind::Boolean).with_hints(UiHints::TOGGLE_BUTTON),
            ControlValue::Boolean(false),
        ));

        h.panel.attach(unit.clone()).unwrap();
        let toggle = h.factory.widget(0, "toggle_button").unwrap();
        assert!(!toggle.is_on());

        toggle.user_toggle();
        assert_eq!(unit.writes(), vec![(10, ControlValue::Boolean(true))]);
        assert!(toggle.is_on());

        unit.set_external_value(10, ControlValue::Boolean(false));
        assert!(!toggle.is_on());
        assert_eq!(unit.write_count(), 1);

        unit.set_rejecting(10, true);
        toggle.user_toggle();
        assert_eq!(unit.write_count(), 2);
        assert!(!toggle.is_on());
    }

    #[test]
    fn test_enum_selection_round_trip() {
        let h = harness();
        let unit = Rc::new(SimulatedUnit::new("cam0", "Camera").with_control(
            Control::new(4, "Power line", ControlKind::Enumeration { entries: mode_entries() }),
            ControlValue::Enumeration(0),
        ));

        h.panel.attach(unit.clone()).unwrap();
        let combo = h.factory.widget(0, "dropdown").unwrap();
        assert_eq!(combo.entries_enabled(), vec![true, true, true, true, false]);

        combo.user_select(3);
        assert_eq!(unit.writes(), vec![(4, ControlValue::Enumeration(3))]);
        assert_eq!(combo.selected(), Some(3));

        combo.user_select(4);
        assert_eq!(unit.write_count(), 2);
        assert_eq!(combo.selected(), Some(3));
        assert_eq!(unit.control_value(4), Some(ControlValue::Enumeration(3)));
    }

    #[test]
    fn test_parameters_changed_updates_sensitivity() {
        let h = harness();
        let unit = Rc::new(
            SimulatedUnit::new("cam0", "Camera")
                .with_control(
                    Control::new(
                        1,
                        "Exposure",
                        ControlKind::Integer { min: 1, max: 5000, step: 1 },
                    ),
                    ControlValue::Integer(156),
                )
                .with_control(
                    Control::new(
                        4,
                        "Power line",
                        ControlKind::Enumeration { entries: mode_entries() },
                    ),
                    ControlValue::Enumeration(1),
                ),
        );

        h.panel.attach(unit.clone()).unwrap();
        unit.set_enabled(1, false);
        unit.set_entry_enabled(4, 2, false);

        let slider = h.factory.widget(0, "slider").unwrap();
        assert!(!slider.interactive());
        assert!(!h.factory.widget(0, "name_label").unwrap().interactive());
        assert!(!h.factory.widget(0, "value_label").unwrap().interactive());
        assert_eq!(slider.value(), 156.0);

        let combo = h.factory.widget(1, "dropdown").unwrap();
        assert_eq!(combo.entries_enabled(), vec![true, true, false, true, false]);
        assert_eq!(combo.selected(), Some(1));
        assert_eq!(unit.write_count(), 0);
    }

    #[test]
    fn test_skipped_controls_leave_no_gap() {
        let h = harness();
        let unit = Rc::new(
            SimulatedUnit::new("cam0", "Camera")
                .with_control(
                    Control::new(1, "Broken", ControlKind::Integer { min: 0, max: 10, step: 0 }),
                    ControlValue::Integer(0),
                )
                .with_control(
                    Control::new(
                        2,
                        "Region",
                        ControlKind::Unsupported { type_name: "Area".into() },
                    ),
                    ControlValue::Integer(0),
                )
                .with_control(
                    Control::new(3, "Auto", ControlKind::Boolean),
                    ControlValue::Boolean(true),
                ),
        );

        h.panel.attach(unit.clone()).unwrap();
        unit.set_external_value(1, ControlValue::Integer(4));

        assert_eq!(h.panel.binding_count(), 1);
        assert_eq!(h.panel.row_ids(), vec![3]);
        assert_eq!(h.factory.kinds(), vec![(0, "check_button")]);
        assert!(h.panel.binding(1).is_none());
    }

    #[test]
    fn test_one_shot_button_fires_each_press() {
        let h = harness();
        let unit = Rc::new(SimulatedUnit::new("cam0", "Camera").with_control(
            Control::new(5, "Autofocus once", ControlKind::Boolean).with_hints(UiHints::ONE_SHOT),
            ControlValue::Boolean(false),
        ));

        h.panel.attach(unit.clone()).unwrap();
        let button = h.factory.widget(0, "momentary_button").unwrap();
        button.user_press();
        button.user_press();

        assert_eq!(unit.write_count(), 2);
        assert_eq!(unit.control_value(5), Some(ControlValue::Boolean(false)));
    }

    #[test]
    fn test_text_entry_commit_and_escape() {
        let h = harness();
        let unit = Rc::new(SimulatedUnit::new("cam0", "Camera").with_control(
            Control::new(6, "Title", ControlKind::String),
            ControlValue::String("cam".into()),
        ));

        h.panel.attach(unit.clone()).unwrap();
        let entry = h.factory.widget(0, "text_entry").unwrap();

        entry.user_type("garden");
        entry.user_cancel();
        assert_eq!(entry.text(), "cam");
        assert_eq!(entry.cursor(), 3);

        entry.user_type("porch");
        h.factory.widget(0, "set_button").unwrap().user_press();
        assert_eq!(unit.control_value(6), Some(ControlValue::String("porch".into())));

        entry.user_type("door");
        entry.user_commit();
        assert_eq!(unit.writes().len(), 2);
        assert_eq!(entry.text(), "door");
        assert_eq!(entry.cursor(), 4);
    }

    #[test]
    fn test_chosen_file_is_stored() {
        let h = harness();
        let unit = Rc::new(SimulatedUnit::new("cam0", "Camera").with_control(
            Control::new(7, "Log file", ControlKind::String).with_hints(UiHints::FILENAME),
            ControlValue::String(String::new()),
        ));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.log");

        h.panel.attach(unit.clone()).unwrap();
        h.factory.widget(0, "chooser_button").unwrap().user_choose_file(path.clone());

        let expected = path.to_string_lossy().into_owned();
        assert_eq!(unit.control_value(7), Some(ControlValue::String(expected.clone())));
        assert_eq!(h.factory.widget(0, "file_entry").unwrap().text(), expected);
    }

    #[test]
    fn test_format_switch_restarts_stream() {
        let h = harness();
        let unit = Rc::new(
            SimulatedUnit::new("cam0", "Camera")
                .with_output_formats(vec![
                    OutputFormat::new("YUYV 4:2:2", "YUYV"),
                    OutputFormat::new("Motion-JPEG", "MJPG"),
                ])
                .with_status(UnitStatus::Streaming),
        );

        h.panel.attach(unit.clone()).unwrap();
        assert_eq!(h.view.formats(), vec!["YUYV 4:2:2", "Motion-JPEG"]);
        assert_eq!(h.view.selected_format(), Some(0));
        assert!(unit.stream_calls().is_empty());

        h.view.user_select_format(1);

        assert_eq!(
            unit.stream_calls(),
            vec!["set_preferred_format", "shutdown", "init", "stream_on"]
        );
        assert_eq!(h.view.selected_format(), Some(1));
        assert_eq!(h.view.header(), "Camera [STREAMING]");
        assert_eq!(h.panel.format_selection().selected_index(), Some(1));

        h.view.user_select_format(1);
        assert_eq!(unit.stream_calls().len(), 4);
    }

    #[test]
    fn test_failed_format_switch_shows_actual_format() {
        let h = harness();
        let unit = Rc::new(
            SimulatedUnit::new("cam0", "Camera")
                .with_output_formats(vec![
                    OutputFormat::new("YUYV 4:2:2", "YUYV"),
                    OutputFormat::new("Motion-JPEG", "MJPG"),
                ])
                .with_status(UnitStatus::Streaming),
        );
        unit.fail_stream_call("init");

        h.panel.attach(unit.clone()).unwrap();
        h.view.user_select_format(1);

        assert_eq!(
            unit.stream_calls(),
            vec!["set_preferred_format", "shutdown", "init", "stream_on"]
        );
        assert_eq!(unit.status(), UnitStatus::Idle);
        assert_eq!(h.view.header(), "Camera [IDLE]");
        assert_eq!(h.view.selected_format(), Some(0));
    }

    #[test]
    fn test_close_request_is_forwarded() {
        let h = harness();
        let closes = Rc::new(Cell::new(0));

        let closes_copy = closes.clone();
        h.panel.connect_close_requested(move || closes_copy.set(closes_copy.get() + 1));
        h.panel.attach(camera()).unwrap();
        h.view.user_click_close();

        assert_eq!(closes.get(), 1);
        assert!(h.panel.is_attached());
    }

    #[test]
    fn test_drop_detaches() {
        let h = harness();
        let unit = camera();

        h.panel.attach(unit.clone()).unwrap();
        let slider = h.factory.widget(0, "slider").unwrap();
        drop(h);

        assert_eq!(unit.signals().handler_count(), 0);
        assert_eq!(Rc::strong_count(&unit), 1);

        slider.user_set_value(8.0);
        assert_eq!(unit.write_count(), 0);
    }

    #[test]
    fn test_with_unit_attaches() {
        let view = Rc::new(FakePanelView::new());
        let factory = Rc::new(FakeFactory::new());
        let unit = camera();

        let panel = ControlsPanel::with_unit(view.clone(), factory.clone(), unit.clone());

        assert!(panel.is_attached());
        assert_eq!(panel.unit().map(|u| u.id().to_string()), Some("cam0".to_string()));
        assert_eq!(view.header(), "Camera [IDLE]");
    }
}
