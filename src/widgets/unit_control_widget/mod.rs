use std::rc::Rc;

use gtk::glib;
use gtk::glib::closure_local;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use log::warn;

use crate::unit::Unit;
use crate::widgets::PanelError;

mod imp;

glib::wrapper! {
    /// Shows the controls of one unit, with a header naming the unit and its
    /// status, an expander for the controls table and an output format
    /// selector.
    ///
    /// Emits `close-requested` when its close button is clicked; whoever owns
    /// the widget decides what closing means.
    pub struct UnitControlWidget(ObjectSubclass<imp::UnitControlWidget>)
        @extends gtk::Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl Default for UnitControlWidget {
    fn default() -> Self {
        glib::Object::new()
    }
}

impl UnitControlWidget {
    pub fn new(unit: Rc<dyn Unit>) -> Self {
        let widget = Self::default();
        if let Err(e) = widget.attach(unit) {
            warn!("{}", e);
        }
        widget
    }

    pub fn attach(&self, unit: Rc<dyn Unit>) -> Result<(), PanelError> {
        self.imp().panel.attach(unit)
    }

    pub fn detach(&self) -> bool {
        self.imp().panel.detach()
    }

    pub fn unit(&self) -> Option<Rc<dyn Unit>> {
        self.imp().panel.unit()
    }

    pub fn set_expanded(&self, expanded: bool) {
        self.imp().panel.set_expanded(expanded);
    }

    pub fn is_expanded(&self) -> bool {
        self.imp().panel.is_expanded()
    }

    pub fn connect_close_requested<F: Fn(&Self) + 'static>(&self, f: F) -> glib::SignalHandlerId {
        self.connect_closure(
            "close-requested",
            false,
            closure_local!(move |widget: UnitControlWidget| f(&widget)),
        )
    }
}
