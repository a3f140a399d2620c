use std::rc::Rc;
use std::sync::OnceLock;

use glib::subclass::Signal;
use gtk::prelude::*;
use gtk::subclass::prelude::*;

use crate::widgets::{ControlsPanel, GtkPanelView};

pub struct UnitControlWidget {
    pub view: Rc<GtkPanelView>,
    pub panel: ControlsPanel,
}

impl Default for UnitControlWidget {
    fn default() -> Self {
        let view = GtkPanelView::new();
        let panel = ControlsPanel::new(view.clone(), view.clone());

        UnitControlWidget { view, panel }
    }
}

#[glib::object_subclass]
impl ObjectSubclass for UnitControlWidget {
    const NAME: &'static str = "UnitControlWidget";
    type Type = super::UnitControlWidget;
    type ParentType = gtk::Box;
}

impl ObjectImpl for UnitControlWidget {
    fn signals() -> &'static [Signal] {
        static SIGNALS: OnceLock<Vec<Signal>> = OnceLock::new();
        SIGNALS.get_or_init(|| vec![Signal::builder("close-requested").build()])
    }

    fn constructed(&self) {
        self.parent_constructed();

        let obj = self.obj();
        obj.set_orientation(gtk::Orientation::Vertical);
        obj.append(self.view.widget());

        let widget = obj.downgrade();
        self.panel.connect_close_requested(move || {
            if let Some(widget) = widget.upgrade() {
                widget.emit_by_name::<()>("close-requested", &[]);
            }
        });
    }

    fn dispose(&self) {
        self.panel.detach();
    }
}

impl WidgetImpl for UnitControlWidget {}

impl BoxImpl for UnitControlWidget {}
