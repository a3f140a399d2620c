use std::rc::{Rc, Weak};

use adw::{prelude::*, HeaderBar, StatusPage};
use gtk::{
    gio, glib, ApplicationWindow, Orientation, PolicyType, ScrolledWindow, Stack, ToggleButton,
};
use log::{debug, error, info};
use unit_control_widget::unit::{Unit, V4l2Unit};
use unit_control_widget::widgets::UnitControlWidget;

use crate::camera::{demo_camera, open_cameras};

const APP_ID: &str = "de.pixelgerecht.UnitControls";

const WINDOW_WIDTH: i32 = 520;
const WINDOW_HEIGHT: i32 = 760;

const DEVICE_DIR: &str = "/dev";
const POLL_INTERVAL_SECS: u32 = 1;

const PAGE_UNITS: &str = "units";
const PAGE_EMPTY: &str = "empty";

mod imp {
    use super::*;
    use adw::subclass::prelude::*;

    #[derive(Debug, Default)]
    pub struct Application;

    #[glib::object_subclass]
    impl ObjectSubclass for Application {
        const NAME: &'static str = "UnitControlsApplication";
        type Type = super::Application;
        type ParentType = adw::Application;
    }

    impl ObjectImpl for Application {}

    impl ApplicationImpl for Application {
        fn activate(&self) {
            debug!("Application::activate");

            self.parent_activate();
            let app = self.obj();

            if let Some(window) = app.active_window() {
                window.present();
                return;
            }

            let cameras = open_cameras(DEVICE_DIR);
            let mut units: Vec<Rc<dyn Unit>> = cameras
                .iter()
                .map(|c| c.clone() as Rc<dyn Unit>)
                .collect();

            if units.is_empty() {
                info!("No camera found in {}, showing a simulated one", DEVICE_DIR);
                units.push(Rc::new(demo_camera()));
            }

            poll_cameras(&cameras);

            let panels = gtk::Box::builder()
                .orientation(Orientation::Vertical)
                .margin_end(12)
                .margin_top(12)
                .margin_start(12)
                .margin_bottom(12)
                .spacing(12)
                .build();

            let scrolled = ScrolledWindow::builder()
                .child(&panels)
                .hscrollbar_policy(PolicyType::Never)
                .vexpand(true)
                .build();

            let status_page = StatusPage::builder()
                .icon_name("camera-disabled-symbolic")
                .title("No units")
                .description("Every unit panel has been closed")
                .build();

            let stack = Stack::new();
            stack.add_named(&scrolled, Some(PAGE_UNITS));
            stack.add_named(&status_page, Some(PAGE_EMPTY));
            stack.set_visible_child_name(PAGE_UNITS);

            for unit in units {
                info!("Showing {} ({})", unit.name(), unit.id());
                let widget = UnitControlWidget::new(unit);

                let panels_for_close = panels.clone();
                let stack_for_close = stack.clone();
                widget.connect_close_requested(move |widget| {
                    widget.detach();
                    panels_for_close.remove(widget);

                    if panels_for_close.first_child().is_none() {
                        stack_for_close.set_visible_child_name(PAGE_EMPTY);
                    }
                });

                panels.append(&widget);
            }

            let expand_button = ToggleButton::builder()
                .css_classes(["flat"])
                .icon_name("view-fullscreen-symbolic")
                .tooltip_text("Expand all units")
                .build();

            let panels_for_expand = panels.clone();
            expand_button.connect_toggled(move |button| {
                let mut child = panels_for_expand.first_child();
                while let Some(widget) = child {
                    if let Some(panel) = widget.downcast_ref::<UnitControlWidget>() {
                        panel.set_expanded(button.is_active());
                    }
                    child = widget.next_sibling();
                }
            });

            let header_bar = HeaderBar::new();
            header_bar.pack_start(&expand_button);

            let window = ApplicationWindow::builder()
                .application(app.as_ref())
                .child(&stack)
                .default_height(WINDOW_HEIGHT)
                .default_width(WINDOW_WIDTH)
                .title("Unit Controls")
                .titlebar(&header_bar)
                .build();

            window.present();
        }

        fn startup(&self) {
            self.parent_startup();
            let app = self.obj();

            // Set icons for shell
            gtk::Window::set_default_icon_name(APP_ID);

            app.setup_gactions();
            app.setup_accels();
        }
    }

    impl GtkApplicationImpl for Application {}

    impl AdwApplicationImpl for Application {}
}

glib::wrapper! {
    pub struct Application(ObjectSubclass<imp::Application>)
        @extends gio::Application, gtk::Application, adw::Application,
        @implements gio::ActionMap, gio::ActionGroup;
}

impl Default for Application {
    fn default() -> Self {
        glib::Object::builder()
            .property("application-id", APP_ID)
            .build()
    }
}

impl Application {
    pub fn new() -> Self {
        Self::default()
    }

    fn setup_gactions(&self) {
        let actions = [gio::ActionEntryBuilder::new("quit")
            .activate(|app: &Self, _, _| app.quit())
            .build()];
        self.add_action_entries(actions);
    }

    // Sets up keyboard shortcuts
    fn setup_accels(&self) {
        self.set_accels_for_action("app.quit", &["<Control>q"]);
        self.set_accels_for_action("window.close", &["<Ctrl>w"]);
    }
}

/// Re-reads the cameras' controls periodically, so changes made by other
/// programs show up. Stops once every camera is gone.
fn poll_cameras(cameras: &[Rc<V4l2Unit>]) {
    if cameras.is_empty() {
        return;
    }

    let cameras: Vec<Weak<V4l2Unit>> = cameras.iter().map(Rc::downgrade).collect();

    glib::timeout_add_seconds_local(POLL_INTERVAL_SECS, move || {
        let mut alive = false;

        for camera in cameras.iter().filter_map(Weak::upgrade) {
            alive = true;
            if let Err(e) = camera.refresh() {
                error!("Error refreshing {}: {}", camera.id(), e);
            }
        }

        if alive {
            glib::ControlFlow::Continue
        } else {
            debug!("No camera left to poll");
            glib::ControlFlow::Break
        }
    });
}
