use adw::prelude::*;
use gtk::glib;

mod application;
mod camera;
mod files;

use application::Application;

fn main() -> glib::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = Application::new();

    // Run the application
    app.run()
}
