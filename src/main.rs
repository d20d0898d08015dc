mod constants;
mod error;
mod events;
mod converter;
mod preview;
mod app;

use eframe::NativeOptions;
use log::{error, info};

use app::PandocConverterApp;
use constants::{APP_TITLE, MISSING_CONVERTER_MESSAGE, MISSING_CONVERTER_TITLE, WINDOW_SIZE};
use converter::Converter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting {}", APP_TITLE);

    let converter = Converter::default();
    let version = match converter.verify() {
        Ok(version) => version,
        Err(e) => {
            error!("Startup check failed: {}", e);
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title(MISSING_CONVERTER_TITLE)
                .set_description(MISSING_CONVERTER_MESSAGE)
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
            std::process::exit(1);
        }
    };

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title(APP_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Box::new(PandocConverterApp::new(cc, converter, version))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the user interface: {e}"))
}
