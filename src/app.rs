use std::sync::mpsc;
use std::thread;
use egui::Context;
use log::{debug, info, warn, error};

use crate::constants::{
    Format, DEFAULT_FROM_FORMAT, DEFAULT_TO_FORMAT, EMPTY_INPUT_NOTICE, ERROR_DIALOG_TITLE,
    NO_OUTPUT_NOTICE, STATUS_CONVERTING, STATUS_COPIED, STATUS_ERROR, STATUS_READY, STATUS_SUCCESS,
};
use crate::converter::{ConversionRequest, Converter};
use crate::error::{AppError, Result};
use crate::events::{AppEvent, ConversionOutcome};
use crate::preview::HtmlPreview;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Input,
    Output,
    Preview,
}

pub struct PandocConverterApp {
    // Core state
    converter: Converter,
    converter_version: Option<String>,

    // Buffers
    input_text: String,
    output_text: String,
    from_format: Format,
    to_format: Format,
    preview: HtmlPreview,

    // UI state
    active_tab: Tab,

    // Communication
    event_sender: mpsc::Sender<AppEvent>,
    event_receiver: mpsc::Receiver<AppEvent>,
    repaint_context: Option<Context>,

    // UI feedback
    status_message: String,
    error_message: Option<String>,

    // Operation states
    latest_request_id: u64,
    conversions_in_flight: usize,
}

impl PandocConverterApp {
    pub fn new(cc: &eframe::CreationContext<'_>, converter: Converter, converter_version: String) -> Self {
        let mut app = Self::with_converter(converter);
        app.converter_version = Some(converter_version);
        app.repaint_context = Some(cc.egui_ctx.clone());
        app
    }

    pub fn with_converter(converter: Converter) -> Self {
        let (event_sender, event_receiver) = mpsc::channel();

        Self {
            converter,
            converter_version: None,
            input_text: String::new(),
            output_text: String::new(),
            from_format: DEFAULT_FROM_FORMAT,
            to_format: DEFAULT_TO_FORMAT,
            preview: HtmlPreview::new(),
            active_tab: Tab::Input,
            event_sender,
            event_receiver,
            repaint_context: None,
            status_message: STATUS_READY.to_string(),
            error_message: None,
            latest_request_id: 0,
            conversions_in_flight: 0,
        }
    }

    pub fn is_converting(&self) -> bool {
        self.conversions_in_flight > 0
    }

    fn set_status_message(&mut self, message: &str) {
        self.status_message = message.to_string();
    }

    fn show_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    fn dismiss_error(&mut self) {
        self.error_message = None;
    }

    /// Validates the input and hands the conversion to a background thread.
    /// Returns the id of the submitted request, or `None` when nothing was submitted.
    pub fn start_conversion(&mut self) -> Option<u64> {
        self.set_status_message(STATUS_CONVERTING);

        let request = match ConversionRequest::new(&self.input_text, self.from_format, self.to_format) {
            Ok(request) => request,
            Err(AppError::EmptyInput) => {
                self.show_error(EMPTY_INPUT_NOTICE.to_string());
                self.set_status_message(STATUS_READY);
                return None;
            }
            Err(e) => {
                error!("Could not build conversion request: {}", e);
                self.show_error(e.to_string());
                self.set_status_message(STATUS_ERROR);
                return None;
            }
        };

        self.latest_request_id += 1;
        self.conversions_in_flight += 1;
        let request_id = self.latest_request_id;

        info!("Converting {} -> {} (request {})", request.from, request.to, request_id);

        let converter = self.converter.clone();
        let sender = self.event_sender.clone();
        let repaint_context = self.repaint_context.clone();

        thread::spawn(move || {
            let outcome = ConversionOutcome {
                request_id,
                target: request.to,
                result: converter.convert_request(&request),
            };

            if let Err(e) = sender.send(AppEvent::ConversionComplete(outcome)) {
                error!("{}", AppError::ChannelSend(e.to_string()));
            }
            if let Some(ctx) = repaint_context {
                ctx.request_repaint();
            }
        });

        Some(request_id)
    }

    fn handle_conversion_complete(&mut self, outcome: ConversionOutcome) {
        self.conversions_in_flight = self.conversions_in_flight.saturating_sub(1);

        // Only the most recent request may touch the buffers.
        if outcome.request_id != self.latest_request_id {
            debug!(
                "Discarding outcome of superseded request {} (latest is {})",
                outcome.request_id, self.latest_request_id
            );
            return;
        }

        match outcome.result {
            Ok(output) => {
                info!("Conversion {} succeeded ({} bytes)", outcome.request_id, output.len());
                self.preview.update(&output, outcome.target);
                self.output_text = output;
                self.active_tab = Tab::Output;
                self.set_status_message(STATUS_SUCCESS);
            }
            Err(e) => {
                error!("Conversion {} failed: {}", outcome.request_id, e);
                self.show_error(e.to_string());
                self.set_status_message(STATUS_ERROR);
            }
        }
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ConversionComplete(outcome) => {
                self.handle_conversion_complete(outcome);
            }
        }
    }

    /// Returns the text to place on the clipboard, if there is any.
    pub fn copy_output(&mut self) -> Option<String> {
        let output = self.output_text.trim_end_matches('\n');
        if output.is_empty() {
            self.show_error(NO_OUTPUT_NOTICE.to_string());
            return None;
        }

        let output = output.to_string();
        self.set_status_message(STATUS_COPIED);
        Some(output)
    }

    pub fn clear(&mut self) {
        self.input_text.clear();
        self.output_text.clear();
        self.preview.clear();
        self.active_tab = Tab::Input;
        self.set_status_message(STATUS_READY);
    }

    pub fn swap_formats(&mut self) {
        std::mem::swap(&mut self.from_format, &mut self.to_format);
    }

    fn open_preview_in_browser(&mut self) -> Result<()> {
        self.preview.open_in_browser().map(|_| ())
    }

    fn render_format_selector(ui: &mut egui::Ui, id: &str, label: &str, format: &mut Format) {
        ui.label(label);
        egui::ComboBox::from_id_source(id)
            .selected_text(format.pandoc_name())
            .width(150.0)
            .show_ui(ui, |ui| {
                for candidate in Format::ALL {
                    ui.selectable_value(format, candidate, candidate.pandoc_name())
                        .on_hover_text(candidate.name());
                }
            });
    }

    fn render_toolbar(&mut self, ctx: &Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            Self::render_format_selector(ui, "from_format", "From:", &mut self.from_format);

            if ui.small_button("⇄").on_hover_text("Swap formats").clicked() {
                self.swap_formats();
            }

            ui.add_space(10.0);
            Self::render_format_selector(ui, "to_format", "To:", &mut self.to_format);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let convert_button = egui::Button::new("Convert ▶").min_size(egui::vec2(90.0, 24.0));
                if ui
                    .add_enabled(!self.is_converting(), convert_button)
                    .on_hover_text("Ctrl+Enter")
                    .clicked()
                {
                    self.start_conversion();
                }

                if ui.button("Copy Output").clicked() {
                    if let Some(text) = self.copy_output() {
                        ctx.output_mut(|o| o.copied_text = text);
                    }
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }
            });
        });
    }

    fn render_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.active_tab, Tab::Input, "Input");
            ui.selectable_value(&mut self.active_tab, Tab::Output, "Output");
            ui.selectable_value(&mut self.active_tab, Tab::Preview, "HTML Preview");
        });
        ui.separator();

        match self.active_tab {
            Tab::Input => Self::render_text_buffer(ui, &mut self.input_text),
            Tab::Output => Self::render_text_buffer(ui, &mut self.output_text),
            Tab::Preview => {
                if self.preview.render(ui) {
                    if let Err(e) = self.open_preview_in_browser() {
                        warn!("Could not open preview: {}", e);
                        self.show_error(e.to_string());
                    }
                }
            }
        }
    }

    fn render_text_buffer(ui: &mut egui::Ui, buffer: &mut String) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_sized(
                    ui.available_size(),
                    egui::TextEdit::multiline(buffer)
                        .font(egui::TextStyle::Monospace)
                        .desired_width(f32::INFINITY),
                );
            });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.is_converting() {
                ui.spinner();
            }
            if self.status_message == STATUS_ERROR {
                ui.colored_label(egui::Color32::from_rgb(150, 0, 0), &self.status_message);
            } else {
                ui.label(&self.status_message);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(version) = &self.converter_version {
                    ui.weak(version);
                }
            });
        });
    }

    fn render_error_dialog(&mut self, ctx: &Context) {
        let Some(message) = self.error_message.clone() else {
            return;
        };

        egui::Window::new(ERROR_DIALOG_TITLE)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                    ui.colored_label(egui::Color32::from_rgb(150, 0, 0), &message);
                });
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        self.dismiss_error();
                    }
                });
            });
    }
}

impl eframe::App for PandocConverterApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // Process background events
        self.process_events();

        if !self.is_converting()
            && ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter))
        {
            self.start_conversion();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(5.0);
            self.render_toolbar(ctx, ui);
            ui.add_space(5.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_tabs(ui);
        });

        self.render_error_dialog(ctx);

        // Keep the spinner moving
        if self.is_converting() {
            ctx.request_repaint();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::constants::PREVIEW_PLACEHOLDER;
    use crate::converter::tests::stand_in;

    fn app_with(script: &str) -> PandocConverterApp {
        PandocConverterApp::with_converter(stand_in(script))
    }

    /// Blocks until `count` background conversions have reported back.
    fn wait_for_outcomes(app: &mut PandocConverterApp, count: usize) {
        for _ in 0..count {
            let event = app
                .event_receiver
                .recv_timeout(Duration::from_secs(10))
                .expect("conversion did not finish");
            app.handle_event(event);
        }
    }

    #[test]
    fn success_copies_output_verbatim() {
        let mut app = app_with("cat; printf '\\n-- converted'");
        app.input_text = "# Title\n\nBody ✓".to_string();

        assert!(app.start_conversion().is_some());
        assert!(app.is_converting());
        assert_eq!(app.status_message, STATUS_CONVERTING);
        wait_for_outcomes(&mut app, 1);

        assert_eq!(app.output_text, "# Title\n\nBody ✓\n-- converted");
        assert_eq!(app.status_message, STATUS_SUCCESS);
        assert_eq!(app.active_tab, Tab::Output);
        assert!(app.error_message.is_none());
        assert!(!app.is_converting());
    }

    #[test]
    fn empty_input_never_calls_converter() {
        // A converter that would fail loudly if it were ever launched.
        let mut app = app_with("echo launched >&2; exit 9");

        for input in ["", "  \n\t\n"] {
            app.input_text = input.to_string();
            assert_eq!(app.start_conversion(), None);
            assert_eq!(app.error_message.as_deref(), Some(EMPTY_INPUT_NOTICE));
            assert_eq!(app.status_message, STATUS_READY);
            assert!(!app.is_converting());
            app.dismiss_error();
        }

        assert!(app.event_receiver.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn failure_shows_diagnostic_and_keeps_output() {
        let mut app = app_with("cat >/dev/null; echo 'pandoc: Unknown reader: bogus' >&2; exit 2");
        app.input_text = "text".to_string();
        app.output_text = "previous output".to_string();
        app.preview.update("<p>previous</p>", Format::Html);

        app.start_conversion();
        wait_for_outcomes(&mut app, 1);

        let message = app.error_message.clone().expect("error dialog should be shown");
        assert!(message.contains("pandoc: Unknown reader: bogus"));
        assert_eq!(app.output_text, "previous output");
        assert_eq!(app.preview.content(), "<p>previous</p>");
        assert_eq!(app.status_message, STATUS_ERROR);
        assert!(!app.is_converting());
    }

    #[test]
    fn non_html_target_shows_placeholder() {
        let mut app = app_with("cat");
        app.input_text = "<h1>Hi</h1>".to_string();
        app.to_format = Format::Latex;

        app.start_conversion();
        wait_for_outcomes(&mut app, 1);

        assert_eq!(app.output_text, "<h1>Hi</h1>");
        assert_eq!(app.preview.content(), PREVIEW_PLACEHOLDER);
    }

    #[test]
    fn html_target_previews_output() {
        let mut app = app_with("cat >/dev/null; printf '<h1 id=\"hi\">Hi</h1>\\n'");
        app.input_text = "# Hi".to_string();
        app.to_format = Format::Html;

        app.start_conversion();
        wait_for_outcomes(&mut app, 1);

        assert_eq!(app.output_text, "<h1 id=\"hi\">Hi</h1>\n");
        assert_eq!(app.preview.content(), app.output_text);
    }

    #[test]
    fn superseded_outcome_is_discarded() {
        // The first request sleeps so its outcome arrives after the second one.
        let mut app = app_with("read line; if [ \"$line\" = slow ]; then sleep 1; fi; printf '%s' \"$line\"");

        app.input_text = "slow".to_string();
        let first = app.start_conversion().unwrap();
        app.input_text = "fast".to_string();
        let second = app.start_conversion().unwrap();
        assert!(second > first);

        wait_for_outcomes(&mut app, 2);

        assert_eq!(app.output_text, "fast");
        assert!(!app.is_converting());
    }

    #[test]
    fn copy_output_requires_output() {
        let mut app = app_with("cat");
        assert_eq!(app.copy_output(), None);
        assert_eq!(app.error_message.as_deref(), Some(NO_OUTPUT_NOTICE));

        app.dismiss_error();
        app.output_text = "converted\n\n".to_string();
        assert_eq!(app.copy_output().as_deref(), Some("converted"));
        assert_eq!(app.status_message, STATUS_COPIED);
        assert!(app.error_message.is_none());
    }

    #[test]
    fn swap_and_clear() {
        let mut app = app_with("cat");
        app.swap_formats();
        assert_eq!(app.from_format, DEFAULT_TO_FORMAT);
        assert_eq!(app.to_format, DEFAULT_FROM_FORMAT);

        app.input_text = "in".to_string();
        app.output_text = "out".to_string();
        app.preview.update("<p>out</p>", Format::Html);
        app.clear();
        assert!(app.input_text.is_empty());
        assert!(app.output_text.is_empty());
        assert!(app.preview.is_empty());
        assert_eq!(app.status_message, STATUS_READY);
    }
}
