use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use egui::Ui;
use log::{debug, info};
use tempfile::Builder;

use crate::constants::{Format, PREVIEW_PLACEHOLDER};
use crate::error::{AppError, Result};

/// Preview surface for converted output. Holds the HTML verbatim when the
/// target format is HTML and a fixed notice otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlPreview {
    content: String,
    placeholder: bool,
}

impl HtmlPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, content: &str, target: Format) {
        if target.is_html() {
            self.content = content.to_string();
            self.placeholder = false;
        } else {
            self.content = PREVIEW_PLACEHOLDER.to_string();
            self.placeholder = true;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Writes the current content to a temporary `.html` file and returns its path.
    /// The file is kept on disk so an external viewer can open it later.
    pub fn write_temp_file(&self) -> Result<PathBuf> {
        let mut file = Builder::new()
            .prefix("pandoc-preview-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| AppError::new_io_error(e, "Failed to create preview file"))?;

        file.write_all(self.content.as_bytes())
            .map_err(|e| AppError::new_io_error(e, "Failed to write preview file"))?;

        let (_, path) = file
            .keep()
            .map_err(|e| AppError::new_io_error(e.error, "Failed to keep preview file"))?;
        debug!("Preview written to {:?}", path);
        Ok(path)
    }

    /// Opens the preview in the system's default browser.
    pub fn open_in_browser(&self) -> Result<PathBuf> {
        let path = self.write_temp_file()?;
        opener_command(&path)
            .spawn()
            .map_err(|e| AppError::new_io_error(e, "Failed to launch browser"))?;
        info!("Opened preview in browser: {:?}", path);
        Ok(path)
    }

    /// Renders the surface; returns true when the user asked to open it in a browser.
    pub fn render(&self, ui: &mut Ui) -> bool {
        let mut open_requested = false;

        if self.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(30.0);
                ui.weak("Convert something to HTML to preview it here");
            });
            return false;
        }

        if self.is_placeholder() {
            ui.vertical_centered(|ui| {
                ui.add_space(30.0);
                ui.label(
                    egui::RichText::new("Preview only available for HTML output.")
                        .color(egui::Color32::from_rgb(150, 0, 0)),
                );
            });
            return false;
        }

        ui.horizontal(|ui| {
            if ui.button("🌐 Open in Browser").clicked() {
                open_requested = true;
            }
            ui.weak(format!("{} bytes of HTML", self.content.len()));
        });
        ui.separator();

        let mut source = self.content.as_str();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut source)
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });

        open_requested
    }
}

fn opener_command(path: &std::path::Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.arg("/C").arg("start").arg("").arg(path);
        command
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(path);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    }
}
