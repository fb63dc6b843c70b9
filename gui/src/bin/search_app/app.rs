use eframe::egui;
use numsearch_core::benchmark::ResultTone;
use numsearch_core::controller::{Controller, Dispatch, Notification};
use numsearch_core::SearchConfig;
use std::time::{Duration, Instant};

/// How often the window polls for worker outcomes while one is running.
const BUSY_REPAINT: Duration = Duration::from_millis(50);
/// How often the number file is re-checked, so the Search button follows
/// files created or deleted outside the window.
const FILE_RECHECK: Duration = Duration::from_millis(500);

pub(crate) struct SearchApp {
    controller: Controller,
    query: String,
    last_file_check: Instant,
}

impl SearchApp {
    pub(crate) fn new(config: SearchConfig) -> Self {
        Self {
            controller: Controller::new(config),
            query: String::new(),
            last_file_check: Instant::now(),
        }
    }

    fn recheck_file(&mut self, now: Instant) {
        if now.duration_since(self.last_file_check) < FILE_RECHECK || self.controller.is_busy() {
            return;
        }
        self.last_file_check = now;
        let before = self.controller.file_status();
        let after = self.controller.refresh_file_status();
        if before != after {
            log::debug!("Number file changed from {before:?} to {after:?}");
        }
    }

    fn generate(&mut self) {
        if self.controller.request_generate() == Dispatch::Ignored {
            log::debug!("Generate button pressed while generating");
        }
    }

    fn search(&mut self) {
        let query = self.query.clone();
        match self.controller.request_search(&query) {
            Dispatch::Started => log::debug!("Loading numbers before searching {query:?}"),
            Dispatch::Ignored => log::debug!("Search button pressed while loading"),
            Dispatch::Completed(_) | Dispatch::Rejected => {}
        }
    }

    /// Errors are shown as modal dialogs, one at a time, in arrival order.
    fn show_notifications(&mut self) {
        for note in self.controller.take_notifications() {
            show_error_dialog(&note);
        }
    }
}

fn show_error_dialog(note: &Notification) {
    log::warn!("{}: {}", note.title, note.message);
    let _ = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(&note.title)
        .set_description(&note.message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn tone_color(tone: ResultTone) -> egui::Color32 {
    match tone {
        ResultTone::Found => egui::Color32::GREEN,
        ResultTone::NotFound => egui::Color32::RED,
    }
}

impl eframe::App for SearchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.pump();
        self.show_notifications();
        self.recheck_file(Instant::now());

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(10.0);

            let generate_enabled = !self.controller.is_generating();
            ui.vertical_centered_justified(|ui| {
                if ui
                    .add_enabled(generate_enabled, egui::Button::new("Generate numbers"))
                    .clicked()
                {
                    self.generate();
                }
            });

            ui.add_space(10.0);

            let search_enabled = self.controller.search_enabled();
            let mut submit = false;
            ui.horizontal(|ui| {
                let entry = ui.add(
                    egui::TextEdit::singleline(&mut self.query).hint_text("Number to search"),
                );
                if entry.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                if ui
                    .add_enabled(search_enabled, egui::Button::new("Search"))
                    .clicked()
                {
                    submit = true;
                }
            });
            if submit && search_enabled {
                self.search();
            }

            ui.add_space(5.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(self.controller.status()).color(egui::Color32::GRAY));

                if let Some(result) = self.controller.result() {
                    ui.add_space(10.0);
                    let label = ui.colored_label(
                        tone_color(result.tone),
                        egui::RichText::new(&result.text).size(16.0),
                    );
                    if let Some(run) = self.controller.last_benchmark() {
                        label.on_hover_text(format!(
                            "{} lookups of {} in {:.2?}",
                            run.trials, run.target, run.elapsed
                        ));
                    }
                }

                if self.controller.is_busy() {
                    ui.add_space(5.0);
                    ui.add(egui::Spinner::new());
                }
            });
        });

        if self.controller.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        } else {
            ctx.request_repaint_after(FILE_RECHECK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> SearchConfig {
        SearchConfig {
            file_path: dir.join("numeros.txt"),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn found_is_green_and_not_found_is_red() {
        assert_eq!(tone_color(ResultTone::Found), egui::Color32::GREEN);
        assert_eq!(tone_color(ResultTone::NotFound), egui::Color32::RED);
    }

    #[test]
    fn new_app_starts_idle() {
        let dir = tempdir().unwrap();
        let app = SearchApp::new(config_in(dir.path()));
        assert!(!app.controller.is_busy());
        assert!(!app.controller.search_enabled());
        assert!(app.query.is_empty());
    }

    #[test]
    fn search_follows_files_created_and_deleted_outside_the_window() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let path = config.file_path.clone();
        let mut app = SearchApp::new(config);
        let start = app.last_file_check;

        fs::write(&path, "1\n2\n").unwrap();
        app.recheck_file(start);
        assert!(!app.controller.search_enabled());

        app.recheck_file(start + FILE_RECHECK);
        assert!(app.controller.search_enabled());

        fs::remove_file(&path).unwrap();
        app.recheck_file(start + FILE_RECHECK * 2);
        assert!(!app.controller.search_enabled());
    }
}
