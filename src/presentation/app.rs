use crate::domain::beacon::BeaconController;
use crate::domain::models::{AdvertiserCommand, MessageSeverity, StatusMessage, Tab};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::AdvertiserHandle;
use crate::infrastructure::logging::LoggingGuard;
use crate::presentation::{tabs, theme};
use eframe::egui;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

const TOAST_DURATION: Duration = Duration::from_secs(3);

pub struct BeaconApp {
    // Services
    pub(crate) settings: SettingsService,
    pub(crate) advertiser: AdvertiserHandle,

    // State
    pub(crate) controller: BeaconController,
    pub(crate) toast: Option<(StatusMessage, Instant)>,

    // UI State
    pub(crate) selected_tab: Tab,
    /// Name being typed into the "Save Preset" window while it is open.
    pub(crate) save_dialog: Option<String>,
    pub(crate) is_dark_mode: bool,

    // Logging guard
    pub(crate) _logging_guard: Option<LoggingGuard>,
}

impl BeaconApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: SettingsService,
        advertiser: AdvertiserHandle,
        logging_guard: Option<LoggingGuard>,
    ) -> Self {
        theme::apply(&cc.egui_ctx, false);

        let controller =
            BeaconController::with_presets(settings.presets(), settings.get().last_preset.as_deref());
        advertiser.send(AdvertiserCommand::CheckCapabilities);

        Self {
            settings,
            advertiser,
            controller,
            toast: None,
            selected_tab: Tab::Broadcast,
            save_dialog: None,
            is_dark_mode: false,
            _logging_guard: logging_guard,
        }
    }

    pub(crate) fn show_toast(&mut self, message: StatusMessage) {
        self.toast = Some((message, Instant::now()));
    }

    /// Move a toast raised by the controller onto the screen.
    fn take_controller_toast(&mut self) {
        if let Some(message) = self.controller.take_toast() {
            self.show_toast(message);
        }
    }

    fn drain_events(&mut self) {
        while let Some(event) = self.advertiser.try_recv() {
            debug!("Advertiser event: {:?}", event);
            self.controller.apply(&event);
            self.take_controller_toast();
        }
    }

    pub(crate) fn start_broadcast(&mut self) {
        match self.controller.prepare_start(&self.settings.get().advertising) {
            Ok(request) => self.advertiser.send(AdvertiserCommand::Start(request)),
            Err(e) => debug!("Start rejected: {}", e),
        }
        self.take_controller_toast();
    }

    pub(crate) fn stop_broadcast(&mut self) {
        if self.controller.request_stop() {
            self.advertiser.send(AdvertiserCommand::Stop);
        }
    }

    pub(crate) fn select_preset(&mut self, name: &str) {
        let Some(preset) = self.settings.presets().get(name).cloned() else {
            return;
        };
        if !self.controller.load_preset(&preset) {
            return;
        }
        if let Err(e) = self.settings.set_last_preset(Some(preset.name)) {
            error!("Failed to remember preset selection: {}", e);
        }
    }

    /// Save the form under `name`. Returns whether the dialog can close.
    pub(crate) fn save_preset(&mut self, name: &str) -> bool {
        let preset = match self.controller.preset_from_form(name) {
            Ok(preset) => preset,
            Err(_) => {
                self.take_controller_toast();
                return false;
            }
        };

        let saved_name = preset.name.clone();
        match self.settings.save_preset(preset) {
            Ok(_) => {
                info!("Saved preset '{}'", saved_name);
                self.controller.preset_saved(&saved_name);
                self.take_controller_toast();
            }
            Err(e) => {
                error!("Failed to save preset '{}': {}", saved_name, e);
                self.show_toast(StatusMessage::new(
                    format!("Failed to save preset: {}", e),
                    MessageSeverity::Error,
                ));
            }
        }
        true
    }

    pub(crate) fn save_settings(&mut self) {
        let message = match self.settings.save() {
            Ok(()) => StatusMessage::new("Settings saved", MessageSeverity::Success),
            Err(e) => {
                error!("Failed to save settings: {}", e);
                StatusMessage::new(
                    format!("Failed to save settings: {}", e),
                    MessageSeverity::Error,
                )
            }
        };
        self.show_toast(message);
    }

    fn expire_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_DURATION)
        {
            self.toast = None;
        }
    }

    fn ui_save_dialog(&mut self, ctx: &egui::Context) {
        let Some(mut name) = self.save_dialog.take() else {
            return;
        };

        let mut open = true;
        let mut save = false;
        let mut cancel = false;
        egui::Window::new("Save Preset")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Preset name:");
                let response = ui.text_edit_singleline(&mut name);
                response.request_focus();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    save = true;
                }
                ui.horizontal(|ui| {
                    save |= ui.button("Save").clicked();
                    cancel = ui.button("Cancel").clicked();
                });
            });

        if save && self.save_preset(&name) {
            return;
        }
        if open && !cancel {
            self.save_dialog = Some(name);
        }
    }
}

impl eframe::App for BeaconApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.expire_toast();

        // Worker events arrive off the UI thread
        ctx.request_repaint_after(Duration::from_millis(100));

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Broadcast, "Broadcast");
                ui.selectable_value(&mut self.selected_tab, Tab::Settings, "Settings");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode {
                        "☀ Light"
                    } else {
                        "🌙 Dark"
                    };
                    if ui.button(switch_icon).clicked() {
                        self.is_dark_mode = !self.is_dark_mode;
                        theme::apply(ctx, self.is_dark_mode);
                    }
                });
            });
        });

        if let Some((message, _)) = &self.toast {
            let palette = theme::Palette::new(self.is_dark_mode);
            egui::TopBottomPanel::bottom("toast_panel").show(ctx, |ui| {
                crate::presentation::components::Components::toast(ui, message, &palette);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(800.0);
                    ui.add_space(20.0);

                    match self.selected_tab {
                        Tab::Broadcast => tabs::broadcast::render(self, ui),
                        Tab::Settings => tabs::settings::render(self, ui),
                    }

                    ui.add_space(50.0);
                });
            });
        });

        self.ui_save_dialog(ctx);
    }
}
