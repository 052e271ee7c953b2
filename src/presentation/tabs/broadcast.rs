use crate::domain::models::{AdvertiseMode, TxPowerLevel};
use crate::presentation::app::BeaconApp;
use crate::presentation::components::Components;
use crate::presentation::theme::Palette;
use eframe::egui;

pub fn render(app: &mut BeaconApp, ui: &mut egui::Ui) {
    Components::heading(ui, "BLE Beacon Broadcaster");
    ui.add_space(20.0);

    ui_status_panel(app, ui);
    ui.add_space(15.0);

    ui_beacon_panel(app, ui);
    ui.add_space(15.0);

    ui_actions_panel(app, ui);
}

fn ui_status_panel(app: &mut BeaconApp, ui: &mut egui::Ui) {
    let palette = Palette::new(app.is_dark_mode);
    let blocked = app
        .controller
        .readiness()
        .is_some_and(|readiness| readiness.is_blocking());

    let (bg_color, text_color) = if app.controller.is_advertising() {
        (palette.active, egui::Color32::BLACK)
    } else if blocked {
        (palette.danger, egui::Color32::WHITE)
    } else {
        (palette.idle, egui::Color32::WHITE)
    };

    Components::card(ui, "Status", |ui| {
        Components::status_banner(ui, app.controller.status_text(), bg_color, text_color);
    });
}

fn ui_beacon_panel(app: &mut BeaconApp, ui: &mut egui::Ui) {
    let controls = app.controller.controls();
    let mut picked_preset = None;

    Components::card(ui, "Beacon", |ui| {
        ui.add_enabled_ui(controls.inputs_enabled, |ui| {
            ui.horizontal(|ui| {
                ui.label("Preset:");
                let selected = app
                    .controller
                    .selected_preset()
                    .unwrap_or("Select a preset")
                    .to_string();
                egui::ComboBox::from_id_salt("preset_picker")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for name in app.settings.presets().names() {
                            let is_selected = app.controller.selected_preset() == Some(name);
                            if ui.selectable_label(is_selected, name).clicked() {
                                picked_preset = Some(name.to_string());
                            }
                        }
                    });
            });

            ui.horizontal(|ui| {
                ui.label("Service UUID:");
                ui.add(
                    egui::TextEdit::singleline(&mut app.controller.form.uuid_input)
                        .font(egui::TextStyle::Monospace)
                        .desired_width(340.0),
                );
            });

            ui.separator();
            Components::sub_heading(ui, "Transmit Power");
            ui.horizontal_wrapped(|ui| {
                for level in TxPowerLevel::ALL {
                    ui.radio_value(&mut app.controller.form.tx_power, level, level.to_string());
                }
            });

            Components::sub_heading(ui, "Advertise Mode");
            ui.horizontal_wrapped(|ui| {
                for mode in AdvertiseMode::ALL {
                    ui.radio_value(&mut app.controller.form.mode, mode, mode.to_string());
                }
            });
        });
    });

    if let Some(name) = picked_preset {
        app.select_preset(&name);
    }
}

fn ui_actions_panel(app: &mut BeaconApp, ui: &mut egui::Ui) {
    let controls = app.controller.controls();

    Components::card(ui, "Broadcast", |ui| {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(controls.start_enabled, egui::Button::new("Start Broadcasting"))
                .clicked()
            {
                app.start_broadcast();
            }
            if ui
                .add_enabled(controls.stop_enabled, egui::Button::new("Stop Broadcasting"))
                .clicked()
            {
                app.stop_broadcast();
            }
            if ui
                .add_enabled(
                    controls.save_enabled && app.save_dialog.is_none(),
                    egui::Button::new("Save Preset"),
                )
                .clicked()
            {
                app.save_dialog = Some(
                    app.controller
                        .selected_preset()
                        .unwrap_or_default()
                        .to_string(),
                );
            }
        });

        let advanced = &app.settings.get().advertising;
        if advanced.ibeacon.enabled || advanced.timeout().is_some() || advanced.connectable {
            ui.add_space(4.0);
            let mut notes = Vec::new();
            if advanced.ibeacon.enabled {
                notes.push(format!(
                    "iBeacon {}/{}",
                    advanced.ibeacon.major, advanced.ibeacon.minor
                ));
            }
            if let Some(timeout) = advanced.timeout() {
                notes.push(format!("stops after {}s", timeout.as_secs()));
            }
            if advanced.connectable {
                notes.push("connectable".to_string());
            }
            ui.label(egui::RichText::new(notes.join(" · ")).italics().size(12.0));
        }
    });
}
