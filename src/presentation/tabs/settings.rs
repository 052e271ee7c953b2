use crate::domain::models::MAX_ADVERTISE_TIMEOUT;
use crate::presentation::app::BeaconApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut BeaconApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Settings");
    ui.add_space(20.0);

    let is_advertising = app.controller.is_advertising();
    let settings_path = app.settings.path().display().to_string();
    let settings_mut = app.settings.get_mut();

    Components::card(ui, "Advanced Advertising", |ui| {
        ui.add_enabled_ui(!is_advertising, |ui| {
            ui.checkbox(
                &mut settings_mut.advertising.connectable,
                "Connectable advertisement",
            );
            ui.checkbox(
                &mut settings_mut.advertising.include_device_name,
                "Include device name",
            );
            ui.horizontal(|ui| {
                ui.label("Stop after (s, 0 = never):");
                ui.add(egui::Slider::new(
                    &mut settings_mut.advertising.timeout_secs,
                    0..=MAX_ADVERTISE_TIMEOUT.as_secs() as u32,
                ));
            });

            ui.separator();
            Components::sub_heading(ui, "iBeacon");

            let ibeacon = &mut settings_mut.advertising.ibeacon;
            ui.checkbox(&mut ibeacon.enabled, "Broadcast as iBeacon");
            if ibeacon.enabled {
                ui.indent("ibeacon_indent", |ui| {
                    egui::Grid::new("ibeacon_grid")
                        .spacing([10.0, 10.0])
                        .show(ui, |ui| {
                            ui.label("Major:");
                            ui.add(egui::DragValue::new(&mut ibeacon.major));
                            ui.end_row();
                            ui.label("Minor:");
                            ui.add(egui::DragValue::new(&mut ibeacon.minor));
                            ui.end_row();
                            ui.label("Measured power (dBm @ 1 m):");
                            ui.add(egui::DragValue::new(&mut ibeacon.measured_power).range(-100..=0));
                            ui.end_row();
                        });
                });
                ui.label(
                    egui::RichText::new("The iBeacon frame replaces the service UUID list.")
                        .italics()
                        .size(12.0),
                );
            }
        });
        if is_advertising {
            ui.label(
                egui::RichText::new("Stop broadcasting to change these options.")
                    .italics()
                    .size(12.0),
            );
        }
    });

    ui.add_space(10.0);

    Components::card(ui, "Logging & Debug", |ui| {
        ui.horizontal(|ui| {
            ui.label("Verbosity Level:");
            egui::ComboBox::from_id_salt("log_level")
                .selected_text(&settings_mut.log_settings.level)
                .show_ui(ui, |ui| {
                    for level in &["trace", "debug", "info", "warn", "error"] {
                        ui.selectable_value(
                            &mut settings_mut.log_settings.level,
                            level.to_string(),
                            *level,
                        );
                    }
                });
        });

        ui.checkbox(
            &mut settings_mut.log_settings.console_logging_enabled,
            "Console Logs",
        );
        ui.checkbox(
            &mut settings_mut.log_settings.file_logging_enabled,
            "File Logs",
        );

        if settings_mut.log_settings.file_logging_enabled {
            ui.indent("file_logs", |ui| {
                ui.horizontal(|ui| {
                    ui.label("Save Path:");
                    ui.text_edit_singleline(&mut settings_mut.log_settings.log_dir);
                });
                ui.horizontal(|ui| {
                    ui.label("Rotation:");
                    egui::ComboBox::from_id_salt("log_rot")
                        .selected_text(&settings_mut.log_settings.rotation)
                        .show_ui(ui, |ui| {
                            for rot in &["daily", "hourly", "never"] {
                                ui.selectable_value(
                                    &mut settings_mut.log_settings.rotation,
                                    rot.to_string(),
                                    *rot,
                                );
                            }
                        });
                });
            });
        }
        ui.label(
            egui::RichText::new("Restart required for log changes.")
                .italics()
                .size(12.0),
        );
    });

    ui.add_space(10.0);

    ui.horizontal(|ui| {
        if ui.button("Save Settings").clicked() {
            app.save_settings();
        }
        ui.label(egui::RichText::new(settings_path).size(12.0));
    });
}
