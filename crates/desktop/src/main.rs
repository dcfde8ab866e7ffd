//! Desktop form for certificate generation using Tauri.

#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

mod commands;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(commands::FormState::default())
        .invoke_handler(tauri::generate_handler![
            commands::pick_template,
            commands::pick_data_source,
            commands::pick_output_dir,
            commands::generate_certificates,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
