//! `postgate configure`: Save the instruction prompt and API key.

use postgate_config::{AppConfig, FileSettingsStore, Settings, SettingsStore};

pub async fn run(prompt: String, api_key: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = FileSettingsStore::new(config.settings_file());

    let settings = Settings {
        system_prompt: Some(prompt),
        api_key: Some(api_key),
    };

    match store.save(settings).await {
        Ok(()) => {
            println!("Settings saved successfully!");
            println!("  Stored in: {}", store.path().display());
            Ok(())
        }
        Err(e) => {
            eprintln!("  {e}");
            Err(e.into())
        }
    }
}
