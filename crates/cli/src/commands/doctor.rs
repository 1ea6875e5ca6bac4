//! `postgate doctor`: Diagnose configuration and settings.

use postgate_config::{AppConfig, FileSettingsStore};
use postgate_core::ProviderFactory;
use postgate_providers::OpenAiFactory;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 PostGate Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, using defaults (run `postgate onboard`)");
    }
    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid (model: {})", config.provider.model);
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    let store = FileSettingsStore::new(config.settings_file());
    let settings = match store.read().await {
        Ok(settings) => settings,
        Err(e) => {
            println!("  ❌ Settings unreadable: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

    if present(&settings.system_prompt) {
        println!("  ✅ Instruction prompt set");
    } else {
        println!("  ⚠️  No instruction prompt, drafts will not be checked");
        issues += 1;
    }

    match settings.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            println!("  ✅ API key set");
            let factory = OpenAiFactory::from_config(&config.provider);
            match factory.create(key)?.health_check().await {
                Ok(true) => println!("  ✅ {} reachable", config.provider.base_url),
                Ok(false) => {
                    println!("  ❌ {} rejected the API key", config.provider.base_url);
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ {} unreachable: {e}", config.provider.base_url);
                    issues += 1;
                }
            }
        }
        None => {
            println!("  ⚠️  No API key, drafts will not be checked");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
