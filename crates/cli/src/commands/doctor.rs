//! `carebot doctor`: diagnose configuration, catalog and backend.

use super::load_knowledge;
use carebot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 CareBot Doctor: System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file, using defaults (run `carebot onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            if config.has_api_key() {
                println!("  ✅ API key configured");
            } else {
                println!("  ⚠️  No API key configured (set GEMINI_API_KEY or api_key in config.toml)");
            }
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running other checks.");
            return Ok(());
        }
    };

    match load_knowledge(&config) {
        Ok(kb) => {
            println!(
                "  ✅ Knowledge catalog: {} facilities, {} doctors",
                kb.facilities().len(),
                kb.doctor_count()
            );
            let facility = &config.chatbot.recommendation_facility;
            if !config.chatbot.enable_recommendations {
                println!("  ✅ Recommendations disabled");
            } else if kb.facility(facility).is_some() {
                println!("  ✅ Recommendation facility '{facility}' found");
            } else {
                println!("  ❌ Recommendation facility '{facility}' is not in the catalog");
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Knowledge catalog invalid: {e}");
            issues += 1;
        }
    }

    match carebot_providers::build_from_config(&config) {
        Ok(provider) => {
            println!("  ✅ Provider '{}' configured (model {})", provider.name(), config.model);
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable"),
                Ok(false) => {
                    println!("  ⚠️  Provider responded but rejected the health check");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider unreachable: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ {e}");
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
