//! Check command implementation.
//!
//! Probes every metrics source and the configured document files once and
//! reports what the dashboard would serve.

use hostboard::{MetricsCollector, ModelResolver, Source, SystemProbe};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{validate_effective_config, Config};

/// Validates configuration and reports source availability.
///
/// Unavailable sources are reported but do not fail the check: the
/// dashboard degrades those fields at runtime.
pub async fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Hostboard - System Check");
    println!("===========================");

    let mut all_ok = true;

    let probe = SystemProbe::new(config.thermal_path(), config.loadavg_path());
    let collector = MetricsCollector::new(
        Arc::new(probe),
        Duration::from_millis(config.query_timeout_ms()),
    );
    println!(
        "\n📊 Checking metrics sources ({:?} timeout each)...",
        collector.query_timeout()
    );

    let mut degraded = 0;
    for source in Source::ALL {
        match collector.probe(source).await {
            Ok(value) => println!("   ✅ {:16} {}", source.name(), value),
            Err(e) => {
                degraded += 1;
                println!("   ⚠️  {:16} unavailable: {}", source.name(), e);
            }
        }
    }

    println!("\n📁 Checking document files...");
    report_file("html_path", config.html_path(), true, &mut all_ok);
    report_file("memory_path", config.memory_path(), false, &mut all_ok);
    report_file("activities_path", config.activities_path(), false, &mut all_ok);
    report_file("status_path", config.status_path(), false, &mut all_ok);

    let model = ModelResolver::new(config.model_env(), config.status_path())
        .resolve()
        .await;
    println!("   ℹ️  resolved model: {}", model);

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if degraded > 0 {
        println!("   ⚠️  {} of {} metrics sources will be degraded", degraded, Source::ALL.len());
    }
    if all_ok {
        println!("   ✅ All checks passed - dashboard is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}

fn report_file(name: &str, path: &Path, required: bool, all_ok: &mut bool) {
    if path.is_file() {
        println!("   ✅ {:16} {}", name, path.display());
    } else if required {
        println!("   ❌ {:16} {} not found", name, path.display());
        *all_ok = false;
    } else {
        println!("   ⚠️  {:16} {} not found (fallback in use)", name, path.display());
    }
}
