mod bootstrap;
mod render;
mod report;

use anyhow::{Context, Result};
use viewing_core::settings::Settings;
use viewing_data::analysis::analyze_export;

use crate::report::{build_report, View};

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Viewing History v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Timezone: {}, Format: {}",
        settings.view,
        settings.timezone,
        settings.format
    );

    let config = settings.pipeline_config()?;
    let view: View = settings.view.parse()?;

    let export = settings
        .export
        .clone()
        .or_else(bootstrap::discover_export_path)
        .context(
            "No export given and none found; pass the path to ViewingActivity.csv \
             or to the unpacked export directory",
        )?;

    let analysis = analyze_export(&export, &config)
        .with_context(|| format!("Failed to analyze {}", export.display()))?;

    let report = build_report(
        view,
        &analysis,
        settings.profile.as_deref(),
        settings.top,
        &config,
    )?;

    let output = match settings.format.as_str() {
        "json" => render::render_json(&report)?,
        _ => render::render_table(&report),
    };
    print!("{output}");

    Ok(())
}
