mod bootstrap;
mod report;

use anyhow::{Context, Result};
use lens_core::formatting::to_csv;
use lens_core::settings::Settings;
use lens_data::analysis::ReportOptions;
use lens_runtime::loader::PayloadPaths;
use lens_runtime::session::LensSession;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("SalaryLens v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Inflation: {}, FX: {}, source: {:?}",
        settings.inflation.display(),
        settings.fx.display(),
        settings.source
    );

    let base_salary = settings.base_salary()?;

    let paths = PayloadPaths::new(&settings.inflation, &settings.fx);
    let session = LensSession::load(&paths, settings.source).await?;

    let alignment = session.alignment();
    if let Some(warning) = &alignment.warning {
        eprintln!("warning: {}", warning);
    }
    if alignment.dataset.is_empty() {
        return Ok(());
    }

    let options = ReportOptions {
        base_salary,
        start_month: settings.start_month,
        what_if_month: settings.what_if_month,
        what_if_pct: settings.what_if_pct,
    };
    let result = session.report(&options)?;

    if let Err(e) = settings.save_last_used() {
        tracing::warn!("Failed to persist last-used parameters: {}", e);
    }

    println!("{}", report::render_summary(&result, session.active_source()));
    print!("{}", report::render_table(&result.rows));

    if let Some(path) = &settings.export {
        let csv = to_csv(&result.rows)?;
        std::fs::write(path, csv)
            .with_context(|| format!("writing CSV export to {}", path.display()))?;
        tracing::info!("Exported {} rows to {}", result.rows.len(), path.display());
    }

    Ok(())
}
