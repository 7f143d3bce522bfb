use anyhow::Context;
use docket_browser::{BrowserEngine, PageSource, PortalSession};
use docket_core::{AppConfig, CaseQuery, CauseListSelection, Timestamp};
use docket_pipeline::{
    AcquisitionError, CaseAcquisition, ConsolePrompt, ListingDateMatcher, UserPrompt,
};
use docket_report::ReportRenderer;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::args::{Cli, DateCheck, Mode};
use crate::output;

/// Resolve configuration: explicit file or user config, then env, then flags.
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load_with_env().context("failed to load config")?,
    };

    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.download_dir.clone_from(dir);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    if cli.save_config {
        config.save().context("failed to save config")?;
        println!("✓ Configuration saved to {}", AppConfig::config_path()?.display());
        return Ok(());
    }

    let mode = cli.mode()?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling");
                cancel.cancel();
            }
        }
    });

    let engine = BrowserEngine::launch(&config.browser)
        .await
        .context("failed to launch browser")?;
    let session = PortalSession::new(engine, config.portal.clone());
    let prompt = ConsolePrompt;

    let outcome = execute(&session, &prompt, &config, &mode, cancel.clone()).await;

    if cli.keep_open && !cancel.is_cancelled() {
        if let Err(e) = prompt.confirm("\nPress Enter to close browser...").await {
            warn!("could not wait for Enter: {}", e);
        }
    }
    if let Err(e) = session.into_inner().close().await {
        warn!("failed to close browser: {}", e);
    }

    outcome
}

async fn execute(
    source: &dyn PageSource,
    prompt: &dyn UserPrompt,
    config: &AppConfig,
    mode: &Mode,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let acquisition = CaseAcquisition::new(source, prompt, config)?.with_cancellation(cancel);
    let renderer = ReportRenderer::new(&config.output.download_dir);

    match mode {
        Mode::Case { query, check } => {
            fetch_case(&acquisition, &renderer, config, query, *check).await
        }
        Mode::CauseList { selection } => {
            capture_cause_list(&acquisition, &renderer, config, selection.as_ref()).await
        }
    }
}

async fn fetch_case(
    acquisition: &CaseAcquisition<'_>,
    renderer: &ReportRenderer,
    config: &AppConfig,
    query: &CaseQuery,
    check: Option<DateCheck>,
) -> anyhow::Result<()> {
    let record = match acquisition.fetch_case(query).await {
        Ok(record) => record,
        Err(e) => return Err(stage_failure("failed to fetch case details", &e)),
    };

    output::print_case(&record);

    if let Some(check) = check {
        let date = check.date(Timestamp::now().local_date());
        let listed = ListingDateMatcher::is_listed_on(&record, date);
        output::print_listing_check(&record, check, date, listed);
    }

    let document = ReportRenderer::render_case_report(&record);
    let pdf = renderer.publish(&document);
    output::print_pdf_status(pdf.as_deref());

    let path = output::case_json_path(&config.output.download_dir, &record);
    output::save(&record, &path).context("failed to save case record")?;
    Ok(())
}

async fn capture_cause_list(
    acquisition: &CaseAcquisition<'_>,
    renderer: &ReportRenderer,
    config: &AppConfig,
    selection: Option<&CauseListSelection>,
) -> anyhow::Result<()> {
    if selection.is_none() {
        println!("\nCAUSE LIST - MANUAL MODE");
    }

    let snapshot = match acquisition.capture_cause_list(selection).await {
        Ok(snapshot) => snapshot,
        Err(e) => return Err(stage_failure("failed to capture cause list", &e)),
    };
    info!("cause list captured from {}", snapshot.url.as_deref().unwrap_or("unknown URL"));

    let document = ReportRenderer::render_cause_list_snapshot(&snapshot);
    let pdf = renderer.publish(&document);
    output::print_pdf_status(pdf.as_deref());

    let result = output::CauseListResult::new(&snapshot, pdf.as_deref());
    let path = config.output.download_dir.join("cause_list_result.json");
    output::save(&result, &path).context("failed to save cause list result")?;
    Ok(())
}

fn stage_failure(what: &str, e: &AcquisitionError) -> anyhow::Error {
    if matches!(e, AcquisitionError::Cancelled) {
        return anyhow::anyhow!("{what}: cancelled");
    }
    anyhow::anyhow!("{what} during {}: {e}", e.stage())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failure_names_stage() {
        let e = AcquisitionError::ContentNotReady { polls: 5 };
        assert_eq!(
            stage_failure("failed to fetch case details", &e).to_string(),
            "failed to fetch case details during readiness: results did not load after 5 polls"
        );
    }

    #[test]
    fn test_stage_failure_cancelled() {
        let e = AcquisitionError::Cancelled;
        assert_eq!(
            stage_failure("failed to capture cause list", &e).to_string(),
            "failed to capture cause list: cancelled"
        );
    }
}
