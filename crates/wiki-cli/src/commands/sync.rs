//! The sync command
//!
//! Loads the configuration, snapshots both spaces, reconciles them and
//! reports the outcome through the optional webhook.

use std::path::Path;

use colored::Colorize;

use wiki_core::{Config, DestinationSpace, Reconciler, SourceSpace, SyncActionKind, SyncReport};
use wiki_remote::{
    ConfluenceClient, DestinationService, HttpImageFetcher, ImageFetcher, Notifier, SourceService,
    WebhookNotifier, YuqueClient,
};

use crate::error::Result;

/// Run a full synchronization with the HTTP clients described by the config
pub fn run_sync(config_path: Option<&Path>, notify: bool, json: bool) -> Result<()> {
    let path = Config::resolve_path(config_path)?;
    let config = Config::load(&path)?;

    let source = YuqueClient::new(
        &config.source.domain,
        &config.source.user_id,
        &config.source.auth,
    );
    let destination = ConfluenceClient::new(
        &config.destination.domain,
        &config.destination.space,
        &config.destination.auth,
    );
    let images = HttpImageFetcher::new();
    let notifier = config
        .notification
        .url
        .as_deref()
        .filter(|_| notify)
        .map(WebhookNotifier::new);

    if !json {
        println!(
            "{} Synchronizing into space {}...",
            "=>".blue().bold(),
            config.destination.space.cyan()
        );
    }

    let report = synchronize_and_notify(&config, &source, &destination, &images, notifier.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Synchronize and fire `notifier` exactly once with the outcome
pub fn synchronize_and_notify<S, D, I, N>(
    config: &Config,
    source: &S,
    destination: &D,
    images: &I,
    notifier: Option<&N>,
) -> Result<SyncReport>
where
    S: SourceService,
    D: DestinationService,
    I: ImageFetcher,
    N: Notifier,
{
    let outcome = synchronize(config, source, destination, images);

    if let Some(notifier) = notifier {
        match &outcome {
            Ok(_) => notifier.notify(None),
            Err(e) => notifier.notify(Some(e)),
        }
    }

    Ok(outcome?)
}

fn synchronize<S, D, I>(
    config: &Config,
    source: &S,
    destination: &D,
    images: &I,
) -> wiki_core::Result<SyncReport>
where
    S: SourceService,
    D: DestinationService,
    I: ImageFetcher,
{
    let source_space = SourceSpace::load(source, &config.source_filter())?;
    let mut destination_space =
        DestinationSpace::load(destination, config.destination.root_page_id.as_deref())?;

    Reconciler::new(source, destination, images).synchronize(&source_space, &mut destination_space)
}

fn print_report(report: &SyncReport) {
    for action in &report.actions {
        let marker = match action.kind {
            SyncActionKind::Created => "+".green(),
            SyncActionKind::Updated => "~".yellow(),
            SyncActionKind::Deprecated => "!".red(),
            SyncActionKind::Deleted => "-".red(),
            SyncActionKind::Unchanged => continue,
        };
        println!(
            "   {} {} {}",
            marker,
            action.title.cyan(),
            format!("({})", action.kind).dimmed()
        );
    }

    if report.is_noop() {
        println!("{} Space is up to date. {}", "OK".green().bold(), report);
    } else {
        println!("{} {}", "OK".green().bold(), report);
    }
}
