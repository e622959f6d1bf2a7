// src/monitor.rs

use crate::config::{Cli, Config};
use crate::domain::alert::{render, Alert};
use crate::domain::changes::decide;
use crate::domain::dedup::DedupFilter;
use crate::domain::snapshot::ProductSnapshot;
use crate::errors::{ErrorKind, MonitorError, MonitorResult};
use crate::notifier::{LogNotifier, Notifier, TelegramNotifier};
use crate::scraper::{ProductSource, ShopScraper};
use crate::store::{AlertLog, ProductState, StateStore};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Counters for one pass over the sitemap.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Product pages fetched and parsed.
    pub scanned: usize,
    /// Pages dropped by normalization (zero or missing price).
    pub skipped: usize,
    /// Pages that could not be retrieved.
    pub failed: usize,
    pub emitted: usize,
    pub suppressed: usize,
    pub delivery_failures: usize,
    /// State was empty and alerts were held back.
    pub bootstrap: bool,
}

/// One polling cycle's collaborators and settings.
pub struct Monitor<'a> {
    pub source: &'a dyn ProductSource,
    pub notifier: &'a dyn Notifier,
    pub state_store: &'a StateStore,
    pub alert_log: &'a AlertLog,
    pub currency: &'a str,
    pub dedup_window: Option<usize>,
    pub silent_bootstrap: bool,
}

impl Monitor<'_> {
    /// Runs one full cycle: load state and dedup window, walk the sitemap one
    /// product at a time, then write the state back.
    ///
    /// A sitemap failure aborts the cycle before any state is touched.
    /// Failures on a single product are logged and the cycle moves on.
    pub fn run_cycle(&self) -> MonitorResult<CycleReport> {
        let mut dedup = DedupFilter::new(self.alert_log.recent_alerts(self.dedup_window)?);
        let mut state = self.state_store.load()?;
        debug!(
            "loaded {} product records and {} recent alerts",
            state.len(),
            dedup.len()
        );

        let urls = self.source.product_urls()?;

        let mut report = CycleReport {
            bootstrap: self.silent_bootstrap && state.is_empty(),
            ..CycleReport::default()
        };
        if report.bootstrap {
            info!("🌱 Empty state, recording products without alerts");
        }

        for url in &urls {
            if let Err(e) = self.process_product(url, &mut state, &mut dedup, &mut report) {
                report.failed += 1;
                warn!("⚠️ Skipping {url}: {e}");
                self.log_error(&format!("{e} ({url})"));
            }
        }

        self.state_store.save(&state)?;
        Ok(report)
    }

    fn process_product(
        &self,
        url: &str,
        state: &mut ProductState,
        dedup: &mut DedupFilter,
        report: &mut CycleReport,
    ) -> MonitorResult<()> {
        let raw = self.source.fetch_product(url)?;

        let Some(snapshot) = ProductSnapshot::from_raw(raw) else {
            debug!("no real price on {url}, ignoring");
            report.skipped += 1;
            return Ok(());
        };
        report.scanned += 1;

        let event = decide(state.get(&snapshot.key), &snapshot);
        debug!(product = %snapshot.key, event = event.label(), "diffed");

        if !report.bootstrap {
            if let Some(alert) = render(&event, self.currency) {
                self.emit(&alert, dedup, report);
            }
        }

        // refreshed whether or not an alert went out
        state.insert(snapshot.key.clone(), snapshot.to_record());
        Ok(())
    }

    fn emit(&self, alert: &Alert, dedup: &mut DedupFilter, report: &mut CycleReport) {
        if dedup.is_duplicate(&alert.text) {
            debug!("🔁 Already reported: {}", alert.text);
            report.suppressed += 1;
            return;
        }

        info!("{}", alert.text);

        if let Err(e) = self.notifier.deliver(alert) {
            report.delivery_failures += 1;
            let e = MonitorError::from(e);
            error!("❌ {e}");
            self.log_error(&e.to_string());
        }

        if let Err(e) = self.alert_log.append_alert(&alert.text) {
            error!("❌ Could not record alert: {e}");
        }
        dedup.remember(&alert.text);
        report.emitted += 1;
    }

    fn log_error(&self, message: &str) {
        if let Err(e) = self.alert_log.append_error(message) {
            error!("❌ Could not write to alert log: {e}");
        }
    }
}

/// Outer poll loop. Re-reads the configuration before every cycle and keeps
/// the last good one when that fails. Never returns unless `--once` is set.
pub fn run(cli: &Cli) -> MonitorResult<()> {
    let mut current: Option<Config> = None;

    loop {
        match Config::load(&cli.config) {
            Ok(config) => current = Some(config),
            Err(e) => match &current {
                Some(_) => warn!("⚠️ {e}; keeping previous configuration"),
                None if cli.once => return Err(e),
                None => error!("❌ {e}"),
            },
        }

        let delay = match &current {
            Some(config) => {
                run_configured_cycle(config, cli.dry_run);
                config.poll_interval()
            }
            None => Duration::from_secs(60),
        };

        if cli.once {
            return Ok(());
        }

        info!("⏳ Waiting {}s before next cycle", delay.as_secs());
        std::thread::sleep(delay);
    }
}

fn run_configured_cycle(config: &Config, dry_run: bool) {
    let alert_log = AlertLog::new(&config.alert_log_file);
    let state_store = StateStore::new(&config.state_file);

    let log_failure = |e: &MonitorError| {
        error!("❌ Cycle aborted: {e}");
        if let Err(log_err) = alert_log.append_error(&e.to_string()) {
            error!("❌ Could not write to alert log: {log_err}");
        }
    };

    let scraper = match ShopScraper::new(
        &config.sitemap_url,
        &config.product_path_filter,
        &config.user_agent,
        config.request_timeout(),
    ) {
        Ok(s) => s,
        Err(e) => return log_failure(&MonitorError::from(e)),
    };

    let notifier: Box<dyn Notifier> = match (&config.telegram, dry_run) {
        (Some(tg), false) => match TelegramNotifier::new(tg.bot_token.clone(), tg.chat_id.clone()) {
            Ok(n) => Box::new(n),
            Err(e) => return log_failure(&MonitorError::from(e)),
        },
        _ => Box::new(LogNotifier),
    };

    let monitor = Monitor {
        source: &scraper,
        notifier: notifier.as_ref(),
        state_store: &state_store,
        alert_log: &alert_log,
        currency: &config.currency_symbol,
        dedup_window: config.dedup_window,
        silent_bootstrap: config.silent_bootstrap,
    };

    let start = Instant::now();
    info!("📄 Starting cycle for {}", config.sitemap_url);
    debug!(
        "state file {}, alert log {}",
        state_store.path().display(),
        alert_log.path().display()
    );

    match monitor.run_cycle() {
        Ok(report) => info!(
            scanned = report.scanned,
            skipped = report.skipped,
            failed = report.failed,
            emitted = report.emitted,
            suppressed = report.suppressed,
            delivery_failures = report.delivery_failures,
            "✅ Cycle complete in {:?}",
            start.elapsed()
        ),
        Err(e) if e.kind() == ErrorKind::Retrieval => {
            log_failure(&e);
            info!("🔁 Sitemap unavailable, will retry next cycle");
        }
        Err(e) => log_failure(&e),
    }
}

