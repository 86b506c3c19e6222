//! Sequential batch runner: skip-if-complete, resolve, fetch or synthesize, record.

use super::metadata::{AssetRecord, RecordSource, SidecarSet};
use super::outcome::{BatchSummary, EntryOutcome, EntryPhase};
use super::pacing::DelayRange;
use super::progress::ProgressSnapshot;
use crate::catalog::{AssetCatalogEntry, Catalog};
use crate::config::{AssetFetchConfig, PacingConfig};
use crate::control::RunControl;
use crate::fetcher::{FetchState, RangeAwareFetcher};
use crate::media::MediaKind;
use crate::placeholder::PlaceholderSynthesizer;
use crate::resolver::{ResolvedSource, SourceResolver};
use crate::retry::{FailureClass, RetryPolicy};
use crate::storage;
use std::time::Instant;

/// Receives run events inline on the runner's thread. All methods default to no-ops.
pub trait BatchObserver {
    fn on_phase(&mut self, _entry: &AssetCatalogEntry, _phase: EntryPhase) {}

    fn on_transfer_progress(&mut self, _entry: &AssetCatalogEntry, _state: &FetchState) {}

    fn on_entry_settled(
        &mut self,
        _entry: &AssetCatalogEntry,
        _outcome: &EntryOutcome,
        _progress: &ProgressSnapshot,
    ) {
    }
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// What processing one entry produced.
struct Settled {
    outcome: EntryOutcome,
    record: Option<AssetRecord>,
    /// The resolver or the network was consulted (pacing applies afterwards).
    used_network: bool,
}

pub struct BatchRunner<R> {
    resolver: R,
    fetcher: RangeAwareFetcher,
    synthesizer: PlaceholderSynthesizer,
    policy: RetryPolicy,
    pacing: PacingConfig,
    tolerance: f64,
    merge_metadata: bool,
    control: RunControl,
}

impl<R: SourceResolver> BatchRunner<R> {
    pub fn new(resolver: R, cfg: &AssetFetchConfig) -> Self {
        Self {
            resolver,
            fetcher: RangeAwareFetcher::from_config(cfg),
            synthesizer: PlaceholderSynthesizer::from_config(cfg.placeholder()),
            policy: cfg.retry_policy(),
            pacing: cfg.pacing(),
            tolerance: cfg.tolerance(),
            merge_metadata: cfg.merge_metadata,
            control: RunControl::new(),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: PlaceholderSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// Handle for stopping the run from another thread.
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    /// Process every entry in order. Never aborts early on an entry failure;
    /// a stop request ends the run at the next entry boundary.
    pub fn run(&self, catalog: &Catalog, observer: &mut dyn BatchObserver) -> BatchSummary {
        let started = Instant::now();
        let total = catalog.len();
        let mut summary = BatchSummary::new(total);
        let mut sidecars = SidecarSet::new(self.merge_metadata);

        tracing::info!(total, "batch started");

        let mut previous: Option<(&AssetCatalogEntry, bool)> = None;
        for (index, entry) in catalog.iter().enumerate() {
            if self.control.check().is_err() {
                summary.not_attempted = total - index;
                tracing::info!(not_attempted = summary.not_attempted, "stop requested; ending run");
                break;
            }

            if let Some((prev, true)) = previous {
                let slept = pause_between(&self.pacing, prev, entry).pause();
                tracing::trace!(slept_ms = slept.as_millis() as u64, "pacing");
            }

            observer.on_phase(entry, EntryPhase::Pending);
            let settled = self.process(entry, observer);

            if let Some(record) = settled.record {
                if let Some(dir) = entry.destination_path.parent() {
                    if let Err(e) = sidecars.append(dir, record) {
                        summary.sidecar_failures += 1;
                        tracing::error!(error = %e, "could not write sidecar");
                    }
                }
            }

            observer.on_phase(entry, settled.outcome.phase());
            summary.record(entry.destination_path.clone(), settled.outcome.clone());
            let snapshot = ProgressSnapshot::new(summary.settled(), total, started.elapsed());
            tracing::info!(
                destination = %entry.destination_path.display(),
                outcome = %settled.outcome,
                progress = %snapshot,
                "entry settled"
            );
            observer.on_entry_settled(entry, &settled.outcome, &snapshot);
            previous = Some((entry, settled.used_network));
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            fetched = summary.fetched,
            placeholder = summary.placeholder,
            failed = summary.failed,
            already_present = summary.already_present,
            not_attempted = summary.not_attempted,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "batch finished"
        );
        summary
    }

    fn process(&self, entry: &AssetCatalogEntry, observer: &mut dyn BatchObserver) -> Settled {
        let dest = &entry.destination_path;

        match storage::existing_len(dest) {
            Ok(len) if storage::is_complete(len, entry.expected_bytes, self.tolerance) => {
                return Settled {
                    outcome: EntryOutcome::AlreadyPresent { bytes: len },
                    record: None,
                    used_network: false,
                };
            }
            Ok(_) => {}
            Err(e) => return local_failure(e.to_string(), false),
        }

        observer.on_phase(entry, EntryPhase::Resolving);
        let source = match &entry.source_url {
            Some(url) => Some(ResolvedSource::new(url.clone())),
            None => self.resolver.resolve(&entry.keyword, entry.media_kind),
        };
        let Some(source) = source else {
            tracing::info!(
                destination = %dest.display(),
                keyword = %entry.keyword,
                "no source found; synthesizing placeholder"
            );
            return self.placeholder(entry, FailureClass::ResolutionEmpty, observer);
        };

        observer.on_phase(entry, EntryPhase::Fetching);
        let staging = storage::part_path(dest);
        let mut state = FetchState::new();
        state.bytes_expected = entry.expected_bytes;
        let result = self.fetcher.fetch_with_retry(
            &self.policy,
            &source.url,
            &staging,
            entry.media_kind,
            &mut state,
            &mut |s| observer.on_transfer_progress(entry, s),
        );

        match result {
            Ok(fetched) => {
                if let Err(e) = storage::finalize(&staging, dest) {
                    return local_failure(format!("rename {}: {e}", staging.display()), true);
                }
                let record = AssetRecord::for_entry(
                    entry,
                    RecordSource::Fetched {
                        url: &source.url,
                        license: source.license.as_deref(),
                    },
                    fetched.bytes_on_disk,
                    source.dimensions,
                );
                Settled {
                    outcome: EntryOutcome::Fetched {
                        bytes: fetched.bytes_on_disk,
                        resumed_from: fetched.resumed_from,
                    },
                    record: Some(record),
                    used_network: true,
                }
            }
            Err(e) if e.class() == FailureClass::LocalIo => local_failure(e.to_string(), true),
            Err(e) => {
                tracing::warn!(
                    destination = %dest.display(),
                    url = %source.url,
                    attempts = state.attempt,
                    error = %e,
                    "fetch failed; synthesizing placeholder"
                );
                let mut settled = self.placeholder(entry, e.class(), observer);
                settled.used_network = true;
                settled
            }
        }
    }

    fn placeholder(
        &self,
        entry: &AssetCatalogEntry,
        cause: FailureClass,
        observer: &mut dyn BatchObserver,
    ) -> Settled {
        observer.on_phase(entry, EntryPhase::Placeholder);
        // The resolver is consulted for every entry without a static URL.
        let used_network = entry.source_url.is_none();
        match self
            .synthesizer
            .synthesize(&entry.destination_path, entry.media_kind, &entry.display_title())
        {
            Ok(made) => Settled {
                outcome: EntryOutcome::Placeholder {
                    cause,
                    degraded: made.degraded,
                },
                record: Some(AssetRecord::for_entry(
                    entry,
                    RecordSource::Placeholder,
                    made.bytes,
                    made.dimensions,
                )),
                used_network,
            },
            Err(e) => local_failure(e.to_string(), used_network),
        }
    }
}

/// A section change wins; otherwise the pause follows the previous entry's kind.
fn pause_between(
    pacing: &PacingConfig,
    prev: &AssetCatalogEntry,
    next: &AssetCatalogEntry,
) -> DelayRange {
    if prev.section_key() != next.section_key() {
        pacing.section_delay()
    } else if prev.media_kind == MediaKind::Video {
        pacing.video_delay()
    } else {
        pacing.entry_delay()
    }
}

fn local_failure(reason: String, used_network: bool) -> Settled {
    tracing::error!(%reason, "entry failed");
    Settled {
        outcome: EntryOutcome::Failed {
            class: FailureClass::LocalIo,
            reason,
        },
        record: None,
        used_network,
    }
}
