//! Drives a catalog source through every enabled destination.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use feedgen_core::{CatalogSource, DestinationConfig, FeedConfig};
use feedgen_mapping::filters::product_drop_reason;
use feedgen_mapping::{map_product, mapper_for, MapperContext};
use feedgen_writer::{ChannelInfo, FeedFormat, StreamWriter};

use crate::backup::backup_previous;
use crate::error::PipelineError;
use crate::metrics::{merge_metrics, DestinationMetrics};

const PROGRESS_EVERY: u64 = 100;

/// Result of one run over the selected destinations.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// In configuration order.
    pub destinations: Vec<DestinationMetrics>,
}

impl RunReport {
    /// `true` only when every destination succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.destinations.iter().all(|m| m.success)
    }

    /// Names of the destinations that failed, in run order.
    #[must_use]
    pub fn failed_destinations(&self) -> Vec<&str> {
        self.destinations
            .iter()
            .filter(|m| !m.success)
            .map(|m| m.destination.as_str())
            .collect()
    }
}

#[derive(Debug, Default)]
struct Counters {
    products: u64,
    items: u64,
    skipped: u64,
    bytes: u64,
}

/// Generates feed files from a [`CatalogSource`].
///
/// Destinations run one after another, each with its own full pass over
/// the source. A destination that fails leaves its published file as it
/// was and does not stop the others.
pub struct Orchestrator {
    config: Arc<FeedConfig>,
    base_url: String,
    output_dir: PathBuf,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        config: Arc<FeedConfig>,
        base_url: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            base_url: base_url.into(),
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn feed_path(&self, destination: &DestinationConfig) -> PathBuf {
        self.output_dir.join(&destination.feed_filename)
    }

    #[must_use]
    pub fn metrics_path(&self) -> PathBuf {
        self.output_dir.join(&self.config.settings.metrics_filename)
    }

    /// The destinations a run will generate: every enabled one when
    /// `filter` is empty, otherwise the named ones in configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownDestination`] or
    /// [`PipelineError::DisabledDestination`] for a bad name, and
    /// [`PipelineError::NoDestinations`] when nothing is left to run.
    pub fn select_destinations(
        &self,
        filter: &[String],
    ) -> Result<Vec<&DestinationConfig>, PipelineError> {
        for name in filter {
            match self.config.destination(name) {
                None => return Err(PipelineError::UnknownDestination(name.clone())),
                Some(d) if !d.enabled => {
                    return Err(PipelineError::DisabledDestination(name.clone()))
                }
                Some(_) => {}
            }
        }

        let selected: Vec<&DestinationConfig> = self
            .config
            .enabled_destinations()
            .filter(|d| filter.is_empty() || filter.contains(&d.name))
            .collect();
        if selected.is_empty() {
            return Err(PipelineError::NoDestinations);
        }
        Ok(selected)
    }

    /// Generates the selected destinations and records their metrics.
    ///
    /// Per-destination failures are reported in the returned metrics, not
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination filter is invalid or the
    /// metrics file cannot be written.
    pub async fn run<S: CatalogSource>(
        &self,
        source: &mut S,
        filter: &[String],
    ) -> Result<RunReport, PipelineError> {
        let destinations = self.select_destinations(filter)?;
        std::fs::create_dir_all(&self.output_dir).map_err(|e| PipelineError::OutputDir {
            path: self.output_dir.display().to_string(),
            source: e,
        })?;

        match source.count().await {
            Ok(Some(total)) => tracing::info!(total, source = source.data_source(), "catalog size"),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not count catalog products"),
        }

        let mut report = RunReport {
            destinations: Vec::with_capacity(destinations.len()),
        };
        for destination in destinations {
            let metrics = self.run_destination(source, destination).await;
            report.destinations.push(metrics);
        }

        if self.config.settings.collect_metrics {
            merge_metrics(&self.metrics_path(), report.destinations.iter().cloned())?;
        }

        tracing::info!(
            destinations = report.destinations.len(),
            success = report.success(),
            "feed run finished"
        );
        Ok(report)
    }

    /// Generates one destination. Never fails; the outcome is in the
    /// returned metrics.
    pub async fn run_destination<S: CatalogSource>(
        &self,
        source: &mut S,
        destination: &DestinationConfig,
    ) -> DestinationMetrics {
        let started = Instant::now();
        let generated_at = Utc::now();
        tracing::info!(destination = %destination.name, kind = %destination.kind, "generating feed");

        let mut counters = Counters::default();
        let result = self
            .generate(source, destination, generated_at, &mut counters)
            .await;
        let duration_seconds = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;

        let error = match result {
            Ok(()) => {
                tracing::info!(
                    destination = %destination.name,
                    products = counters.products,
                    items = counters.items,
                    skipped = counters.skipped,
                    bytes = counters.bytes,
                    duration_seconds,
                    "feed generated"
                );
                None
            }
            Err(e) => {
                tracing::error!(
                    destination = %destination.name,
                    error = %e,
                    "feed generation failed; previous feed left in place"
                );
                counters.bytes = 0;
                Some(e.to_string())
            }
        };

        DestinationMetrics {
            destination: destination.name.clone(),
            data_source: source.data_source().to_string(),
            generated_at,
            total_products: counters.products,
            total_items: counters.items,
            skipped_records: counters.skipped,
            file_size_bytes: counters.bytes,
            duration_seconds,
            feed_filename: destination.feed_filename.clone(),
            success: error.is_none(),
            error,
        }
    }

    async fn generate<S: CatalogSource>(
        &self,
        source: &mut S,
        destination: &DestinationConfig,
        generated_at: DateTime<Utc>,
        counters: &mut Counters,
    ) -> Result<(), PipelineError> {
        let path = self.feed_path(destination);
        if self.config.settings.backup_previous_feed {
            match backup_previous(&path) {
                Ok(Some(backup)) => {
                    tracing::debug!(backup = %backup.display(), "previous feed backed up");
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not back up previous feed"
                ),
            }
        }

        let mapper = mapper_for(
            destination.kind,
            MapperContext::new(Arc::clone(&self.config), &self.base_url, destination),
        );
        let mut writer = StreamWriter::create(&path, FeedFormat::for_destination(destination.kind))?;
        writer.start(&ChannelInfo {
            title: destination.title_or_default(),
            link: destination
                .link
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            description: destination.description_or_default(),
            updated: generated_at,
        })?;

        source.rewind();
        while let Some(page) = source.next_page().await.map_err(PipelineError::source)? {
            counters.skipped += page.skipped as u64;

            for mut product in page.products {
                counters.products += 1;
                if counters.products.is_multiple_of(PROGRESS_EVERY) {
                    tracing::info!(
                        destination = %destination.name,
                        products = counters.products,
                        items = counters.items,
                        "progress"
                    );
                }

                // Dropped products are never enriched.
                if product_drop_reason(&product, &self.config.filters).is_none() {
                    if let Err(e) = source.enrich(&mut product).await {
                        if S::is_record_level(&e) {
                            tracing::warn!(
                                destination = %destination.name,
                                product_id = product.id,
                                error = %e,
                                "skipping product that could not be enriched"
                            );
                            counters.skipped += 1;
                            continue;
                        }
                        return Err(PipelineError::source(e));
                    }
                }

                let mapping = map_product(mapper.as_ref(), &self.config.filters, &product);
                counters.skipped += mapping.failed_variants as u64;
                for item in &mapping.items {
                    writer.add_item(item)?;
                    counters.items += 1;
                }
            }
        }

        let summary = writer.close()?;
        counters.bytes = summary.bytes_written;
        Ok(())
    }
}
