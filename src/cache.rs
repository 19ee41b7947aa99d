// src/cache.rs
//! Build cache: decides reuse vs. rebuild and owns the artifact's
//! on-disk representation.
//!
//! The persisted artifact is pure cache state keyed by the configured
//! dump path. Callers needing concurrent builds must serialize access
//! per path themselves; the cache does not lock.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::error::{FlowError, PersistError, Result};
use crate::facility::Facility;
use crate::pipeline::{BuildArtifact, DateBoundaries, IngestionPipeline};

/// Per-call knobs for [`BuildCache::build`].
#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Rebuild from sources even when a cached artifact exists.
    pub force_rebuild: bool,
    /// Inclusive date filter; supplying one always bypasses the cache.
    pub date_boundaries: Option<DateBoundaries>,
    /// A graph built elsewhere; persisted as-is, no parsing at all.
    pub prebuilt: Option<Facility>,
}

/// The result of one build call.
#[derive(Debug)]
pub struct BuildOutcome {
    pub artifact: BuildArtifact,
    /// False when the artifact was restored from disk or handed in.
    pub rebuilt: bool,
    /// A failed persist is reported here, never raised; the in-memory
    /// artifact above stays valid either way.
    pub persist_error: Option<PersistError>,
}

impl BuildOutcome {
    #[must_use]
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Owns the configuration and the artifact on disk.
#[derive(Debug)]
pub struct BuildCache {
    config: BuildConfig,
}

impl BuildCache {
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Loads the configuration file and wraps it.
    ///
    /// # Errors
    /// Propagates configuration load failures.
    pub fn from_config_path(path: &Path) -> Result<Self> {
        Ok(Self::new(BuildConfig::load(path)?))
    }

    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Returns a built facility graph, reusing the cached artifact when
    /// allowed.
    ///
    /// Decision order: a prebuilt graph goes straight to persist; then a
    /// cached artifact is restored when no rebuild was forced and no
    /// date boundaries were given; otherwise the pipeline runs fresh and
    /// the result is persisted, overwriting any prior artifact.
    ///
    /// # Errors
    /// Fatal pipeline errors and restore failures of an existing
    /// artifact abort the call. Persist failures do not; see
    /// [`BuildOutcome::persist_error`].
    pub fn build(&self, options: BuildOptions) -> Result<BuildOutcome> {
        if let Some(facility) = options.prebuilt {
            info!("persisting prebuilt facility graph");
            let artifact = BuildArtifact {
                facility,
                stats: None,
            };
            return Ok(self.finish(artifact, false));
        }

        let reusable = !options.force_rebuild
            && options.date_boundaries.is_none()
            && self.config.facility_dump_path.is_file();
        if reusable {
            info!(path = %self.config.facility_dump_path.display(), "restoring cached artifact");
            let artifact = self.restore()?;
            return Ok(BuildOutcome {
                artifact,
                rebuilt: false,
                persist_error: None,
            });
        }

        let pipeline = IngestionPipeline::new(&self.config);
        let artifact = pipeline.run(options.date_boundaries.as_ref())?;
        Ok(self.finish(artifact, true))
    }

    fn finish(&self, artifact: BuildArtifact, rebuilt: bool) -> BuildOutcome {
        let persist_error = self.persist(&artifact).err();
        if let Some(e) = &persist_error {
            warn!(error = %e, "artifact persist failed; in-memory graph remains usable");
        }
        BuildOutcome {
            artifact,
            rebuilt,
            persist_error,
        }
    }

    /// Restores the artifact from the dump path without touching any
    /// source file.
    fn restore(&self) -> Result<BuildArtifact> {
        let path = &self.config.facility_dump_path;
        let raw = fs::read_to_string(path).map_err(|e| FlowError::io(e, path))?;
        serde_json::from_str(&raw).map_err(|e| FlowError::CorruptArtifact {
            reason: e.to_string(),
            path: path.clone(),
        })
    }

    fn persist(&self, artifact: &BuildArtifact) -> std::result::Result<(), PersistError> {
        let path = &self.config.facility_dump_path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| PersistError::Io {
                    source: e,
                    path: parent.to_path_buf(),
                })?;
            }
        }
        let body = serde_json::to_string_pretty(artifact)?;
        fs::write(path, body).map_err(|e| PersistError::Io {
            source: e,
            path: path.clone(),
        })
    }
}

/// Top-level build entry point: load the configuration, build, persist.
///
/// # Errors
/// Propagates configuration and fatal build errors.
pub fn build(config_path: &Path, options: BuildOptions) -> Result<BuildOutcome> {
    BuildCache::from_config_path(config_path)?.build(options)
}
