//! Generation orchestrator
//!
//! Composition root for one invocation: for each (spec, generator)
//! pair it consults the build cache, invokes the generator on a miss,
//! routes and emits the produced files, updates cache and ledger, and
//! finally reconciles the output tree against the previous tracking
//! manifest to delete orphans and persist a new one.
//!
//! Crash safety is filesystem-based: the produced-path set is always
//! computed fresh this run, never taken from the manifest, so a stale
//! manifest can at worst cause redundant re-validation — never the
//! deletion of files the interrupted run just produced.

use crate::cache::{BuildCache, CacheDecision};
use crate::emit::{Emitter, TrackingManifest};
use crate::error::{SpecforgeError, SpecforgeResult};
use crate::generator::GeneratorRegistry;
use crate::hash;
use crate::kinds::KindGraph;
use crate::plan::{GenerationPlan, RunId, RunSummary, StepStatus};
use crate::resource::ResourceTracker;
use crate::router::{Family, OutputRouter};
use crate::spec::SpecSet;
use crate::step::StepKey;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Options for one generation run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Clear the build cache before running
    pub force: bool,

    /// Compute everything, write and delete nothing
    pub dry_run: bool,

    /// Restrict the matrix to one generator family
    pub family: Option<Family>,

    /// Restrict the matrix to one generator name
    pub only: Option<String>,

    /// Delete orphaned files after the matrix
    pub clean_orphans: bool,
}

/// What one run did
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    pub summary: RunSummary,

    /// Files whose bytes were (or, in a dry run, would be) written
    pub files_written: u64,

    /// Files left untouched because content was unchanged
    pub files_skipped: u64,

    /// Orphaned files deleted (or, in a dry run, slated for deletion)
    pub removed: Vec<PathBuf>,

    /// Per-step failures, with reasons
    pub failures: Vec<(StepKey, String)>,

    /// Non-fatal anomalies attached to the run
    pub warnings: Vec<String>,

    pub dry_run: bool,
}

impl RunReport {
    /// Whether the run must exit non-zero
    pub fn failed(&self) -> bool {
        self.summary.failed > 0
    }
}

/// Composition root for one invocation
pub struct GenerationOrchestrator {
    project_root: PathBuf,
    router: OutputRouter,
    registry: GeneratorRegistry,
    cache: BuildCache,
    plan: GenerationPlan,
    tracker: ResourceTracker,
    emitter: Emitter,
    previous_manifest: Option<TrackingManifest>,
}

impl GenerationOrchestrator {
    /// Assemble the pipeline: validate routing, hydrate the emitter
    /// from the previous tracking manifest (a corrupt manifest is a
    /// warning, treated as absent), and take ownership of the stores.
    pub async fn prepare(
        project_root: &Path,
        router: OutputRouter,
        registry: GeneratorRegistry,
        cache: BuildCache,
    ) -> SpecforgeResult<Self> {
        router.validate()?;

        let previous_manifest = match TrackingManifest::load(project_root).await {
            Ok(m) => m,
            Err(e) => {
                warn!("Ignoring unusable tracking manifest: {}", e);
                None
            }
        };
        let emitter = match &previous_manifest {
            Some(manifest) => Emitter::from_manifest(manifest),
            None => Emitter::new(),
        };

        Ok(Self {
            project_root: project_root.to_path_buf(),
            router,
            registry,
            cache,
            plan: GenerationPlan::new(),
            tracker: ResourceTracker::new(),
            emitter,
            previous_manifest,
        })
    }

    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }

    pub fn plan(&self) -> &GenerationPlan {
        &self.plan
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn router(&self) -> &OutputRouter {
        &self.router
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Descriptive kind graph of the configured pipeline
    pub fn pipeline_graph(&self) -> SpecforgeResult<KindGraph> {
        pipeline_graph(&self.registry)
    }

    /// Execute the full generation matrix and reconcile orphans
    pub async fn run(&self, specs: &SpecSet, options: &RunOptions) -> SpecforgeResult<RunReport> {
        if specs.specs.is_empty() {
            return Err(SpecforgeError::NoSpecsFound(self.project_root.clone()));
        }
        let generators = self.registry.select(options.family, options.only.as_deref());
        if generators.is_empty() {
            return Err(SpecforgeError::NoGeneratorsConfigured);
        }

        if options.force {
            let cleared = self.cache.invalidate_all();
            info!("Forced rebuild: cleared {} cache entries", cleared);
        }

        let run_id = self.plan.begin()?;
        let mut produced: HashSet<PathBuf> = HashSet::new();
        let mut files_written: u64 = 0;
        let mut files_skipped: u64 = 0;
        let mut failures: Vec<(StepKey, String)> = Vec::new();
        let warnings: Vec<String> = specs
            .skipped
            .iter()
            .map(|(path, reason)| format!("skipped spec {}: {}", path.display(), reason))
            .collect();
        let mut target_dirs: BTreeMap<String, PathBuf> = BTreeMap::new();

        for spec in &specs.specs {
            self.tracker.upsert(&spec.locator(), "spec", &spec.digest);
        }

        for generator in &generators {
            let label = generator.label();
            target_dirs.insert(
                label.clone(),
                self.router.base_dir(generator.family(), generator.name()),
            );

            for spec in &specs.specs {
                let step_key =
                    StepKey::new(generator.family().as_str(), generator.name(), &spec.name);
                let input_hash = hash::json_hash(&json!({
                    "generator": label,
                    "spec": spec.manifest,
                }));

                match self
                    .cache
                    .check(&step_key, &input_hash, generator.deterministic())
                {
                    CacheDecision::Unchanged => {
                        // Carry the step's previously tracked files into
                        // the produced set so reconciliation keeps them
                        let mut carried: u64 = 0;
                        for path in self.emitter.affected(&spec.locator()) {
                            if self.tracked_by(&path, &label) {
                                produced.insert(path);
                                carried += 1;
                            }
                        }
                        files_skipped += carried;
                        debug!("{} unchanged ({} files cached)", step_key, carried);
                        self.plan
                            .record_step(run_id, &step_key, StepStatus::Cached, carried, 0)?;
                        continue;
                    }
                    CacheDecision::Changed { previous_hash } => {
                        debug!(
                            "{} changed (previous input {})",
                            step_key,
                            previous_hash.as_deref().map(hash::short_hash).unwrap_or("none")
                        );
                    }
                }

                let started = Instant::now();
                let files = match generator.generate(spec).await {
                    Ok(files) => files,
                    Err(e) => {
                        warn!("{} failed: {}", step_key, e);
                        failures.push((step_key.clone(), e.to_string()));
                        self.plan.record_step(
                            run_id,
                            &step_key,
                            StepStatus::Failed,
                            0,
                            started.elapsed().as_millis() as u64,
                        )?;
                        continue;
                    }
                };

                let base = self.router.base_dir(generator.family(), generator.name());
                let sources = vec![spec.locator()];
                let mut file_hashes = Vec::with_capacity(files.len());
                let mut step_files_ok: u64 = 0;
                let mut step_write_error: Option<String> = None;

                for file in &files {
                    let absolute = self.router.resolve(&file.path);
                    let relative = absolute
                        .strip_prefix(&base)
                        .unwrap_or(&absolute)
                        .to_path_buf();

                    let outcome = self.emitter.write(
                        &absolute,
                        &relative,
                        &file.content,
                        &label,
                        Some(&spec.name),
                        &sources,
                    );
                    file_hashes.push(outcome.hash.clone());

                    if !outcome.written {
                        produced.insert(absolute);
                        files_skipped += 1;
                        step_files_ok += 1;
                        continue;
                    }
                    if options.dry_run {
                        produced.insert(absolute);
                        files_written += 1;
                        step_files_ok += 1;
                        continue;
                    }
                    match write_bytes(&absolute, &file.content).await {
                        Ok(()) => {
                            produced.insert(absolute);
                            files_written += 1;
                            step_files_ok += 1;
                        }
                        Err(e) => {
                            // The tracked hash must not outlive a write
                            // that never landed, or the next run would
                            // treat the missing file as current
                            warn!("Failed to write {}: {}", absolute.display(), e);
                            self.emitter.remove(&absolute);
                            step_write_error =
                                Some(format!("writing {}: {}", absolute.display(), e));
                        }
                    }
                }

                // A step whose bytes did not all land is failed, not
                // done: no cache entry, so the next run re-executes it
                if let Some(reason) = step_write_error {
                    failures.push((step_key.clone(), reason));
                    self.plan.record_step(
                        run_id,
                        &step_key,
                        StepStatus::Failed,
                        step_files_ok,
                        started.elapsed().as_millis() as u64,
                    )?;
                    continue;
                }

                let output_hash = hash::aggregate_hash(&file_hashes);
                self.cache.record(
                    &step_key,
                    &input_hash,
                    &output_hash,
                    Some(&spec.locator()),
                    Some(&spec.digest),
                    generator.deterministic(),
                );
                self.plan.record_step(
                    run_id,
                    &step_key,
                    StepStatus::Done,
                    files.len() as u64,
                    started.elapsed().as_millis() as u64,
                )?;
            }
        }

        let removed = self
            .reconcile_orphans(&produced, options)
            .await?;

        if !options.dry_run {
            let files = self
                .emitter
                .tracked()
                .into_iter()
                .filter(|f| produced.contains(&f.path))
                .collect();
            TrackingManifest::new(files, target_dirs)
                .save(&self.project_root)
                .await?;
        }

        self.plan.complete(run_id)?;
        let summary = self.plan.summary(run_id)?;
        info!(
            "Run {}: {} steps ({} executed, {} cached, {} failed), {} written, {} unchanged, {} removed",
            run_id, summary.total, summary.executed, summary.cached, summary.failed,
            files_written, files_skipped, removed.len(),
        );

        Ok(RunReport {
            run_id,
            summary,
            files_written,
            files_skipped,
            removed,
            failures,
            warnings,
            dry_run: options.dry_run,
        })
    }

    fn tracked_by(&self, path: &Path, label: &str) -> bool {
        self.emitter
            .tracked()
            .iter()
            .any(|f| f.path == path && f.target == label)
    }

    /// Delete previously-tracked files the fresh produced set no
    /// longer claims. At most one deletion per orphan: the path also
    /// leaves the in-memory manifest, so the next manifest write
    /// forgets it.
    async fn reconcile_orphans(
        &self,
        produced: &HashSet<PathBuf>,
        options: &RunOptions,
    ) -> SpecforgeResult<Vec<PathBuf>> {
        let Some(previous) = &self.previous_manifest else {
            return Ok(Vec::new());
        };
        if !options.clean_orphans {
            debug!("Orphan cleanup disabled");
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        for file in &previous.files {
            if produced.contains(&file.path) {
                continue;
            }
            if !file.path.exists() {
                self.emitter.remove(&file.path);
                continue;
            }

            if options.dry_run {
                debug!("Would remove orphan {}", file.path.display());
            } else if let Err(e) = tokio::fs::remove_file(&file.path).await {
                warn!("Failed to remove orphan {}: {}", file.path.display(), e);
                continue;
            } else {
                info!("Removed orphan {}", file.path.display());
            }

            if !options.dry_run {
                self.emitter.remove(&file.path);
            }
            removed.push(file.path.clone());
        }

        removed.sort();
        Ok(removed)
    }
}

/// Kind graph describing what the registered generators produce from
/// spec manifests
pub fn pipeline_graph(registry: &GeneratorRegistry) -> SpecforgeResult<KindGraph> {
    let graph = KindGraph::new();
    graph.define("SpecManifest", "source");
    for generator in registry.select(None, None) {
        let label = generator.label();
        graph.define(&label, generator.family().as_str());
        graph.connect("SpecManifest", &label, "produces", Some(generator.name()))?;
    }
    Ok(graph)
}

async fn write_bytes(path: &Path, content: &str) -> SpecforgeResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SpecforgeError::io(format!("creating {}", parent.display()), e))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| SpecforgeError::io(format!("writing {}", path.display()), e))
}
