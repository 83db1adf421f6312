//! Context build orchestration
//!
//! The only component aware of scanner, selector, change detector,
//! statistics gatherer, and enrichment pipeline together. Two operations:
//!
//! - **build**: full rebuild of the artifact directory (refuses to
//!   overwrite an existing one unless forced)
//! - **update**: incremental refresh of an existing artifact directory,
//!   optionally narrowed by a model selection, gated per table by change
//!   detection
//!
//! Tables are profiled one at a time in a plain sequential loop; the hash
//! cache is read once before the loop and written once after it.

use crate::artifact::{ArtifactLayout, SYSTEM_PROMPT_DOC};
use crate::error::{AgentError, AgentResult};
use crate::profile::{ProfileError, ProfileResult, ProfileSummary};
use ds_core::sql_utils::split_qualified_name;
use ds_core::{
    apply_selection, detect_changes, scan_project, ComputedHashes, HashCacheFile, Manifest,
    ModelDocumentation, ModelGraph, ModelHashRecord, ModelNode, ProjectMetadata, RefGraph,
    Selection,
};
use ds_db::{DbError, StatisticsGatherer, Warehouse};
use ds_llm::{
    build_catalog_prompt, build_summary_prompt, render_catalog_fallback, render_summary_fallback,
    Enricher, TextGenerator,
};
use std::path::PathBuf;
use std::time::Instant;

/// Everything the orchestrator needs, wired by the caller.
pub struct ContextParams<'a> {
    /// Project name, used in the project-level documents
    pub project_name: String,

    /// Directories scanned for model definition files
    pub model_roots: Vec<PathBuf>,

    /// Artifact directory root
    pub artifact_root: PathBuf,

    /// Warehouse schema whose tables are enumerated for a full profile
    pub warehouse_schema: String,

    /// Warehouse collaborator
    pub warehouse: &'a dyn Warehouse,

    /// Generative-text collaborator; `None` forces fallback everywhere
    pub generator: Option<&'a dyn TextGenerator>,

    /// Compiled-manifest metadata; `None` degrades tag selection,
    /// documentation, and logic hashing gracefully
    pub manifest: Option<&'a Manifest>,

    /// Token budget per generation call
    pub max_tokens: u32,

    /// Sampling temperature for generation calls
    pub temperature: f32,

    /// Free-form business context blended into table prompts
    pub business_context: Option<String>,
}

/// Options for the build operation.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Overwrite an existing artifact directory
    pub force: bool,
}

/// Options for the update operation.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Skip regenerating the two project-level documents
    pub profiles_only: bool,

    /// Optional model selection (selection micro-language)
    pub selection: Option<String>,

    /// Exclusion patterns, same grammar as the selection
    pub exclude: Vec<String>,
}

/// One table scheduled for profiling.
struct Candidate {
    model_name: String,
    schema: String,
    table: String,
}

/// Composes the pipeline components into build and update runs.
pub struct ContextBuilder<'a> {
    params: ContextParams<'a>,
    layout: ArtifactLayout,
}

impl<'a> ContextBuilder<'a> {
    /// Create an orchestrator from wired collaborators.
    pub fn new(params: ContextParams<'a>) -> Self {
        let layout = ArtifactLayout::new(&params.artifact_root);
        Self { params, layout }
    }

    /// Full build: create the artifact directory, scan, profile every
    /// table in the warehouse schema, write all documents.
    pub async fn build(&self, opts: &BuildOptions) -> AgentResult<ProfileSummary> {
        if self.layout.exists() && !opts.force {
            return Err(AgentError::TargetExists {
                path: self.layout.root().display().to_string(),
            });
        }
        self.layout.ensure_dirs()?;

        let graph = self.scan()?;
        let mut summary = ProfileSummary::new();

        self.layout
            .write(&self.layout.system_prompt_file(), SYSTEM_PROMPT_DOC)?;
        self.write_project_documents(&graph, &mut summary).await?;

        let mut cache = self.load_cache();
        let candidates = self.full_candidate_list().await?;
        self.profile_set(candidates, &mut cache, &mut summary, false)
            .await?;

        self.finish(cache, &summary)?;
        Ok(summary)
    }

    /// Incremental update: re-scan, optionally regenerate project
    /// documents, re-profile the selected (or full) table set gated by
    /// change detection.
    pub async fn update(&self, opts: &UpdateOptions) -> AgentResult<ProfileSummary> {
        if !self.layout.exists() {
            return Err(AgentError::TargetMissing {
                path: self.layout.root().display().to_string(),
            });
        }
        self.layout.ensure_dirs()?;

        let graph = self.scan()?;
        let mut summary = ProfileSummary::new();

        if !opts.profiles_only {
            self.write_project_documents(&graph, &mut summary).await?;
        }

        let mut cache = self.load_cache();
        let candidates = self.selected_candidate_list(&graph, opts).await?;
        self.profile_set(candidates, &mut cache, &mut summary, true)
            .await?;

        self.finish(cache, &summary)?;
        Ok(summary)
    }

    /// Scan all model roots into one graph.
    fn scan(&self) -> AgentResult<ModelGraph> {
        let mut nodes: Vec<ModelNode> = Vec::new();
        for root in &self.params.model_roots {
            let graph = scan_project(root)?;
            nodes.extend(graph.nodes().iter().cloned());
        }
        let graph = ModelGraph::from_nodes(nodes);
        log::info!(
            "Scanned {} models ({} refs, {} sources)",
            graph.len(),
            graph.ref_count,
            graph.source_count
        );
        Ok(graph)
    }

    fn enricher(&self) -> Enricher<'_> {
        Enricher::new(
            self.params.generator,
            self.params.max_tokens,
            self.params.temperature,
        )
    }

    fn load_cache(&self) -> HashCacheFile {
        match HashCacheFile::load(&self.layout.hash_cache_file()) {
            Ok(cache) => cache,
            Err(e) => {
                log::warn!("Hash cache unreadable, starting fresh: {e}");
                HashCacheFile::default()
            }
        }
    }

    /// Write `summary.md` and `modelling.md`, each independently falling
    /// back to its template.
    async fn write_project_documents(
        &self,
        graph: &ModelGraph,
        summary: &mut ProfileSummary,
    ) -> AgentResult<()> {
        let enricher = self.enricher();
        let name = &self.params.project_name;

        let record = enricher
            .enrich(&build_summary_prompt(name, graph), || {
                render_summary_fallback(name, graph)
            })
            .await;
        summary.add_cost(record.cost_estimate);
        self.layout
            .write(&self.layout.summary_file(), record.outcome.content())?;

        let record = enricher
            .enrich(&build_catalog_prompt(name, graph), || {
                render_catalog_fallback(name, graph)
            })
            .await;
        summary.add_cost(record.cost_estimate);
        self.layout
            .write(&self.layout.modelling_file(), record.outcome.content())?;

        Ok(())
    }

    /// Every base table in the configured warehouse schema.
    async fn full_candidate_list(&self) -> AgentResult<Vec<Candidate>> {
        let tables = self
            .params
            .warehouse
            .list_tables(Some(&self.params.warehouse_schema))
            .await?;
        Ok(tables
            .into_iter()
            .map(|(schema, table)| Candidate {
                model_name: table.clone(),
                schema,
                table,
            })
            .collect())
    }

    /// Resolve the update selection to tables via the metadata
    /// collaborator. Falls back to the full table list when nothing
    /// resolves.
    async fn selected_candidate_list(
        &self,
        graph: &ModelGraph,
        opts: &UpdateOptions,
    ) -> AgentResult<Vec<Candidate>> {
        let selection_str = opts.selection.as_deref().unwrap_or("");
        if selection_str.trim().is_empty() && opts.exclude.is_empty() {
            return self.full_candidate_list().await;
        }

        let selection = Selection::parse(selection_str, &opts.exclude)?;
        let refs = RefGraph::build(graph);
        let names = apply_selection(&selection, graph, &refs, self.params.manifest);

        let mut candidates = Vec::new();
        for name in &names {
            match self.lookup_table_name(name) {
                Some(qualified) => {
                    let (schema, table) = split_qualified_name(&qualified);
                    candidates.push(Candidate {
                        model_name: name.to_string(),
                        schema: schema.to_string(),
                        table: table.to_string(),
                    });
                }
                None => {
                    log::warn!("Model '{name}' does not resolve to a warehouse table");
                }
            }
        }

        if candidates.is_empty() {
            log::warn!(
                "Selection '{selection_str}' resolved no tables; profiling the full table list"
            );
            return self.full_candidate_list().await;
        }
        Ok(candidates)
    }

    fn lookup_table_name(&self, name: &str) -> Option<String> {
        let manifest = self.params.manifest?;
        match manifest.model_table_name(name) {
            Ok(Some(table)) => Some(table.into_inner()),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Table name lookup failed for '{name}': {e}");
                None
            }
        }
    }

    /// Profile a set of candidates sequentially. With `gate_on_changes`,
    /// unchanged tables are skipped.
    async fn profile_set(
        &self,
        candidates: Vec<Candidate>,
        cache: &mut HashCacheFile,
        summary: &mut ProfileSummary,
        gate_on_changes: bool,
    ) -> AgentResult<()> {
        for candidate in candidates {
            let schema_cols = match self
                .params
                .warehouse
                .get_table_schema(&candidate.schema, &candidate.table)
                .await
            {
                Ok(cols) => Some(cols),
                Err(DbError::Connection(e)) => return Err(DbError::Connection(e).into()),
                Err(e) => {
                    log::warn!(
                        "Schema introspection failed for {}.{}: {e}",
                        candidate.schema,
                        candidate.table
                    );
                    None
                }
            };
            let docs = self.lookup_documentation(&candidate.model_name);
            let compiled = self.lookup_compiled_sql(&candidate.model_name);

            let (report, hashes) = detect_changes(
                cache.get(&candidate.model_name),
                schema_cols.as_deref(),
                docs.as_ref(),
                compiled.as_deref(),
            );

            if gate_on_changes && !report.should_reprofile() {
                log::info!("{} unchanged, skipping", candidate.model_name);
                summary.record_skipped();
                continue;
            }

            self.profile_one(&candidate, docs.as_ref(), hashes, cache, summary)
                .await?;
        }
        Ok(())
    }

    /// Profile one table: statistics, enrichment, artifact, cache record.
    ///
    /// Statistics query failures are recorded as a failed result and the
    /// loop continues; artifact write failures abort the run.
    async fn profile_one(
        &self,
        candidate: &Candidate,
        docs: Option<&ModelDocumentation>,
        hashes: ComputedHashes,
        cache: &mut HashCacheFile,
        summary: &mut ProfileSummary,
    ) -> AgentResult<()> {
        let start = Instant::now();
        let gatherer = StatisticsGatherer::new(self.params.warehouse);

        let stats = match gatherer
            .profile_table(&candidate.schema, &candidate.table)
            .await
        {
            Ok(stats) => stats,
            Err(DbError::Connection(e)) => return Err(DbError::Connection(e).into()),
            Err(e) => {
                summary.record(ProfileResult {
                    model_name: candidate.model_name.clone(),
                    success: false,
                    fallback_used: false,
                    duration_ms: start.elapsed().as_millis() as u64,
                    artifact_path: None,
                    error: Some(ProfileError {
                        model: candidate.model_name.clone(),
                        message: e.to_string(),
                        fallback_used: false,
                    }),
                });
                return Ok(());
            }
        };

        let record = self
            .enricher()
            .enrich_table(&stats, docs, self.params.business_context.as_deref())
            .await;

        let rel_path = ArtifactLayout::table_artifact_rel(&candidate.schema, &candidate.table);
        let file = self
            .layout
            .table_artifact_file(&candidate.schema, &candidate.table);
        self.layout.write(&file, record.outcome.content())?;

        let fallback_used = record.outcome.fallback_used();
        let generation_failed = record.error.is_some();
        summary.add_cost(record.cost_estimate);
        summary.record(ProfileResult {
            model_name: candidate.model_name.clone(),
            success: !fallback_used,
            fallback_used,
            duration_ms: start.elapsed().as_millis() as u64,
            artifact_path: Some(rel_path.clone()),
            error: record.error.map(|message| ProfileError {
                model: candidate.model_name.clone(),
                message,
                fallback_used: true,
            }),
        });

        // A failed generation leaves the cache record untouched so the
        // next update retries the table; an intentional fallback (no
        // generator) counts as a completed profile.
        if !generation_failed {
            let cached = cache.get(&candidate.model_name);
            let merged = ModelHashRecord {
                schema_hash: merge_hash(hashes.schema, cached.map(|c| &c.schema_hash)),
                documentation_hash: merge_hash(
                    hashes.documentation,
                    cached.map(|c| &c.documentation_hash),
                ),
                logic_hash: merge_hash(hashes.logic, cached.map(|c| &c.logic_hash)),
                last_profiled: chrono::Utc::now(),
                profile_path: rel_path,
                warehouse_table: format!("{}.{}", candidate.schema, candidate.table),
            };
            cache.upsert(candidate.model_name.clone(), merged);
        }

        Ok(())
    }

    /// Documentation for change detection and prompts. With no manifest
    /// at all the project consistently has empty documentation; only an
    /// actual lookup error yields `None` (the "unchanged" default).
    fn lookup_documentation(&self, name: &str) -> Option<ModelDocumentation> {
        let Some(manifest) = self.params.manifest else {
            return Some(ModelDocumentation::default());
        };
        match manifest.model_documentation(name) {
            Ok(Some(docs)) => Some(docs),
            Ok(None) => Some(ModelDocumentation::default()),
            Err(e) => {
                log::warn!("Documentation lookup failed for '{name}': {e}");
                None
            }
        }
    }

    /// Compiled text for logic hashing. Absent text is treated like a
    /// failed lookup: there is nothing to hash.
    fn lookup_compiled_sql(&self, name: &str) -> Option<String> {
        let manifest = self.params.manifest?;
        match manifest.compiled_sql(name) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Compiled text lookup failed for '{name}': {e}");
                None
            }
        }
    }

    /// Persist the cache and the run summary.
    fn finish(&self, mut cache: HashCacheFile, summary: &ProfileSummary) -> AgentResult<()> {
        cache.save(&self.layout.hash_cache_file())?;
        let json = serde_json::to_string_pretty(summary).map_err(ds_core::CoreError::from)?;
        self.layout.write(&self.layout.run_summary_file(), &json)?;
        log::info!(
            "Run {}: {} total, {} enriched, {} fallback, {} failed, {} skipped",
            summary.run_id,
            summary.total,
            summary.succeeded,
            summary.fallbacks,
            summary.failed,
            summary.skipped
        );
        Ok(())
    }
}

/// Keep the freshly computed hash, fall back to the cached value, then to
/// an empty sentinel for first-time records with failed lookups.
fn merge_hash(fresh: Option<String>, cached: Option<&String>) -> String {
    fresh
        .or_else(|| cached.cloned())
        .unwrap_or_default()
}
