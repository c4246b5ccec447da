//! # Compressor Main Orchestrator
//!
//! Orchestratore principale: scopre i file, pianifica le coppie
//! (file, codec) mancanti, le esegue in parallelo con un pool limitato
//! e attende che tutte terminino prima di restituire.
//!
//! ## Semantica di completamento:
//! - Nessun task viene cancellato: anche dopo un errore i fratelli terminano
//! - Ogni esito viene riportato appena disponibile (ordine di completamento)
//! - Il primo errore (in ordine di completamento) determina l'esito finale

use crate::{
    codec::CodecRegistry,
    config::Config,
    error::CompressError,
    file_manager::FileManager,
    json_output::JsonMessage,
    orchestrator::{
        reporter::{ReportSink, Reporter},
        task::{CompressionResult, CompressionTask},
    },
    progress::{ProgressManager, RunStats},
    runner::{CodecRunner, ProcessRunner},
    tool_resolver::ToolResolver,
};
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Identity of a spawned task, kept outside the task so that a panic
/// can still be attributed to its (file, codec) pair
struct TaskLabel {
    program: String,
    extension: String,
    source_file: PathBuf,
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub stats: RunStats,
    /// First task error in completion order
    pub first_error: Option<CompressError>,
}

impl RunOutcome {
    /// Turn the outcome into the process-level result: any failed task
    /// makes the whole run an error
    pub fn into_result(self) -> Result<RunStats> {
        match self.first_error {
            None => Ok(self.stats),
            Some(first) => {
                let message = format!(
                    "{} of {} compression tasks failed",
                    self.stats.tasks_failed, self.stats.tasks_planned
                );
                Err(anyhow::Error::new(first).context(message))
            }
        }
    }
}

/// Orchestratore principale
pub struct Compressor<R: CodecRunner = ProcessRunner> {
    config: Config,
    registry: CodecRegistry,
    runner: Arc<R>,
    semaphore: Arc<Semaphore>,
    show_progress: bool,
    check_tools: bool,
    sink: ReportSink,
}

impl Compressor<ProcessRunner> {
    /// Compressor that spawns the real codec programs
    pub fn new(config: Config) -> Result<Self, CompressError> {
        let compressor = Self::with_runner(config, CodecRegistry::default(), ProcessRunner::new())?;
        Ok(Self {
            show_progress: true,
            check_tools: true,
            ..compressor
        })
    }
}

impl<R: CodecRunner> Compressor<R> {
    /// Compressor over an injected runner; progress bar and tool checks off
    pub fn with_runner(config: Config, registry: CodecRegistry, runner: R) -> Result<Self, CompressError> {
        config.validate()?;
        let semaphore = Arc::new(Semaphore::new(config.workers));

        Ok(Self {
            config,
            registry,
            runner: Arc::new(runner),
            semaphore,
            show_progress: false,
            check_tools: false,
            sink: ReportSink::default(),
        })
    }

    /// Route report lines somewhere other than the terminal
    #[cfg(test)]
    fn with_sink(self, sink: ReportSink) -> Self {
        Self { sink, ..self }
    }

    /// Run and convert the outcome into a process-level result
    pub async fn run(&self) -> Result<RunStats> {
        self.execute().await?.into_result()
    }

    /// Plan, run and drain every task. Only traversal errors return `Err`;
    /// task errors end up in `RunOutcome::first_error`.
    pub async fn execute(&self) -> Result<RunOutcome, CompressError> {
        let start_time = Instant::now();
        let root = self.config.root_dir.clone();
        info!("Starting compression in: {}", root.display());

        let (tasks, mut stats) = self.plan(&root).await?;
        info!(
            "Found {} files, {} compressions to run ({} already done)",
            stats.files_selected, stats.tasks_planned, stats.pairs_skipped
        );

        if self.check_tools && !tasks.is_empty() {
            ToolResolver::new().report_missing(&self.registry);
        }

        let progress = if self.show_progress && !self.config.json_output {
            ProgressManager::new(tasks.len() as u64)
        } else {
            ProgressManager::hidden()
        };
        let reporter = Reporter::new(self.config.json_output, progress, self.sink.clone());

        if self.config.json_output {
            reporter.emit(&JsonMessage::start(
                root,
                stats.files_selected,
                stats.tasks_planned,
                self.config.workers,
            ));
        }

        let mut pending: FuturesUnordered<_> = tasks
            .into_iter()
            .map(|task| self.spawn_task(task))
            .collect();

        let mut first_error = None;
        while let Some((label, outcome)) = pending.next().await {
            match outcome {
                Ok(result) => {
                    stats.add_completed(result.original_size_bytes, result.compressed_size_bytes);
                    reporter.report_success(&result);
                }
                Err(e) => {
                    stats.add_failed();
                    error!(
                        "{} failed for {}: {}",
                        label.program,
                        label.source_file.display(),
                        e
                    );
                    reporter.report_failure(&label.program, &label.extension, &label.source_file, &e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        reporter.progress().finish();
        self.print_final_stats(&reporter, &stats, start_time.elapsed().as_secs_f64());

        Ok(RunOutcome { stats, first_error })
    }

    /// Walk the root and expand every selected file into its missing pairs.
    /// An unreadable root aborts before a single task exists.
    pub async fn plan(&self, root: &Path) -> Result<(Vec<CompressionTask>, RunStats), CompressError> {
        let mut tasks = Vec::new();
        let mut stats = RunStats::new();
        let mut claimed = HashSet::new();

        for entry in FileManager::candidates(root) {
            let path = entry?;
            stats.files_selected += 1;

            let (file_tasks, skipped) = self.plan_file(&path, &mut claimed).await;
            stats.pairs_skipped += skipped;
            tasks.extend(file_tasks);
        }

        stats.tasks_planned = tasks.len();
        Ok((tasks, stats))
    }

    /// Per-file expansion in registry order. `claimed` holds the resolved
    /// output paths already assigned during this run, so a file reached
    /// through a symlinked directory is planned once. Returns the new tasks
    /// and the number of pairs skipped.
    pub async fn plan_file(
        &self,
        source: &Path,
        claimed: &mut HashSet<PathBuf>,
    ) -> (Vec<CompressionTask>, usize) {
        let mut tasks = Vec::new();
        let mut skipped = 0;

        for codec in self.registry.iter() {
            let output = codec.output_path(source);
            let key = FileManager::resolved_output(&output).await;
            if claimed.contains(&key) {
                debug!("Already planned: {}", output.display());
                continue;
            }
            if FileManager::output_exists(&output).await {
                debug!("[OK] Skipping, output already exists: {}", output.display());
                skipped += 1;
                continue;
            }
            debug!("[PLAN] {} -> {}", source.display(), output.display());
            claimed.insert(key);
            tasks.push(CompressionTask::new(source.to_path_buf(), codec.clone()));
        }

        (tasks, skipped)
    }

    /// Spawn one task on the runtime; the returned future resolves when it
    /// has finished, successfully or not
    fn spawn_task(
        &self,
        task: CompressionTask,
    ) -> impl Future<Output = (TaskLabel, Result<CompressionResult, CompressError>)> {
        let label = TaskLabel {
            program: task.codec.program.clone(),
            extension: task.codec.extension.clone(),
            source_file: task.source_file.clone(),
        };
        let runner = Arc::clone(&self.runner);
        let semaphore = Arc::clone(&self.semaphore);

        let handle = tokio::spawn(async move {
            // Held until the task finishes
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| CompressError::Task(e.to_string()))?;
            task.execute(runner.as_ref()).await
        });

        async move {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(CompressError::Task(join_error.to_string())),
            };
            (label, outcome)
        }
    }

    /// Stampa statistiche finali
    fn print_final_stats(&self, reporter: &Reporter, stats: &RunStats, duration: f64) {
        if self.config.json_output {
            reporter.emit(&JsonMessage::complete(stats, duration));
            return;
        }

        if stats.tasks_planned == 0 {
            info!("Nothing to compress");
            return;
        }

        info!("=== Compression Complete ===");
        info!("{}", stats.format_summary());
        info!("Duration: {:.2}s", duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecSpec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Fake codec: writes a half-size output, optionally after a delay,
    /// and fails for programs listed as missing
    #[derive(Default)]
    struct FakeRunner {
        missing: Vec<String>,
        delay: Duration,
        /// Per-program delay, overriding `delay`
        delays: HashMap<String, Duration>,
        calls: Mutex<Vec<(String, PathBuf)>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeRunner {
        fn missing(programs: &[&str]) -> Self {
            Self {
                missing: programs.iter().map(|p| p.to_string()).collect(),
                ..Default::default()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }

        fn delayed(self, program: &str, delay: Duration) -> Self {
            let mut delays = self.delays;
            delays.insert(program.to_string(), delay);
            Self { delays, ..self }
        }
    }

    impl CodecRunner for FakeRunner {
        async fn run(&self, codec: &CodecSpec, input: &Path) -> Result<(), CompressError> {
            self.calls
                .lock()
                .unwrap()
                .push((codec.program.clone(), input.to_path_buf()));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let delay = self.delays.get(&codec.program).copied().unwrap_or(self.delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let outcome = if self.missing.contains(&codec.program) {
                Err(CompressError::Launch {
                    program: codec.program.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                })
            } else {
                let len = std::fs::metadata(input).map(|m| m.len()).unwrap_or(0) as usize;
                std::fs::write(codec.output_path(input), vec![b'c'; len / 2]).unwrap();
                Ok(())
            };
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn write(root: &Path, relative: &str, size: usize) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, vec![b'a'; size]).unwrap();
        path
    }

    fn config(root: &Path, workers: usize) -> Config {
        Config {
            root_dir: root.to_path_buf(),
            workers,
            json_output: false,
        }
    }

    fn compressor(root: &Path, runner: FakeRunner) -> Compressor<FakeRunner> {
        Compressor::with_runner(config(root, 4), CodecRegistry::default(), runner).unwrap()
    }

    fn calls(compressor: &Compressor<FakeRunner>) -> Vec<(String, PathBuf)> {
        let mut calls = compressor.runner.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }

    #[tokio::test]
    async fn test_existing_output_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let app = write(temp_dir.path(), "app.js", 1000);
        write(temp_dir.path(), "app.js.gz", 10);

        let compressor = compressor(temp_dir.path(), FakeRunner::default());
        let outcome = compressor.execute().await.unwrap();

        assert!(outcome.first_error.is_none());
        assert_eq!(outcome.stats.tasks_planned, 2);
        assert_eq!(outcome.stats.pairs_skipped, 1);
        assert_eq!(
            calls(&compressor),
            vec![("brotli".to_string(), app.clone()), ("zstd".to_string(), app.clone())]
        );
        // pre-existing output untouched
        assert_eq!(std::fs::metadata(temp_dir.path().join("app.js.gz")).unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_extension_filter() {
        let temp_dir = TempDir::new().unwrap();
        let style = write(temp_dir.path(), "style.css", 400);
        write(temp_dir.path(), "readme.md", 400);
        write(temp_dir.path(), "image.png", 400);

        let compressor = compressor(temp_dir.path(), FakeRunner::default());
        let outcome = compressor.execute().await.unwrap();

        assert_eq!(outcome.stats.files_selected, 1);
        assert!(calls(&compressor).iter().all(|(_, path)| path == &style));
        assert_eq!(calls(&compressor).len(), 3);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "index.html", 2048);
        write(temp_dir.path(), "assets/app.js", 4096);

        let first = compressor(temp_dir.path(), FakeRunner::default());
        let outcome = first.execute().await.unwrap();
        assert_eq!(outcome.stats.tasks_completed, 6);

        let second = compressor(temp_dir.path(), FakeRunner::default());
        let outcome = second.execute().await.unwrap();
        assert_eq!(outcome.stats.tasks_planned, 0);
        assert_eq!(outcome.stats.pairs_skipped, 6);
        assert!(calls(&second).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_all_tasks_finish_before_return() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(temp_dir.path(), &format!("chunk-{}.js", i), 512);
        }

        let compressor = compressor(temp_dir.path(), FakeRunner::slow(Duration::from_millis(20)));
        let outcome = compressor.execute().await.unwrap();

        assert_eq!(outcome.stats.tasks_planned, 15);
        assert_eq!(outcome.stats.tasks_completed, 15);
        assert!(outcome.stats.is_finished());
        assert_eq!(compressor.runner.in_flight.load(Ordering::SeqCst), 0);
        for i in 0..5 {
            for ext in ["gz", "br", "zst"] {
                assert!(temp_dir.path().join(format!("chunk-{}.js.{}", i, ext)).exists());
            }
        }
        assert_eq!(outcome.stats.total_original_size, 15 * 512);
        assert_eq!(outcome.stats.total_compressed_size, 15 * 256);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_worker_bound_is_respected() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..6 {
            write(temp_dir.path(), &format!("page-{}.html", i), 128);
        }

        let compressor = Compressor::with_runner(
            config(temp_dir.path(), 2),
            CodecRegistry::default(),
            FakeRunner::slow(Duration::from_millis(15)),
        )
        .unwrap();
        let outcome = compressor.execute().await.unwrap();

        assert_eq!(outcome.stats.tasks_completed, 18);
        let peak = compressor.runner.peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "peak concurrency {} exceeded bound", peak);
        assert!(peak >= 1);
    }

    #[tokio::test]
    async fn test_missing_tool_fails_only_its_tasks() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "app.js", 1000);
        write(temp_dir.path(), "style.css", 1000);

        let compressor = compressor(temp_dir.path(), FakeRunner::missing(&["brotli"]));
        let outcome = compressor.execute().await.unwrap();

        assert_eq!(outcome.stats.tasks_planned, 6);
        assert_eq!(outcome.stats.tasks_completed, 4);
        assert_eq!(outcome.stats.tasks_failed, 2);
        assert!(matches!(
            outcome.first_error,
            Some(CompressError::Launch { ref program, .. }) if program == "brotli"
        ));
        assert!(temp_dir.path().join("app.js.zst").exists());
        assert!(!temp_dir.path().join("app.js.br").exists());

        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.to_string(), "2 of 6 compression tasks failed");
    }

    #[tokio::test]
    async fn test_empty_tree_runs_nothing() {
        let temp_dir = TempDir::new().unwrap();

        let compressor = compressor(temp_dir.path(), FakeRunner::default());
        let stats = compressor.run().await.unwrap();

        assert_eq!(stats.tasks_planned, 0);
        assert_eq!(stats.files_selected, 0);
        assert!(calls(&compressor).is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_fails_before_scheduling() {
        let temp_dir = TempDir::new().unwrap();

        let compressor = compressor(&temp_dir.path().join("dist"), FakeRunner::default());
        assert!(matches!(
            compressor.execute().await,
            Err(CompressError::Traversal { .. })
        ));
        assert!(calls(&compressor).is_empty());
    }

    #[tokio::test]
    async fn test_plan_file_claims_each_pair_once() {
        let temp_dir = TempDir::new().unwrap();
        let app = write(temp_dir.path(), "app.js", 10);

        let compressor = compressor(temp_dir.path(), FakeRunner::default());
        let mut claimed = HashSet::new();

        let (first, skipped) = compressor.plan_file(&app, &mut claimed).await;
        assert_eq!(first.len(), 3);
        assert_eq!(skipped, 0);
        let extensions: Vec<&str> = first.iter().map(|t| t.codec.extension.as_str()).collect();
        assert_eq!(extensions, vec!["gz", "br", "zst"]);

        let (second, _) = compressor.plan_file(&app, &mut claimed).await;
        assert!(second.is_empty());
    }

    fn captured(compressor: Compressor<FakeRunner>) -> (Compressor<FakeRunner>, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let compressor = compressor.with_sink(ReportSink::Captured(Arc::clone(&lines)));
        (compressor, lines)
    }

    fn line_programs(lines: &Mutex<Vec<String>>) -> Vec<String> {
        lines
            .lock()
            .unwrap()
            .iter()
            .map(|line| line.trim_start_matches("error: ").split(':').next().unwrap().to_string())
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lines_follow_completion_order() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "app.js", 2048);

        let runner = FakeRunner::default().delayed("gzip", Duration::from_millis(150));
        let (compressor, lines) = captured(compressor(temp_dir.path(), runner));
        let outcome = compressor.execute().await.unwrap();

        assert_eq!(outcome.stats.tasks_completed, 3);
        let programs = line_programs(&lines);
        assert_eq!(programs.len(), 3);
        // registry order is gz, br, zst but the slow gzip reports last
        assert_eq!(programs[2], "gzip");
        let mut fast = programs[..2].to_vec();
        fast.sort();
        assert_eq!(fast, vec!["brotli".to_string(), "zstd".to_string()]);
        assert!(lines.lock().unwrap()[2].starts_with("gzip: "));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_first_error_is_first_to_finish() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "app.js", 2048);

        let runner = FakeRunner::missing(&["gzip", "zstd"]).delayed("gzip", Duration::from_millis(150));
        let (compressor, lines) = captured(compressor(temp_dir.path(), runner));
        let outcome = compressor.execute().await.unwrap();

        assert_eq!(outcome.stats.tasks_failed, 2);
        assert_eq!(outcome.stats.tasks_completed, 1);
        assert!(matches!(
            outcome.first_error,
            Some(CompressError::Launch { ref program, .. }) if program == "zstd"
        ));
        let programs = line_programs(&lines);
        assert_eq!(programs.last().map(String::as_str), Some("gzip"));
        assert!(lines.lock().unwrap().last().unwrap().starts_with("error: gzip: "));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_followed_and_planned_once() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let dist = temp_dir.path().join("dist");
        write(&dist, "a/lib.js", 1000);
        symlink("a", dist.join("b")).unwrap();
        write(temp_dir.path(), "shared/vendor.js", 1000);
        symlink("../shared/vendor.js", dist.join("vendor.js")).unwrap();
        symlink(".", dist.join("loop")).unwrap();

        let compressor = compressor(&dist, FakeRunner::default());
        let outcome = compressor.execute().await.unwrap();

        // a/lib.js and b/lib.js are the same file: one task per codec
        assert!(outcome.first_error.is_none());
        assert_eq!(outcome.stats.tasks_planned, 6);
        assert_eq!(outcome.stats.tasks_completed, 6);
        assert!(dist.join("vendor.js.br").exists());
        assert!(dist.join("a/lib.js.zst").exists());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = Compressor::with_runner(
            config(Path::new("dist"), 0),
            CodecRegistry::default(),
            FakeRunner::default(),
        );
        assert!(matches!(result, Err(CompressError::Validation(_))));
    }
}
