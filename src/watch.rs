//! File system watcher for continuous rebuilds.
//!
//! Monitors the asset tree (templates, pages, static files), the data
//! directories and the config file. Any change triggers a full build.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Event Loop                          │
//! │                                                          │
//! │  ┌──────────┐    ┌──────────┐    ┌────────────────────┐  │
//! │  │ notify   │───▶│ Debouncer│───▶│   build_site()     │  │
//! │  │ events   │    │ (300ms)  │    │  (one at a time)   │  │
//! │  └──────────┘    └──────────┘    └────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Builds run on the watch thread, so events that arrive mid-build wait in
//! the channel and are coalesced into the next rebuild.

use crate::{build::build_site, config::SiteConfig, images, log};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::RecvTimeoutError,
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;
const REBUILD_COOLDOWN_MS: u64 = 800;

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Paths a build writes to itself.
struct Ignored {
    outputs: Vec<PathBuf>,
    image_dir: PathBuf,
}

impl Ignored {
    fn new(config: &SiteConfig) -> Self {
        let mut outputs = vec![config.build.output.clone(), config.staging_dir()];
        outputs.extend(images::generated_dirs(config));
        Self {
            outputs,
            image_dir: config.image_dir(),
        }
    }

    /// Images moved away by the optimizer show up as events on the image
    /// directory right after a build.
    fn contains(&self, path: &Path, in_cooldown: bool) -> bool {
        is_temp_file(path)
            || self.outputs.iter().any(|dir| path.starts_with(dir))
            || (in_cooldown && path.parent() == Some(self.image_dir.as_path()))
    }
}

/// Format path relative to root for log display.
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and rebuild cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_rebuild: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_rebuild: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_rebuild
            .is_some_and(|t| t.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event, ignored: &Ignored) {
        let in_cooldown = self.in_cooldown();
        let before = self.pending.len();
        self.pending.extend(
            event
                .paths
                .into_iter()
                .filter(|path| !ignored.contains(path, in_cooldown)),
        );
        if self.pending.len() > before {
            self.last_event = Some(Instant::now());
        }
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn mark_rebuild(&mut self) {
        self.last_rebuild = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Rebuild the whole site, logging instead of failing.
fn rebuild(config: &SiteConfig, paths: &[PathBuf]) {
    let root = config.get_root();
    match paths {
        [] => {}
        [path] => log!("watch"; "{} changed, rebuilding...", rel_path(path, root)),
        [path, rest @ ..] => log!(
            "watch"; "{} and {} more changed, rebuilding...",
            rel_path(path, root),
            rest.len()
        ),
    }

    if let Err(e) = build_site(config) {
        log!("error"; "build failed, keeping previous output");
        log!("error"; "{e:#}");
    }
    eprintln!(); // Blank line to separate rebuild sessions
}

// =============================================================================
// Watcher Setup
// =============================================================================

/// Directories and files that feed a build.
fn watch_targets(config: &SiteConfig) -> Vec<(PathBuf, RecursiveMode)> {
    let build = &config.build;
    let mut targets: Vec<_> = [
        &build.templates,
        &build.pages,
        &build.static_dir,
        &build.configs,
        &build.models,
        &build.blueprints,
    ]
    .into_iter()
    .map(|dir| (dir.clone(), RecursiveMode::Recursive))
    .collect();
    targets.push((config.config_path.clone(), RecursiveMode::NonRecursive));
    targets
}

fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<()> {
    let root = config.get_root();
    let mut watched = Vec::new();

    for (path, mode) in watch_targets(config) {
        if !path.exists() {
            continue;
        }
        watcher
            .watch(&path, mode)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
        watched.push(rel_path(&path, root));
    }

    log!("watch"; "watching {}", watched.join(", "));
    eprintln!(); // Blank line to separate init logs from change events
    Ok(())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
}

// =============================================================================
// Public API
// =============================================================================

/// Build once, then rebuild on every change until the watcher disconnects.
pub fn watch_for_changes_blocking(config: &SiteConfig) -> Result<()> {
    let mut debouncer = Debouncer::new();
    let ignored = Ignored::new(config);

    if let Err(e) = build_site(config) {
        log!("error"; "initial build failed: {e:#}");
    }
    debouncer.mark_rebuild();

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, config)?;

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => debouncer.add(event, &ignored),
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                rebuild(config, &debouncer.take());
                debouncer.mark_rebuild();
            }
            Err(RecvTimeoutError::Disconnected) => break,
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.config_path = "blueprint.toml".into();
        config.update_path_with_root(Path::new("/site"));
        config
    }

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        event
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/a/post.yaml~")));
        assert!(is_temp_file(Path::new("/a/.post.yaml.swp")));
        assert!(is_temp_file(Path::new("/a/x.tmp")));
        assert!(!is_temp_file(Path::new("/a/post.yaml")));
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(&Event::new(EventKind::Create(CreateKind::File))));
        assert!(is_relevant(&Event::new(EventKind::Modify(ModifyKind::Any))));
        assert!(!is_relevant(&Event::new(EventKind::Remove(RemoveKind::File))));
    }

    #[test]
    fn test_ignored_paths() {
        let config = config();
        let ignored = Ignored::new(&config);

        assert!(ignored.contains(Path::new("/site/dist/index.html"), false));
        assert!(ignored.contains(Path::new("/site/.dist.staging/index.html"), false));
        assert!(ignored.contains(Path::new("/site/assets/static/img/raw/a.png"), false));
        assert!(!ignored.contains(Path::new("/site/assets/static/img/a.png"), false));
        assert!(ignored.contains(Path::new("/site/assets/static/img/a.png"), true));
        assert!(!ignored.contains(Path::new("/site/models/posts.yaml"), true));
    }

    #[test]
    fn test_debouncer_coalesces() {
        let config = config();
        let ignored = Ignored::new(&config);
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.ready());

        let kind = EventKind::Modify(ModifyKind::Any);
        debouncer.add(event(kind, &["/site/models/posts.yaml"]), &ignored);
        debouncer.add(event(kind, &["/site/models/posts.yaml", "/site/dist/a.html"]), &ignored);
        debouncer.add(event(kind, &["/site/assets/templates/post.jinja2"]), &ignored);

        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS));
        assert!(debouncer.ready());
        assert_eq!(
            debouncer.take(),
            vec![
                PathBuf::from("/site/assets/templates/post.jinja2"),
                PathBuf::from("/site/models/posts.yaml"),
            ]
        );
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_debouncer_ignores_only_ignored() {
        let config = config();
        let ignored = Ignored::new(&config);
        let mut debouncer = Debouncer::new();

        debouncer.add(event(EventKind::Create(CreateKind::File), &["/site/dist/x.html"]), &ignored);
        assert!(debouncer.pending.is_empty());
        assert!(debouncer.last_event.is_none());
    }

    #[test]
    fn test_watch_targets() {
        let config = config();
        let targets = watch_targets(&config);
        assert_eq!(targets.len(), 7);
        assert!(targets.iter().any(|(p, _)| p == Path::new("/site/blueprints")));
        assert!(
            targets
                .iter()
                .any(|(p, m)| p == Path::new("/site/blueprint.toml") && *m == RecursiveMode::NonRecursive)
        );
    }
}
