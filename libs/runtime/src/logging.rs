use crate::config::{LoggingConfig, Section};
use parking_lot::Mutex;
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

// -------- level helpers --------

/// Parse a configured level. `off`/`none` disable the sink; unknown values fall back to INFO.
fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// Returns true if target == prefix or target starts with "prefix::"
fn matches_target_prefix(target: &str, prefix: &str) -> bool {
    target == prefix
        || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

// -------- rotating file writer --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriter;
    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Resolve a log file path against `base_dir` (home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Open a size-rotated log file, creating parent directories.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(max_backups)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn writer_for_section(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, max_backups) {
        Ok(w) => Some(w),
        Err(e) => {
            eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

// -------- layer assembly --------

/// Split "default" from explicit subsystem sections, sorted for stable ordering.
fn split_sections(cfg: &LoggingConfig) -> (Option<&Section>, Vec<(&str, &Section)>) {
    let mut named: Vec<(&str, &Section)> = cfg
        .iter()
        .filter(|(k, _)| k.as_str() != DEFAULT_SECTION)
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    named.sort_by(|a, b| a.0.cmp(b.0));
    (cfg.get(DEFAULT_SECTION), named)
}

/// Filter for the catch-all sinks: everything not owned by a named section.
fn default_filter(
    owned: Vec<String>,
    max_level: Level,
) -> FilterFn<impl Fn(&tracing::Metadata<'_>) -> bool> {
    FilterFn::new(move |meta: &tracing::Metadata<'_>| {
        let t = meta.target();
        !owned.iter().any(|p| matches_target_prefix(t, p)) && meta.level() <= &max_level
    })
}

fn console_layer(ansi: bool) -> fmt::Layer<Registry> {
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
}

fn build_layers(cfg: &LoggingConfig, base_dir: &Path, ansi: bool) -> Vec<BoxedLayer> {
    let (default_section, named) = split_sections(cfg);
    let owned: Vec<String> = named.iter().map(|(n, _)| n.to_string()).collect();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    // Console: explicit targets at their own level.
    let mut console_targets = Targets::new().with_default(LevelFilter::OFF);
    for (name, section) in &named {
        if let Some(level) = parse_tracing_level(&section.console_level) {
            console_targets = console_targets.with_target(*name, LevelFilter::from_level(level));
        }
    }
    layers.push(
        console_layer(ansi)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(console_targets)
            .boxed(),
    );

    // Files: one JSON sink per named section that has a file.
    for (name, section) in &named {
        let Some(level) = parse_tracing_level(&section.file_level) else {
            continue;
        };
        if let Some(writer) = writer_for_section(name, section, base_dir) {
            let targets = Targets::new()
                .with_default(LevelFilter::OFF)
                .with_target(*name, LevelFilter::from_level(level));
            layers.push(
                fmt::layer::<Registry>()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(writer)
                    .with_filter(targets)
                    .boxed(),
            );
        }
    }

    // Catch-all sinks from the "default" section.
    if let Some(section) = default_section {
        if let Some(level) = parse_tracing_level(&section.console_level) {
            layers.push(
                console_layer(ansi)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_filter(default_filter(owned.clone(), level))
                    .boxed(),
            );
        }
        if let Some(level) = parse_tracing_level(&section.file_level) {
            if let Some(writer) = writer_for_section(DEFAULT_SECTION, section, base_dir) {
                layers.push(
                    fmt::layer::<Registry>()
                        .json()
                        .with_ansi(false)
                        .with_target(true)
                        .with_level(true)
                        .with_timer(fmt::time::UtcTime::rfc_3339())
                        .with_writer(writer)
                        .with_filter(default_filter(owned, level))
                        .boxed(),
                );
            }
        }
    }

    layers
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: subsystem sections; empty means console-only defaults
/// - `base_dir`: base directory for relative log file paths (usually server.home_dir)
///
/// Safe to call more than once: later calls are ignored.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let ansi = std::io::stdout().is_terminal();
    let layers = build_layers(cfg, base_dir, ansi);
    let _ = Registry::default().with(layers).try_init();
}

fn init_default_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

// =================== tests ===================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_logging_level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level(" Info "), Some(Level::INFO));
        assert_eq!(parse_tracing_level("warn"), Some(Level::WARN));
        assert_eq!(parse_tracing_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("invalid"), Some(Level::INFO));
    }

    #[test]
    fn test_target_prefix_matching() {
        assert!(matches_target_prefix("subscriptions", "subscriptions"));
        assert!(matches_target_prefix(
            "subscriptions::domain::service",
            "subscriptions"
        ));
        assert!(!matches_target_prefix("subscriptions_x", "subscriptions"));
        assert!(!matches_target_prefix("api_ingress", "subscriptions"));
    }

    #[test]
    fn test_split_sections_separates_default() {
        let mut cfg = default_logging_config();
        cfg.insert("sqlx".into(), section("warn", "", "off"));
        cfg.insert("api_ingress".into(), section("info", "logs/api.log", "debug"));

        let (default_section, named) = split_sections(&cfg);
        assert!(default_section.is_some());
        let names: Vec<&str> = named.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["api_ingress", "sqlx"]);
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/other")), abs);
    }

    #[test]
    fn test_create_rotating_writer_at_path_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let mut w = create_rotating_writer_at_path(&p, 128 * 1024, 2).unwrap();
        w.write_all(b"hello\n").unwrap();
        w.flush().unwrap();
        assert!(p.parent().unwrap().exists(), "parent dir must be created");
    }

    #[test]
    fn test_empty_file_disables_sink() {
        let tmp = tempdir().unwrap();
        assert!(writer_for_section("x", &section("info", "  ", "debug"), tmp.path()).is_none());
    }

    #[test]
    fn test_build_layers_counts_sinks() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "logs/all.log", "debug"));
        cfg.insert("api_ingress".into(), section("debug", "logs/api.log", "info"));
        cfg.insert("sqlx".into(), section("warn", "", "debug"));

        // explicit console + api_ingress file + default console + default file
        let layers = build_layers(&cfg, tmp.path(), false);
        assert_eq!(layers.len(), 4);
        assert!(tmp.path().join("logs").is_dir());
    }

    #[test]
    fn test_default_off_produces_only_explicit_console() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("off", "", "off"));
        let layers = build_layers(&cfg, tmp.path(), false);
        assert_eq!(layers.len(), 1);
    }
}
