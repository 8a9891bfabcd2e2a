//! Content loading helpers and hot-reload watcher.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::Result;

/// Events from the hot-reload watcher
#[derive(Debug, Clone)]
pub enum HotReloadEvent {
    /// A content file was created or modified
    Changed(PathBuf),
    /// The watcher reported an error
    Error(String),
}

/// All `.toml` files under `dir`, recursively, sorted by path.
///
/// A missing directory yields no files.
pub fn collect_toml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    if !dir.exists() {
        warn!("Content directory does not exist: {:?}", dir);
        return Ok(paths);
    }

    collect_recursive(dir, &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn collect_recursive(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_recursive(&path, paths)?;
        } else if path.extension().map_or(false, |ext| ext == "toml") {
            paths.push(path);
        }
    }
    Ok(())
}

fn is_content_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("toml")
}

/// Watch `data_dir` for content changes.
///
/// Runs the watcher on its own thread and forwards `.toml` changes
/// over the returned channel. The thread exits once the receiver is dropped.
pub fn start_file_watcher(data_dir: &Path) -> Result<mpsc::Receiver<HotReloadEvent>> {
    use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

    let (tx, rx) = mpsc::channel(32);
    let data_dir = data_dir.to_path_buf();

    std::thread::spawn(move || {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = match RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| {
                let _ = notify_tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        ) {
            Ok(w) => w,
            Err(e) => {
                error!("Failed to create file watcher: {}", e);
                let _ = tx.blocking_send(HotReloadEvent::Error(e.to_string()));
                return;
            }
        };

        if let Err(e) = watcher.watch(&data_dir, RecursiveMode::Recursive) {
            error!("Failed to watch content directory {:?}: {}", data_dir, e);
            let _ = tx.blocking_send(HotReloadEvent::Error(e.to_string()));
            return;
        }

        info!("Content hot-reload watcher started for {:?}", data_dir);

        while let Ok(res) = notify_rx.recv() {
            let forwarded = match res {
                Ok(event) => match event.kind {
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => event
                        .paths
                        .into_iter()
                        .filter(|p| is_content_file(p))
                        .all(|p| {
                            info!("Detected change in {:?}, requesting reload", p);
                            tx.blocking_send(HotReloadEvent::Changed(p)).is_ok()
                        }),
                    _ => true,
                },
                Err(e) => tx.blocking_send(HotReloadEvent::Error(e.to_string())).is_ok(),
            };

            if !forwarded {
                // Receiver dropped
                break;
            }
        }
    });

    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_toml_files_recursive_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join("z.toml"), "").unwrap();
        std::fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        std::fs::write(nested.join("c.toml"), "").unwrap();
        std::fs::write(nested.join("script.lua"), "").unwrap();

        let files = collect_toml_files(temp_dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.toml", "b/c.toml", "z.toml"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = collect_toml_files(&temp_dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_content_file_filter() {
        assert!(is_content_file(Path::new("quests/well.toml")));
        assert!(!is_content_file(Path::new("scripts/cond.lua")));
        assert!(!is_content_file(Path::new("quests/.well.toml.swp")));
    }
}
