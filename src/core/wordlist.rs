/*!
 * Wordlist queue loading
 *
 * The real-time coordinator consumes wordlists front-to-back for the
 * current target. The queue is rebuilt fresh whenever a new target session
 * starts; it is never shared across targets.
 */

use colored::Colorize;
use std::collections::VecDeque;
use std::path::PathBuf;

use crate::config::AttackConfig;

/// File suffixes that mark cracking artifacts rather than wordlists.
const ARTIFACT_EXTENSIONS: [&str; 5] = [".potfile", ".out", ".log", ".session", ".restore"];

fn is_artifact(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    ARTIFACT_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

fn is_non_empty_file(path: &PathBuf) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Build the wordlist queue for one target session.
///
/// A configured single file takes precedence; otherwise every non-empty
/// regular file in the configured directory is used, sorted
/// lexicographically, excluding pot/log/session artifacts.
pub fn load_wordlist_queue(config: &AttackConfig) -> VecDeque<PathBuf> {
    let mut queue = VecDeque::new();

    if let Some(file) = &config.realtime_wordlist_file {
        if is_non_empty_file(file) {
            queue.push_back(file.clone());
        } else {
            println!(
                "{} Real-time: wordlist file {} not found or empty",
                "[!]".red(),
                file.display()
            );
        }
    } else if let Some(dir) = &config.realtime_wordlist_dir {
        match std::fs::read_dir(dir) {
            Ok(entries) => {
                let mut paths: Vec<PathBuf> = entries
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| {
                        let name = p
                            .file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("")
                            .to_string();
                        !is_artifact(&name) && is_non_empty_file(p)
                    })
                    .collect();
                paths.sort();
                queue.extend(paths);
            }
            Err(e) => {
                println!(
                    "{} Real-time: cannot read wordlist directory {}: {}",
                    "[!]".red(),
                    dir.display(),
                    e
                );
            }
        }
    }

    if queue.is_empty() {
        println!(
            "{} Real-time: no valid wordlists found, real-time cracking disabled for this target",
            "[!]".red()
        );
    }
    queue
}
