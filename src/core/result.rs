/*!
 * Crack result persistence
 *
 * Every recovered credential is appended to a JSON file, deduplicated on
 * everything except the timestamp so re-cracking the same network does not
 * produce duplicate entries.
 */

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// One recovered credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrackResultRecord {
    pub bssid: String,
    pub essid: Option<String>,
    /// Capture artifact the key was recovered from, when one exists
    pub hash_file: Option<PathBuf>,
    pub key: String,
    /// e.g. "WPA", "PMKID", "WPS", "WEP", "PMKID-Realtime", "WPA-Realtime"
    pub attack_label: String,
    pub date: u64,
}

impl CrackResultRecord {
    pub fn new(
        bssid: &str,
        essid: Option<&str>,
        hash_file: Option<&Path>,
        key: &str,
        attack_label: &str,
    ) -> Self {
        Self {
            bssid: bssid.to_string(),
            essid: essid.map(|e| e.to_string()),
            hash_file: hash_file.map(|p| p.to_path_buf()),
            key: key.to_string(),
            attack_label: attack_label.to_string(),
            date: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    fn same_crack(&self, other: &Self) -> bool {
        self.bssid == other.bssid
            && self.essid == other.essid
            && self.key == other.key
            && self.attack_label == other.attack_label
    }

    /// Append this result to the cracked file, skipping exact duplicates
    /// (the date field is ignored for comparison).
    pub fn save(&self, cracked_file: &Path) -> Result<(), String> {
        let mut saved: Vec<CrackResultRecord> = if cracked_file.exists() {
            let text = std::fs::read_to_string(cracked_file)
                .map_err(|e| format!("Failed to read {}: {}", cracked_file.display(), e))?;
            serde_json::from_str(&text).unwrap_or_else(|e| {
                println!(
                    "{} Error loading {}: {}",
                    "[!]".yellow(),
                    cracked_file.display(),
                    e
                );
                Vec::new()
            })
        } else {
            Vec::new()
        };

        if saved.iter().any(|entry| entry.same_crack(self)) {
            println!(
                "{} {} already saved in {}, skipping",
                "[+]".green(),
                self.bssid.cyan(),
                cracked_file.display()
            );
            return Ok(());
        }

        saved.push(self.clone());
        let json = serde_json::to_string_pretty(&saved)
            .map_err(|e| format!("Failed to serialize results: {}", e))?;
        std::fs::write(cracked_file, json)
            .map_err(|e| format!("Failed to write {}: {}", cracked_file.display(), e))?;
        println!(
            "{} Saved crack result to {} ({} total)",
            "[+]".green(),
            cracked_file.display().to_string().cyan(),
            saved.len()
        );
        Ok(())
    }

    /// Load all previously saved results.
    pub fn load_all(cracked_file: &Path) -> Vec<CrackResultRecord> {
        if !cracked_file.exists() {
            return Vec::new();
        }
        std::fs::read_to_string(cracked_file)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(name: &str) -> PathBuf {
        let path = PathBuf::from(format!("/tmp/wifistrike_test_{}.json", name));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = tmp_file("results_rt");
        let record = CrackResultRecord::new(
            "AA:BB:CC:DD:EE:FF",
            Some("HomeNet"),
            Some(Path::new("/tmp/hash.16800")),
            "hunter2",
            "PMKID-Realtime",
        );
        record.save(&path).unwrap();

        let loaded = CrackResultRecord::load_all(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].bssid, "AA:BB:CC:DD:EE:FF");
        assert_eq!(loaded[0].key, "hunter2");
        assert_eq!(loaded[0].attack_label, "PMKID-Realtime");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_deduplicates_ignoring_date() {
        let path = tmp_file("results_dedup");
        let mut first = CrackResultRecord::new(
            "AA:BB:CC:DD:EE:FF",
            Some("HomeNet"),
            None,
            "hunter2",
            "WPA",
        );
        first.date = 1000;
        first.save(&path).unwrap();

        let mut second = first.clone();
        second.date = 2000;
        second.save(&path).unwrap();

        assert_eq!(CrackResultRecord::load_all(&path).len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_appends_distinct_results() {
        let path = tmp_file("results_append");
        CrackResultRecord::new("AA:BB:CC:DD:EE:01", Some("NetA"), None, "pw1", "WPA")
            .save(&path)
            .unwrap();
        CrackResultRecord::new("AA:BB:CC:DD:EE:02", Some("NetB"), None, "pw2", "WPS")
            .save(&path)
            .unwrap();

        assert_eq!(CrackResultRecord::load_all(&path).len(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_all_missing_file() {
        assert!(CrackResultRecord::load_all(Path::new("/tmp/wifistrike_no_results.json")).is_empty());
    }
}
