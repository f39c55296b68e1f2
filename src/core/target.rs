/*!
 * Target model
 *
 * Immutable description of one access point, built from a single
 * airodump-ng CSV record. Encryption classification happens exactly once
 * at construction; WPA3 takes precedence over a simultaneously advertised
 * WPA2 or OWE indicator.
 */

use crate::core::error::InvalidTargetError;

/// WPS lock state as reported by scanning tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WpsState {
    /// AP does not advertise WPS
    None,
    Unlocked,
    Locked,
    Unknown,
}

/// Encryption classification derived from the vendor-reported security
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encryption {
    Open,
    Wep,
    Wpa,
    Wpa2,
    Wpa3,
    Owe,
    /// First whitespace-delimited token of the raw string, truncated to
    /// 4 characters
    Other(String),
}

impl Encryption {
    /// Classify a raw privacy string, e.g. "WPA2 WPA", "WPA3 WPA2", "OPN".
    pub fn classify(privacy: &str) -> Self {
        let privacy = privacy.trim();
        if privacy.contains("WPA3") {
            Encryption::Wpa3
        } else if privacy.contains("OWE") {
            Encryption::Owe
        } else if privacy.contains("WPA2") {
            Encryption::Wpa2
        } else if privacy.contains("WPA") {
            Encryption::Wpa
        } else if privacy.contains("WEP") {
            Encryption::Wep
        } else {
            let first = privacy.split_whitespace().next().unwrap_or("");
            let label: String = first.chars().take(4).collect();
            match label.as_str() {
                "OPN" | "" => Encryption::Open,
                _ => Encryption::Other(label),
            }
        }
    }

    /// WPA family (WPA/WPA2/WPA3). OWE is not part of the family even
    /// though it descends from the WPA3 spec.
    pub fn is_wpa_family(&self) -> bool {
        matches!(self, Encryption::Wpa | Encryption::Wpa2 | Encryption::Wpa3)
    }

    pub fn is_wpa3(&self) -> bool {
        matches!(self, Encryption::Wpa3)
    }

    pub fn label(&self) -> &str {
        match self {
            Encryption::Open => "OPN",
            Encryption::Wep => "WEP",
            Encryption::Wpa => "WPA",
            Encryption::Wpa2 => "WPA2",
            Encryption::Wpa3 => "WPA3",
            Encryption::Owe => "OWE",
            Encryption::Other(label) => label,
        }
    }
}

/// Wi-Fi standard inferred from the maximum reported speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStandard {
    B,
    G,
    N,
    Ac,
    Ax,
    Be,
}

impl WifiStandard {
    fn from_speed(max_mb: u32, has_qos: bool) -> Option<Self> {
        let standard = if max_mb >= 6000 {
            Some(WifiStandard::Be)
        } else if max_mb >= 1200 {
            Some(WifiStandard::Ax)
        } else if max_mb >= 300 {
            Some(WifiStandard::Ac)
        } else if max_mb > 54 {
            Some(WifiStandard::N)
        } else if max_mb > 22 {
            Some(WifiStandard::G)
        } else if max_mb > 0 {
            Some(WifiStandard::B)
        } else {
            None
        };
        // QoS ('e' suffix) on a g-rate AP usually means 802.11n capability
        match standard {
            Some(WifiStandard::G) if has_qos => Some(WifiStandard::N),
            other => other,
        }
    }
}

/// One access point as seen by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub bssid: String,
    pub channel: String,
    pub encryption: Encryption,
    pub power: i32,
    pub beacons: u64,
    pub ivs: u64,
    pub essid: Option<String>,
    pub essid_known: bool,
    pub wps: WpsState,
    pub wifi_standard: Option<WifiStandard>,
    pub decloaked: bool,
    pub clients: Vec<String>,
}

impl Target {
    /// Build a target from one airodump-ng CSV record.
    ///
    /// Field layout (15 columns):
    /// BSSID, first seen, last seen, channel, speed, privacy, cipher,
    /// auth, power, beacons, IVs, LAN IP, ID-length, ESSID, key
    pub fn from_scan_record(fields: &[&str]) -> Result<Self, InvalidTargetError> {
        if fields.len() < 14 {
            return Err(InvalidTargetError::MalformedRecord(format!(
                "expected 15 fields, got {}",
                fields.len()
            )));
        }

        let bssid = fields[0].trim().to_string();
        let channel = fields[3].trim().to_string();
        let encryption = Encryption::classify(fields[5]);

        let speed_str = fields[4].trim();
        let has_qos = speed_str.contains('e');
        let max_mb: u32 = speed_str
            .split('.')
            .next()
            .unwrap_or("")
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0);
        let wifi_standard = WifiStandard::from_speed(max_mb, has_qos);

        let mut power: i32 = fields[8].trim().parse().unwrap_or(0);
        if power < 0 {
            power += 100;
        }
        let beacons: u64 = fields[9].trim().parse().unwrap_or(0);
        let ivs: u64 = fields[10].trim().parse().unwrap_or(0);

        let essid_len: usize = fields[12].trim().parse().unwrap_or(0);
        let raw_essid = fields[13];
        let hidden = raw_essid.trim().is_empty()
            || raw_essid == "\\x00".repeat(essid_len)
            || raw_essid == "x00".repeat(essid_len);
        let (essid, essid_known) = if hidden {
            (None, false)
        } else {
            (Some(raw_essid.to_string()), true)
        };

        let target = Self {
            bssid,
            channel,
            encryption,
            power,
            beacons,
            ivs,
            essid,
            essid_known,
            wps: WpsState::Unknown,
            wifi_standard,
            decloaked: false,
            clients: Vec::new(),
        };
        target.validate()?;
        Ok(target)
    }

    /// Reject scanner artifacts: the "-1" channel sentinel and
    /// broadcast/multicast BSSIDs.
    fn validate(&self) -> Result<(), InvalidTargetError> {
        if self.channel == "-1" {
            return Err(InvalidTargetError::NoChannel);
        }

        let bssid = self.bssid.to_lowercase();
        if bssid == "ff:ff:ff:ff:ff:ff" || bssid == "00:00:00:00:00:00" {
            return Err(InvalidTargetError::BroadcastBssid(self.bssid.clone()));
        }
        if bssid.starts_with("01:00:5e") || bssid.starts_with("01:80:c2") || bssid.starts_with("33:33")
        {
            return Err(InvalidTargetError::MulticastBssid(self.bssid.clone()));
        }
        Ok(())
    }

    /// WPS may be usable: anything but an explicit "no WPS" report.
    pub fn wps_possible(&self) -> bool {
        !matches!(self.wps, WpsState::None)
    }

    /// ESSID for display, falling back to the BSSID when hidden.
    pub fn display_essid(&self) -> String {
        match &self.essid {
            Some(essid) => essid.clone(),
            None => format!("({})", self.bssid),
        }
    }
}

/// Parse an airodump-ng CSV export into targets, silently discarding
/// invalid records (they are scanner artifacts, not errors).
pub fn parse_scan_csv(contents: &str) -> Vec<Target> {
    let mut targets = Vec::new();
    for line in contents.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with("BSSID") || line.starts_with("Station MAC") {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(|f| f.trim_start()).collect();
        // Client rows have fewer columns than AP rows
        if fields.len() < 14 {
            continue;
        }
        if let Ok(target) = Target::from_scan_record(&fields) {
            targets.push(target);
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record<'a>(
        bssid: &'a str,
        channel: &'a str,
        speed: &'a str,
        privacy: &'a str,
        essid: &'a str,
    ) -> Vec<&'a str> {
        vec![
            bssid,
            "2023-01-01 10:00:00",
            "2023-01-01 10:00:05",
            channel,
            speed,
            privacy,
            "CCMP",
            "PSK",
            "-58",
            "2",
            "0",
            "0.0.0.0",
            "9",
            essid,
            "",
        ]
    }

    // =========================================================================
    // Construction & validation
    // =========================================================================

    #[test]
    fn test_target_from_valid_record() {
        let fields = record("AA:BB:CC:DD:EE:FF", "6", "54", "WPA2", "HOME-ABCD");
        let target = Target::from_scan_record(&fields).unwrap();
        assert_eq!(target.bssid, "AA:BB:CC:DD:EE:FF");
        assert_eq!(target.channel, "6");
        assert_eq!(target.encryption, Encryption::Wpa2);
        assert_eq!(target.essid.as_deref(), Some("HOME-ABCD"));
        assert!(target.essid_known);
        // -58 dBm is normalized to a positive quality figure
        assert_eq!(target.power, 42);
    }

    #[test]
    fn test_target_rejects_sentinel_channel() {
        let fields = record("AA:BB:CC:DD:EE:FF", "-1", "54", "WPA2", "Net");
        assert_eq!(
            Target::from_scan_record(&fields),
            Err(InvalidTargetError::NoChannel)
        );
    }

    #[test]
    fn test_target_rejects_broadcast_bssid() {
        let fields = record("FF:FF:FF:FF:FF:FF", "6", "54", "WPA2", "Net");
        assert!(matches!(
            Target::from_scan_record(&fields),
            Err(InvalidTargetError::BroadcastBssid(_))
        ));

        let fields = record("00:00:00:00:00:00", "6", "54", "WPA2", "Net");
        assert!(matches!(
            Target::from_scan_record(&fields),
            Err(InvalidTargetError::BroadcastBssid(_))
        ));
    }

    #[test]
    fn test_target_rejects_multicast_bssid() {
        for bssid in ["01:00:5E:11:22:33", "01:80:C2:00:00:00", "33:33:00:00:00:01"] {
            let fields = record(bssid, "6", "54", "WPA2", "Net");
            assert!(
                matches!(
                    Target::from_scan_record(&fields),
                    Err(InvalidTargetError::MulticastBssid(_))
                ),
                "{} should be rejected as multicast",
                bssid
            );
        }
    }

    #[test]
    fn test_target_rejects_short_record() {
        let fields = vec!["AA:BB:CC:DD:EE:FF", "6"];
        assert!(matches!(
            Target::from_scan_record(&fields),
            Err(InvalidTargetError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_hidden_essid() {
        let fields = record("AA:BB:CC:DD:EE:FF", "6", "54", "WPA2", "");
        let target = Target::from_scan_record(&fields).unwrap();
        assert!(target.essid.is_none());
        assert!(!target.essid_known);
        assert_eq!(target.display_essid(), "(AA:BB:CC:DD:EE:FF)");
    }

    // =========================================================================
    // Encryption classification
    // =========================================================================

    #[test]
    fn test_classify_wpa3_takes_precedence() {
        assert_eq!(Encryption::classify("WPA3 WPA2"), Encryption::Wpa3);
        assert_eq!(Encryption::classify("WPA2 WPA3 OWE"), Encryption::Wpa3);
    }

    #[test]
    fn test_classify_owe_only_without_wpa3() {
        assert_eq!(Encryption::classify("OWE"), Encryption::Owe);
        assert_eq!(Encryption::classify("WPA3 OWE"), Encryption::Wpa3);
    }

    #[test]
    fn test_classify_wpa2_and_wpa() {
        assert_eq!(Encryption::classify("WPA2 WPA"), Encryption::Wpa2);
        assert_eq!(Encryption::classify("WPA"), Encryption::Wpa);
    }

    #[test]
    fn test_classify_wep_and_open() {
        assert_eq!(Encryption::classify("WEP"), Encryption::Wep);
        assert_eq!(Encryption::classify("OPN"), Encryption::Open);
    }

    #[test]
    fn test_classify_fallback_truncates_to_four_chars() {
        assert_eq!(
            Encryption::classify("SOMETHING WEIRD"),
            Encryption::Other("SOME".to_string())
        );
    }

    #[test]
    fn test_wpa_family_membership() {
        assert!(Encryption::Wpa.is_wpa_family());
        assert!(Encryption::Wpa2.is_wpa_family());
        assert!(Encryption::Wpa3.is_wpa_family());
        assert!(!Encryption::Owe.is_wpa_family());
        assert!(!Encryption::Wep.is_wpa_family());
        assert!(!Encryption::Open.is_wpa_family());
    }

    // =========================================================================
    // Wi-Fi standard inference
    // =========================================================================

    #[test]
    fn test_wifi_standard_from_speed() {
        let cases = [
            ("11", Some(WifiStandard::B)),
            ("54", Some(WifiStandard::G)),
            ("144", Some(WifiStandard::N)),
            ("866", Some(WifiStandard::Ac)),
            ("2400", Some(WifiStandard::Ax)),
            ("6500", Some(WifiStandard::Be)),
            ("0", None),
        ];
        for (speed, expected) in cases {
            let fields = record("AA:BB:CC:DD:EE:FF", "6", speed, "WPA2", "Net");
            let target = Target::from_scan_record(&fields).unwrap();
            assert_eq!(target.wifi_standard, expected, "speed {}", speed);
        }
    }

    #[test]
    fn test_qos_suffix_upgrades_g_to_n() {
        let fields = record("AA:BB:CC:DD:EE:FF", "6", "54e", "WPA2", "Net");
        let target = Target::from_scan_record(&fields).unwrap();
        assert_eq!(target.wifi_standard, Some(WifiStandard::N));
    }

    // =========================================================================
    // CSV parsing
    // =========================================================================

    #[test]
    fn test_parse_scan_csv_skips_headers_and_artifacts() {
        let csv = "\
BSSID, First time seen, Last time seen, channel, Speed, Privacy, Cipher, Authentication, Power, # beacons, # IV, LAN IP, ID-length, ESSID, Key
AA:BB:CC:DD:EE:FF, 2023-01-01 10:00:00, 2023-01-01 10:00:05, 6, 54, WPA2, CCMP, PSK, -58, 2, 0, 0.0.0.0, 4, Home,
FF:FF:FF:FF:FF:FF, 2023-01-01 10:00:00, 2023-01-01 10:00:05, 6, 54, WPA2, CCMP, PSK, -58, 2, 0, 0.0.0.0, 4, Junk,
11:22:33:44:55:66, 2023-01-01 10:00:00, 2023-01-01 10:00:05, -1, 54, WPA2, CCMP, PSK, -58, 2, 0, 0.0.0.0, 4, Gone,
";
        let targets = parse_scan_csv(csv);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].bssid, "AA:BB:CC:DD:EE:FF");
    }
}
