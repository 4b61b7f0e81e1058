use serde::{Deserialize, Serialize};

/// The five daily prayer times of a masjid, as "HH:MM" strings, plus the
/// optional Friday congregational prayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimes {
    pub fajr: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jummah: Option<String>,
}

impl PrayerTimes {
    /// The five daily prayers in chronological order. Jummah is excluded:
    /// it replaces dhuhr on Fridays and never drives status or sorting.
    pub fn daily(&self) -> [(&'static str, &str); 5] {
        [
            ("fajr", self.fajr.as_str()),
            ("dhuhr", self.dhuhr.as_str()),
            ("asr", self.asr.as_str()),
            ("maghrib", self.maghrib.as_str()),
            ("isha", self.isha.as_str()),
        ]
    }

    pub fn time_for(&self, prayer: &str) -> Option<&str> {
        match prayer {
            "fajr" => Some(self.fajr.as_str()),
            "dhuhr" => Some(self.dhuhr.as_str()),
            "asr" => Some(self.asr.as_str()),
            "maghrib" => Some(self.maghrib.as_str()),
            "isha" => Some(self.isha.as_str()),
            "jummah" => self.jummah.as_deref(),
            _ => None,
        }
    }

    /// Names of the prayers whose time differs in `requested`.
    pub fn changed_from(&self, requested: &PrayerTimes) -> Vec<&'static str> {
        let mut changed = Vec::new();
        for ((name, old), (_, new)) in self.daily().iter().zip(requested.daily().iter()) {
            if old != new {
                changed.push(*name);
            }
        }
        if requested.jummah.is_some() && requested.jummah != self.jummah {
            changed.push("jummah");
        }
        changed
    }

    /// Copies only the named prayers from `requested` onto a clone of `self`.
    /// Approval applies per-field so a stale request cannot clobber times
    /// that were corrected in the meantime.
    pub fn with_times_from(&self, requested: &PrayerTimes, names: &[&'static str]) -> PrayerTimes {
        let mut merged = self.clone();
        for name in names {
            match *name {
                "fajr" => merged.fajr = requested.fajr.clone(),
                "dhuhr" => merged.dhuhr = requested.dhuhr.clone(),
                "asr" => merged.asr = requested.asr.clone(),
                "maghrib" => merged.maghrib = requested.maghrib.clone(),
                "isha" => merged.isha = requested.isha.clone(),
                "jummah" => merged.jummah = requested.jummah.clone(),
                _ => {}
            }
        }
        merged
    }
}

impl Default for PrayerTimes {
    fn default() -> Self {
        PrayerTimes {
            fajr: "05:30".to_string(),
            dhuhr: "12:15".to_string(),
            asr: "15:30".to_string(),
            maghrib: "18:10".to_string(),
            isha: "19:25".to_string(),
            jummah: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times() -> PrayerTimes {
        PrayerTimes::default()
    }

    #[test]
    fn no_changes_when_identical() {
        let current = times();
        assert!(current.changed_from(&current.clone()).is_empty());
    }

    #[test]
    fn only_named_fields_are_applied() {
        let current = times();
        let mut requested = times();
        requested.fajr = "05:15".to_string();
        requested.isha = "19:40".to_string();

        let changed = current.changed_from(&requested);
        assert_eq!(changed, vec!["fajr", "isha"]);

        let merged = current.with_times_from(&requested, &changed);
        assert_eq!(merged.fajr, "05:15");
        assert_eq!(merged.isha, "19:40");
        assert_eq!(merged.dhuhr, current.dhuhr);
    }

    #[test]
    fn adding_jummah_counts_as_change() {
        let current = times();
        let mut requested = times();
        requested.jummah = Some("13:00".to_string());

        let changed = current.changed_from(&requested);
        assert_eq!(changed, vec!["jummah"]);
        let merged = current.with_times_from(&requested, &changed);
        assert_eq!(merged.jummah.as_deref(), Some("13:00"));
    }

    #[test]
    fn absent_jummah_in_request_keeps_existing() {
        let mut current = times();
        current.jummah = Some("12:45".to_string());
        let requested = times();

        assert!(current.changed_from(&requested).is_empty());
    }

    #[test]
    fn serde_round_trips_without_jummah() {
        let json = serde_json::to_string(&times()).unwrap();
        assert!(!json.contains("jummah"));
        let back: PrayerTimes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, times());
    }
}
