//! Fleet statistics and store grouping.
//!
//! Everything the dashboard's stat cards, store accordion and signal bars
//! compute from the loaded tablet list lives here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tablet::Tablet;

/// WiFi above this percentage is shown as strong.
const WIFI_STRONG_ABOVE: i64 = 70;
/// WiFi above this percentage is shown as fair.
const WIFI_FAIR_ABOVE: i64 = 40;
/// Battery above this percentage is shown as strong.
const BATTERY_STRONG_ABOVE: i64 = 80;
/// Battery above this percentage is shown as fair.
const BATTERY_FAIR_ABOVE: i64 = 50;

/// Colour band for a battery or WiFi bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalLevel {
    Strong,
    Fair,
    Weak,
}

impl SignalLevel {
    pub fn for_wifi(percent: i64) -> Self {
        Self::banded(percent, WIFI_STRONG_ABOVE, WIFI_FAIR_ABOVE)
    }

    pub fn for_battery(percent: i64) -> Self {
        Self::banded(percent, BATTERY_STRONG_ABOVE, BATTERY_FAIR_ABOVE)
    }

    fn banded(percent: i64, strong_above: i64, fair_above: i64) -> Self {
        if percent > strong_above {
            SignalLevel::Strong
        } else if percent > fair_above {
            SignalLevel::Fair
        } else {
            SignalLevel::Weak
        }
    }
}

/// A store (restaurant branch) that tablets are installed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    pub location: String,
    /// Nominal count from the store listing; the dashboard shows the number
    /// of loaded tablets instead (see [`tablets_in_store`]).
    pub tablet_count: u32,
}

impl Store {
    /// `true` when `needle` (already lower-cased) occurs in the name or location.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.location.to_lowercase().contains(needle)
    }
}

/// Numbers shown on the four stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub total: usize,
    /// Tablets whose screen is powered on.
    pub active: usize,
    /// Mean battery percentage, rounded; 0 for an empty fleet.
    pub average_battery: i64,
    /// Mean WiFi percentage, rounded; 0 for an empty fleet.
    pub average_wifi: i64,
}

impl FleetSummary {
    pub fn from_tablets(tablets: &[Tablet]) -> Self {
        Self {
            total: tablets.len(),
            active: tablets.iter().filter(|t| t.is_on).count(),
            average_battery: rounded_mean(tablets.iter().map(Tablet::battery_percent)),
            average_wifi: rounded_mean(tablets.iter().map(Tablet::wifi_percent)),
        }
    }
}

/// Arithmetic mean rounded to the nearest integer, halves rounding up.
///
/// Returns 0 for an empty input.
pub fn rounded_mean(values: impl Iterator<Item = i64>) -> i64 {
    let (sum, count) = values.fold((0i64, 0usize), |(sum, n), v| (sum.saturating_add(v), n + 1));
    if count == 0 {
        return 0;
    }
    let mean = sum as f64 / count as f64;
    (mean + 0.5).floor() as i64
}

/// Filters stores by a free-text query.
///
/// An empty (or whitespace-only) query returns every store.  Otherwise the
/// query is trimmed and matched case-insensitively against the store name and
/// location.  Tablets are never searched.
pub fn search_stores<'a>(stores: &'a [Store], query: &str) -> Vec<&'a Store> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return stores.iter().collect();
    }
    stores.iter().filter(|s| s.matches(&needle)).collect()
}

/// Tablets installed in `store_id`.
pub fn tablets_in_store<'a>(tablets: &'a [Tablet], store_id: &str) -> Vec<&'a Tablet> {
    tablets
        .iter()
        .filter(|t| t.store_id.as_deref() == Some(store_id))
        .collect()
}

/// One bar of a version or firmware distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub value: String,
    pub count: usize,
    /// `count` as a fraction of the whole fleet (0.0 – 1.0).
    pub share: f64,
}

/// App version distribution across the fleet.
pub fn version_distribution(tablets: &[Tablet]) -> Vec<DistributionEntry> {
    distribution(tablets, |t| &t.version)
}

/// Firmware build distribution across the fleet.
pub fn firmware_distribution(tablets: &[Tablet]) -> Vec<DistributionEntry> {
    distribution(tablets, |t| &t.firmware_build)
}

/// Counts distinct values, most common first (ties broken by value).
fn distribution<F>(tablets: &[Tablet], key: F) -> Vec<DistributionEntry>
where
    F: Fn(&Tablet) -> &String,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tablet in tablets {
        *counts.entry(key(tablet).as_str()).or_default() += 1;
    }

    let total = tablets.len();
    let mut entries: Vec<DistributionEntry> = counts
        .into_iter()
        .map(|(value, count)| DistributionEntry {
            value: value.to_string(),
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    // Stable sort keeps the BTreeMap's ascending value order among equal counts.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

// ── Tests ─────────────────────────────────────────────────────────────────────
