// Copyright 2024 Resource Models Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Usage statistics of resource models
//!
//! Counters are updated from arbitrary request threads and only use atomic
//! operations. A [`StatisticsSnapshot`] is a consistent-enough copy for
//! display; individual counters may advance while a snapshot is taken.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Right boundaries, in milliseconds, of the mapping duration intervals
///
/// Interval `i` covers `[boundary[i - 1], boundary[i])` with an implicit left
/// boundary of 0 for the first interval. Durations beyond the last boundary
/// count in the last interval.
pub const MAPPING_DURATION_INTERVAL_BOUNDARIES: [u64; 15] =
    [1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384];

const INTERVALS: usize = MAPPING_DURATION_INTERVAL_BOUNDARIES.len();

/// Statistics of a single resource model type
#[derive(Debug)]
pub struct ResourceModelStatistics {
    since: RwLock<DateTime<Utc>>,
    instantiations: AtomicU64,
    mappings: AtomicU64,
    cache_hits: AtomicU64,
    total_mapping_duration: AtomicU64,
    minimum_mapping_duration: AtomicU64,
    maximum_mapping_duration: AtomicU64,
    mapping_duration_frequencies: [AtomicU64; INTERVALS],
}

impl ResourceModelStatistics {
    /// Create empty statistics starting now
    pub fn new() -> Self {
        Self {
            since: RwLock::new(Utc::now()),
            instantiations: AtomicU64::new(0),
            mappings: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            total_mapping_duration: AtomicU64::new(0),
            minimum_mapping_duration: AtomicU64::new(u64::MAX),
            maximum_mapping_duration: AtomicU64::new(0),
            mapping_duration_frequencies: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// Record the creation of a model instance
    pub fn count_instantiation(&self) {
        self.instantiations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed mapping
    pub fn count_mapping(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

        self.mappings.fetch_add(1, Ordering::Relaxed);
        self.total_mapping_duration.fetch_add(millis, Ordering::Relaxed);
        self.minimum_mapping_duration.fetch_min(millis, Ordering::Relaxed);
        self.maximum_mapping_duration.fetch_max(millis, Ordering::Relaxed);
        self.mapping_duration_frequencies[interval_of(millis)].fetch_add(1, Ordering::Relaxed);
    }

    /// Record a model served from a result cache
    pub fn count_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset all counters and restart the collection period
    pub fn reset(&self) {
        *self.since.write() = Utc::now();
        self.instantiations.store(0, Ordering::Relaxed);
        self.mappings.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.total_mapping_duration.store(0, Ordering::Relaxed);
        self.minimum_mapping_duration.store(u64::MAX, Ordering::Relaxed);
        self.maximum_mapping_duration.store(0, Ordering::Relaxed);
        for frequency in &self.mapping_duration_frequencies {
            frequency.store(0, Ordering::Relaxed);
        }
    }

    /// Start of the collection period
    pub fn since(&self) -> DateTime<Utc> {
        *self.since.read()
    }

    /// Number of created instances
    pub fn instantiations(&self) -> u64 {
        self.instantiations.load(Ordering::Relaxed)
    }

    /// Number of completed mappings
    pub fn mappings(&self) -> u64 {
        self.mappings.load(Ordering::Relaxed)
    }

    /// Number of models served from a result cache
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Sum of all mapping durations in milliseconds
    pub fn total_mapping_duration(&self) -> u64 {
        self.total_mapping_duration.load(Ordering::Relaxed)
    }

    /// Average mapping duration in milliseconds
    pub fn average_mapping_duration(&self) -> f64 {
        let mappings = self.mappings();
        if mappings == 0 {
            0.0
        } else {
            self.total_mapping_duration() as f64 / mappings as f64
        }
    }

    /// Shortest mapping duration in milliseconds, 0 without mappings
    pub fn minimum_mapping_duration(&self) -> u64 {
        match self.minimum_mapping_duration.load(Ordering::Relaxed) {
            u64::MAX => 0,
            minimum => minimum,
        }
    }

    /// Longest mapping duration in milliseconds
    pub fn maximum_mapping_duration(&self) -> u64 {
        self.maximum_mapping_duration.load(Ordering::Relaxed)
    }

    /// Number of mappings per duration interval
    pub fn mapping_duration_frequencies(&self) -> [u64; INTERVALS] {
        std::array::from_fn(|i| self.mapping_duration_frequencies[i].load(Ordering::Relaxed))
    }

    /// Median mapping duration in milliseconds, estimated from the duration intervals
    ///
    /// Returns the center of the interval containing the median mapping.
    pub fn mapping_duration_median(&self) -> f64 {
        let frequencies = self.mapping_duration_frequencies();
        let total: u64 = frequencies.iter().sum();
        if total == 0 {
            return 0.0;
        }

        let middle = total.div_ceil(2);
        let mut seen = 0;
        let mut left = 0;
        for (frequency, right) in frequencies.iter().zip(MAPPING_DURATION_INTERVAL_BOUNDARIES) {
            seen += frequency;
            if seen >= middle {
                return (left + right) as f64 / 2.0;
            }
            left = right;
        }
        left as f64
    }

    /// Copy the current values for display
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let mut left = 0;
        let mut frequencies = IndexMap::with_capacity(INTERVALS);
        for (frequency, right) in self
            .mapping_duration_frequencies()
            .into_iter()
            .zip(MAPPING_DURATION_INTERVAL_BOUNDARIES)
        {
            frequencies.insert(format!("[{left}, {right})"), frequency);
            left = right;
        }

        StatisticsSnapshot {
            since: self.since(),
            instantiations: self.instantiations(),
            mappings: self.mappings(),
            cache_hits: self.cache_hits(),
            total_mapping_duration: self.total_mapping_duration(),
            average_mapping_duration: self.average_mapping_duration(),
            minimum_mapping_duration: self.minimum_mapping_duration(),
            maximum_mapping_duration: self.maximum_mapping_duration(),
            mapping_duration_median: self.mapping_duration_median(),
            mapping_duration_frequencies: frequencies,
        }
    }
}

impl Default for ResourceModelStatistics {
    fn default() -> Self {
        Self::new()
    }
}

fn interval_of(millis: u64) -> usize {
    MAPPING_DURATION_INTERVAL_BOUNDARIES
        .iter()
        .position(|boundary| millis < *boundary)
        .unwrap_or(INTERVALS - 1)
}

/// Point-in-time copy of [`ResourceModelStatistics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    /// Start of the collection period
    pub since: DateTime<Utc>,
    /// Created instances
    pub instantiations: u64,
    /// Completed mappings
    pub mappings: u64,
    /// Models served from a result cache
    pub cache_hits: u64,
    /// Total mapping duration (ms)
    pub total_mapping_duration: u64,
    /// Average mapping duration (ms)
    pub average_mapping_duration: f64,
    /// Minimum mapping duration (ms)
    pub minimum_mapping_duration: u64,
    /// Maximum mapping duration (ms)
    pub maximum_mapping_duration: u64,
    /// Estimated median mapping duration (ms)
    pub mapping_duration_median: f64,
    /// Mappings per duration interval, labelled `[left, right)`
    pub mapping_duration_frequencies: IndexMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_assignment() {
        assert_eq!(interval_of(0), 0);
        assert_eq!(interval_of(1), 1);
        assert_eq!(interval_of(3), 2);
        assert_eq!(interval_of(16383), 14);
        assert_eq!(interval_of(1_000_000), 14);
    }

    #[test]
    fn test_mapping_durations() {
        let statistics = ResourceModelStatistics::new();
        assert_eq!(statistics.minimum_mapping_duration(), 0);
        assert_eq!(statistics.mapping_duration_median(), 0.0);

        statistics.count_mapping(Duration::from_millis(3));
        statistics.count_mapping(Duration::from_millis(5));
        statistics.count_mapping(Duration::from_millis(100));

        assert_eq!(statistics.mappings(), 3);
        assert_eq!(statistics.total_mapping_duration(), 108);
        assert_eq!(statistics.average_mapping_duration(), 36.0);
        assert_eq!(statistics.minimum_mapping_duration(), 3);
        assert_eq!(statistics.maximum_mapping_duration(), 100);
        // The median mapping (5 ms) lies in [4, 8)
        assert_eq!(statistics.mapping_duration_median(), 6.0);
    }

    #[test]
    fn test_reset() {
        let statistics = ResourceModelStatistics::new();
        let started = statistics.since();
        statistics.count_instantiation();
        statistics.count_cache_hit();
        statistics.count_mapping(Duration::from_millis(2));

        statistics.reset();

        assert_eq!(statistics.instantiations(), 0);
        assert_eq!(statistics.cache_hits(), 0);
        assert_eq!(statistics.mappings(), 0);
        assert_eq!(statistics.mapping_duration_frequencies(), [0; 15]);
        assert!(statistics.since() >= started);
    }

    #[test]
    fn test_snapshot_labels() {
        let statistics = ResourceModelStatistics::new();
        statistics.count_mapping(Duration::from_micros(200));
        let snapshot = statistics.snapshot();

        let labels: Vec<&String> = snapshot.mapping_duration_frequencies.keys().take(3).collect();
        assert_eq!(labels, vec!["[0, 1)", "[1, 2)", "[2, 4)"]);
        assert_eq!(snapshot.mapping_duration_frequencies["[0, 1)"], 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["mappings"], 1);
        assert!(json.get("mappingDurationFrequencies").is_some());
    }
}
