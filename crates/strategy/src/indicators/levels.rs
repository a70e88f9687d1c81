use serde::Serialize;

use common::Bar;

use super::{require, IndicatorResult};

/// Support and resistance from clustered local extrema.
///
/// A bar is a resistance candidate when its high is the maximum of the
/// `window` bars on either side (inclusive), and a support candidate when
/// its low is the minimum. Candidates within `tolerance` (relative) of their
/// sorted neighbour merge into one level at their mean.
#[derive(Debug, Clone)]
pub struct SupportResistance {
    pub window: usize,
    pub tolerance: f64,
    pub max_levels: usize,
    pub lookback: usize,
}

/// Levels per side, highest price first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupportResistanceLevels {
    pub resistance: Vec<f64>,
    pub support: Vec<f64>,
}

impl Default for SupportResistance {
    fn default() -> Self {
        Self {
            window: 20,
            tolerance: 0.0005,
            max_levels: 3,
            lookback: 100,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cluster {
    sum: f64,
    count: usize,
    last_value: f64,
    last_touch: usize,
}

impl Cluster {
    fn new(value: f64, index: usize) -> Self {
        Self { sum: value, count: 1, last_value: value, last_touch: index }
    }

    fn level(&self) -> f64 {
        self.sum / self.count as f64
    }
}

impl SupportResistance {
    pub fn compute(&self, bars: &[Bar]) -> IndicatorResult<SupportResistanceLevels> {
        let w = self.window;
        let recent = &bars[bars.len().saturating_sub(self.lookback)..];
        require("support_resistance", 2 * w + 1, recent.len())?;

        let mut highs = Vec::new();
        let mut lows = Vec::new();
        for i in w..recent.len() - w {
            let hood = &recent[i - w..=i + w];
            if hood.iter().all(|b| b.high <= recent[i].high) {
                highs.push((recent[i].high, i));
            }
            if hood.iter().all(|b| b.low >= recent[i].low) {
                lows.push((recent[i].low, i));
            }
        }

        Ok(SupportResistanceLevels {
            resistance: self.most_recent(cluster(highs, self.tolerance)),
            support: self.most_recent(cluster(lows, self.tolerance)),
        })
    }

    fn most_recent(&self, mut clusters: Vec<Cluster>) -> Vec<f64> {
        clusters.sort_by(|a, b| b.last_touch.cmp(&a.last_touch));
        clusters.truncate(self.max_levels);
        let mut levels: Vec<f64> = clusters.iter().map(Cluster::level).collect();
        levels.sort_by(|a, b| b.total_cmp(a));
        levels
    }
}

fn cluster(mut candidates: Vec<(f64, usize)>, tolerance: f64) -> Vec<Cluster> {
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut out: Vec<Cluster> = Vec::new();
    for (value, index) in candidates {
        match out.last_mut() {
            Some(c) if ((value - c.last_value) / c.last_value).abs() < tolerance => {
                c.sum += value;
                c.count += 1;
                c.last_value = value;
                c.last_touch = c.last_touch.max(index);
            }
            _ => out.push(Cluster::new(value, index)),
        }
    }
    out
}

/// Sequential grouping of `values` by relative `tolerance`, ascending.
pub fn cluster_levels(values: &[f64], tolerance: f64) -> Vec<f64> {
    let indexed = values.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    cluster(indexed, tolerance).iter().map(Cluster::level).collect()
}
