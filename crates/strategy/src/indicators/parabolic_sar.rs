use common::Bar;

use super::{require, IndicatorResult};

/// Parabolic SAR (Wilder).
///
/// The first two outputs are the raw closes. From the third bar the stop
/// moves toward the extreme point by the acceleration factor, flipping side
/// when price pierces it. The trend state is carried bar to bar.
#[derive(Debug, Clone)]
pub struct ParabolicSar {
    pub af_start: f64,
    pub af_max: f64,
}

#[derive(Debug, Clone, Copy)]
struct SarState {
    sar: f64,
    ep: f64,
    af: f64,
    rising: bool,
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self::new(0.02, 0.2)
    }
}

impl ParabolicSar {
    pub fn new(af_start: f64, af_max: f64) -> Self {
        assert!(af_start > 0.0 && af_max >= af_start, "invalid SAR acceleration");
        Self { af_start, af_max }
    }

    pub fn series(&self, bars: &[Bar]) -> IndicatorResult<Vec<f64>> {
        require("parabolic_sar", 3, bars.len())?;

        let seed = SarState {
            sar: bars[1].close,
            ep: bars[1].close,
            af: self.af_start,
            rising: true,
        };
        let mut out = vec![bars[0].close, bars[1].close];
        out.extend(bars[2..].iter().scan(seed, |state, bar| {
            *state = self.step(*state, bar);
            Some(state.sar)
        }));
        Ok(out)
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorResult<f64> {
        let series = self.series(bars)?;
        Ok(series[series.len() - 1])
    }

    fn step(&self, prev: SarState, bar: &Bar) -> SarState {
        let sar = prev.sar + prev.af * (prev.ep - prev.sar);
        if prev.rising {
            if bar.low < sar {
                SarState { sar: prev.ep, ep: bar.low, af: self.af_start, rising: false }
            } else if bar.high > prev.ep {
                SarState {
                    sar,
                    ep: bar.high,
                    af: (prev.af + self.af_start).min(self.af_max),
                    rising: true,
                }
            } else {
                SarState { sar, ..prev }
            }
        } else if bar.high > sar {
            SarState { sar: prev.ep, ep: bar.high, af: self.af_start, rising: true }
        } else if bar.low < prev.ep {
            SarState {
                sar,
                ep: bar.low,
                af: (prev.af + self.af_start).min(self.af_max),
                rising: false,
            }
        } else {
            SarState { sar, ..prev }
        }
    }
}
