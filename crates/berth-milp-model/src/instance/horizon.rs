// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

/// Heuristic used to size the time horizon when an instance file does not
/// state one.
///
/// Published horizons for the column-form benchmark instances bound the
/// *start* of the last ship rather than its completion, so the base value is
/// inflated. The result is only a starting point: formulations always widen
/// it to the smallest horizon in which every ship can complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonPolicy {
    /// Fleets strictly smaller than this use `small_fleet_periods`.
    pub small_fleet_threshold: usize,
    pub small_fleet_periods: i64,
    pub large_fleet_periods: i64,
    /// Multiplier applied to the base horizon.
    pub inflation: f64,
    /// Multiplier applied to `max(arrival + processing)` for instances
    /// without any horizon (open horizon).
    pub open_horizon_factor: f64,
}

impl Default for HorizonPolicy {
    fn default() -> Self {
        Self {
            small_fleet_threshold: 32,
            small_fleet_periods: 168,
            large_fleet_periods: 336,
            inflation: 1.25,
            open_horizon_factor: 1.5,
        }
    }
}

impl HorizonPolicy {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Size-dependent base horizon, inflated by the safety multiplier.
    pub fn synthesize_periods(&self, n_ships: usize) -> i64 {
        let base = if n_ships < self.small_fleet_threshold {
            self.small_fleet_periods
        } else {
            self.large_fleet_periods
        };
        (base as f64 * self.inflation).floor() as i64
    }

    /// Horizon for an instance that carries no horizon at all.
    pub fn open_horizon(&self, latest_release: i64) -> i64 {
        (latest_release as f64 * self.open_horizon_factor).ceil() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_benchmark_convention() {
        let p = HorizonPolicy::default();
        assert_eq!(p.synthesize_periods(10), 210);
        assert_eq!(p.synthesize_periods(31), 210);
        assert_eq!(p.synthesize_periods(32), 420);
        assert_eq!(p.synthesize_periods(100), 420);
    }

    #[test]
    fn test_open_horizon_rounds_up() {
        let p = HorizonPolicy::default();
        assert_eq!(p.open_horizon(10), 15);
        assert_eq!(p.open_horizon(7), 11);
    }

    #[test]
    fn test_custom_policy_is_respected() {
        let p = HorizonPolicy {
            small_fleet_threshold: 5,
            small_fleet_periods: 10,
            large_fleet_periods: 20,
            inflation: 2.0,
            open_horizon_factor: 1.0,
        };
        assert_eq!(p.synthesize_periods(4), 20);
        assert_eq!(p.synthesize_periods(5), 40);
        assert_eq!(p.open_horizon(9), 9);
    }
}
