//! Network quality estimation from client hints.
//!
//! Scores start at 100 and lose a fixed amount per connection tier, with two
//! independent extra penalties when the reported RTT or downlink is worse than
//! the tier's threshold.

use crate::negotiation::hints::{ClientHints, Ect};

/// Deductions applied for one ECT tier.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TierPenalty {
    base: u8,
    rtt_above_ms: u32,
    downlink_below_mbps: f64,
}

const RTT_PENALTY: u8 = 10;
const DOWNLINK_PENALTY: u8 = 5;

impl Ect {
    fn penalty(self) -> Option<TierPenalty> {
        match self {
            Ect::FourG => None,
            Ect::ThreeG => Some(TierPenalty {
                base: 20,
                rtt_above_ms: 835,
                downlink_below_mbps: 0.385,
            }),
            Ect::TwoG => Some(TierPenalty {
                base: 40,
                rtt_above_ms: 1700,
                downlink_below_mbps: 0.06,
            }),
            Ect::Slow2G => Some(TierPenalty {
                base: 60,
                rtt_above_ms: 2400,
                downlink_below_mbps: 0.033,
            }),
        }
    }
}

/// Score the client's network from 0 (save data) to 100 (fast).
pub fn estimate(save_data: bool, ect: Ect, rtt_ms: u32, downlink_mbps: Option<f64>) -> u8 {
    if save_data {
        return 0;
    }

    let Some(tier) = ect.penalty() else {
        return 100;
    };

    let mut score = 100 - tier.base;
    if rtt_ms > tier.rtt_above_ms {
        score -= RTT_PENALTY;
    }
    if downlink_mbps.is_some_and(|dl| dl < tier.downlink_below_mbps) {
        score -= DOWNLINK_PENALTY;
    }
    score
}

impl ClientHints {
    /// Network quality score for these hints.
    pub fn network_quality(&self) -> u8 {
        estimate(self.save_data, self.ect, self.rtt_ms, self.downlink_mbps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_data_short_circuits() {
        for ect in [Ect::Slow2G, Ect::TwoG, Ect::ThreeG, Ect::FourG] {
            assert_eq!(estimate(true, ect, 5000, Some(0.0)), 0);
            assert_eq!(estimate(true, ect, 0, None), 0);
        }
    }

    #[test]
    fn test_fast_tier_has_no_deduction() {
        assert_eq!(estimate(false, Ect::FourG, 10_000, Some(0.0)), 100);
        assert_eq!(estimate(false, Ect::parse("unknown"), 10_000, Some(0.0)), 100);
    }

    #[test]
    fn test_3g_penalties_are_additive() {
        assert_eq!(estimate(false, Ect::ThreeG, 900, Some(0.3)), 65);
        assert_eq!(estimate(false, Ect::ThreeG, 500, Some(0.5)), 80);
        assert_eq!(estimate(false, Ect::ThreeG, 900, Some(0.5)), 70);
        assert_eq!(estimate(false, Ect::ThreeG, 500, Some(0.3)), 75);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(estimate(false, Ect::ThreeG, 835, Some(0.385)), 80);
        assert_eq!(estimate(false, Ect::TwoG, 1700, Some(0.06)), 60);
        assert_eq!(estimate(false, Ect::Slow2G, 2400, Some(0.033)), 40);
    }

    #[test]
    fn test_slow_tiers() {
        assert_eq!(estimate(false, Ect::TwoG, 1701, Some(0.05)), 45);
        assert_eq!(estimate(false, Ect::Slow2G, 2401, Some(0.01)), 25);
    }

    #[test]
    fn test_missing_downlink_never_penalizes() {
        assert_eq!(estimate(false, Ect::TwoG, 0, None), 60);
        assert_eq!(estimate(false, Ect::TwoG, 0, Some(0.0)), 55);
    }
}
