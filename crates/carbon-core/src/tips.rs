// SPDX-License-Identifier: Apache-2.0
//! Reduction-tip catalog and sampling.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// One reduction tip with its estimated savings line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TipRecord {
    /// The suggested action.
    pub tip: &'static str,
    /// Rough savings estimate shown alongside the tip.
    pub savings: &'static str,
}

/// The fixed, ordered tip list. Records have no identity beyond content.
pub const REDUCTION_TIPS: &[TipRecord] = &[
    TipRecord {
        tip: "Walk or cycle for short trips",
        savings: "Saves 0.21 kg per km",
    },
    TipRecord {
        tip: "Swap beef for vegetables more often",
        savings: "Up to 6 kg less per meal",
    },
    TipRecord {
        tip: "Switch lights off when leaving a room",
        savings: "Saves 0.78 kg per kWh",
    },
    TipRecord {
        tip: "Bring a reusable bag when shopping",
        savings: "Saves 0.01 kg per trip",
    },
    TipRecord {
        tip: "Take public transport instead of driving",
        savings: "60% less than a car",
    },
    TipRecord {
        tip: "Raise the air-conditioner setpoint by one degree",
        savings: "About 10% less electricity",
    },
    TipRecord {
        tip: "Buy second-hand where you can",
        savings: "Avoids manufacturing emissions",
    },
    TipRecord {
        tip: "Cut down on takeaway packaging",
        savings: "Less single-use waste",
    },
];

/// Draw `k` distinct tips from [`REDUCTION_TIPS`], shuffled.
///
/// Shuffle-and-truncate over the full list, so a single draw never repeats a
/// tip. Callers that cache the sample (the edge cache does, for 300 s) get
/// randomness only as fine-grained as their freshness window.
pub fn sample_tips<R: Rng + ?Sized>(rng: &mut R, k: usize) -> Vec<TipRecord> {
    let mut pool: Vec<TipRecord> = REDUCTION_TIPS.to_vec();
    pool.shuffle(rng);
    pool.truncate(k);
    pool
}
