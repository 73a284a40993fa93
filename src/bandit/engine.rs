use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::BanditError;
use crate::model::{Banner, BannerEvent, BannerId, ClickEvent, ViewEvent};

/// Upper-confidence-bound score of one banner.
///
/// `views` must be positive; a banner that was never shown scores
/// `f64::INFINITY` so it always outranks explored ones.
pub fn score(views: u64, clicks: u64, total_clicks: u64) -> f64 {
    if views == 0 {
        return f64::INFINITY;
    }
    let n = views as f64;
    let total = total_clicks.max(1) as f64;
    clicks as f64 / n + (2.0 * total.ln() / n).sqrt()
}

/// Seedable banner selector.
///
/// Shared across concurrent requests by reference; the random source sits
/// behind a mutex that is held only while drawing an index.
#[derive(Debug)]
pub struct Bandit {
    rng: Mutex<StdRng>,
}

impl Default for Bandit {
    fn default() -> Self {
        Self::new()
    }
}

impl Bandit {
    /// Create a bandit seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create a bandit with a fixed seed (reproducible).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeded when a seed is given, entropy-seeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    /// Pick one candidate with uniform probability.
    pub fn uniform_pick(&self, candidates: &[Banner]) -> Result<Banner, BanditError> {
        if candidates.is_empty() {
            return Err(BanditError::EmptyCandidateSet);
        }
        // A panic while drawing cannot leave the generator half-updated.
        let index = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_range(0..candidates.len());
        Ok(candidates[index].clone())
    }

    /// Pick the best-scoring candidate, breaking ties uniformly at random.
    ///
    /// Every candidate must have at least one view in `views`. History for
    /// banners outside `candidates` is ignored, but every click in `clicks`
    /// counts toward the slot total.
    pub fn ranked_pick(
        &self,
        candidates: &[Banner],
        views: &[ViewEvent],
        clicks: &[ClickEvent],
    ) -> Result<Banner, BanditError> {
        if candidates.is_empty() {
            return Err(BanditError::EmptyCandidateSet);
        }

        let view_counts = count_by_banner(views);
        let click_counts = count_by_banner(clicks);
        let total_clicks = clicks.len() as u64;

        let mut scored: Vec<(&Banner, f64)> = Vec::with_capacity(candidates.len());
        for banner in candidates {
            let shown = view_counts.get(&banner.id).copied().unwrap_or(0);
            if shown == 0 {
                return Err(BanditError::CandidateWithoutHistory(banner.id));
            }
            let clicked = click_counts.get(&banner.id).copied().unwrap_or(0);
            scored.push((banner, score(shown, clicked, total_clicks)));
        }

        let top = top_scored(&scored);
        tracing::trace!(
            candidates = candidates.len(),
            tied = top.len(),
            total_clicks,
            "ranked banners"
        );
        self.uniform_pick(&top)
    }
}

fn count_by_banner<E: BannerEvent>(events: &[E]) -> HashMap<BannerId, u64> {
    let mut counts = HashMap::new();
    for event in events {
        *counts.entry(event.banner_id()).or_insert(0) += 1;
    }
    counts
}

/// Every banner whose score equals the maximum exactly, in input order.
fn top_scored(scored: &[(&Banner, f64)]) -> Vec<Banner> {
    let max = scored
        .iter()
        .map(|(_, score)| *score)
        .fold(f64::NEG_INFINITY, f64::max);
    scored
        .iter()
        .filter(|(_, score)| *score == max)
        .map(|(banner, _)| (*banner).clone())
        .collect()
}
