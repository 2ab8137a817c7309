//! Descriptive statistics over the dataset sample
//!
//! Histogram bin counts for the user attributes and review stars. Rendering
//! the histograms is left to the caller.

use crate::error::{RecsysError, Result};
use crate::models::User;
use crate::store::InteractionStore;
use serde::Serialize;

/// Equal-width histogram
///
/// `edges` has `counts.len() + 1` entries. Every bin is half-open except the
/// last, which also includes the maximum value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Bin `values` into `bins` equal-width bins spanning [min, max]
///
/// When every value is identical the range is widened to [v - 0.5, v + 0.5].
/// Non-finite values are ignored.
pub fn histogram(values: &[f64], bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(RecsysError::config("histogram needs at least one bin"));
    }

    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Ok(Histogram {
            edges: Vec::new(),
            counts: Vec::new(),
        });
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let edges = (0..=bins).map(|i| min + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram { edges, counts })
}

/// Histograms of the per-user attributes
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub review_count: Histogram,
    pub average_stars: Histogram,
    pub fans: Histogram,
    pub useful: Histogram,
    pub funny: Histogram,
    pub cool: Histogram,
}

impl UserStats {
    pub fn from_users(users: &[User], bins: usize) -> Result<Self> {
        let column = |f: fn(&User) -> f64| users.iter().map(f).collect::<Vec<_>>();

        Ok(Self {
            review_count: histogram(&column(|u| u.review_count as f64), bins)?,
            average_stars: histogram(&column(|u| u.average_stars as f64), bins)?,
            fans: histogram(&column(|u| u.fans as f64), bins)?,
            useful: histogram(&column(|u| u.useful as f64), bins)?,
            funny: histogram(&column(|u| u.funny as f64), bins)?,
            cool: histogram(&column(|u| u.cool as f64), bins)?,
        })
    }
}

/// Summary of a loaded sample
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub user_count: usize,
    pub business_count: usize,
    pub review_count: usize,
    pub distinct_categories: usize,
    pub users: UserStats,
    pub review_stars: Histogram,
}

impl DatasetStats {
    pub fn compute(store: &InteractionStore, bins: usize) -> Result<Self> {
        let stars: Vec<f64> = store.reviews().iter().map(|r| r.stars as f64).collect();

        Ok(Self {
            user_count: store.users().len(),
            business_count: store.businesses().len(),
            review_count: store.reviews().len(),
            distinct_categories: store.distinct_category_count(),
            users: UserStats::from_users(store.users(), bins)?,
            review_stars: histogram(&stars, bins)?,
        })
    }
}
