//! Rate-proportional process selection.
//!
//! [`SelectionList`] is the direct method's selector: a plain array of
//! process indices scanned front to back. Every selection swaps the
//! chosen process one place toward the front, so processes that fire
//! often drift forward and the expected scan gets shorter. List order
//! never affects which process is chosen with what probability, only
//! how long the scan takes.

use rand::Rng;

use crate::error::{StochError, StochResult};
use crate::process::{ProcIndex, Process};
use crate::rate::Rate;

/// Walk `rates` accumulating until the running sum reaches `threshold`
/// and return the position of the process that crossed it.
///
/// Zero-rate entries are never chosen. If the scan ends short of the
/// threshold by no more than `tolerance * total` (rounding in a cached
/// total), the last positive-rate entry is chosen instead.
pub(crate) fn scan<I>(rates: I, threshold: f64, total: f64, tolerance: f64) -> StochResult<usize>
where
    I: IntoIterator<Item = Rate>,
{
    let mut accumulated = 0.0;
    let mut last_positive = None;
    for (position, rate) in rates.into_iter().enumerate() {
        if rate.is_zero() {
            continue;
        }
        accumulated += rate.value();
        last_positive = Some(position);
        if accumulated >= threshold {
            return Ok(position);
        }
    }
    match last_positive {
        Some(position) if threshold - accumulated <= tolerance * total => Ok(position),
        _ => Err(StochError::SelectionExhausted {
            threshold,
            accumulated,
        }),
    }
}

/// Move-to-front-by-one selection list.
#[derive(Debug, Clone)]
pub struct SelectionList {
    order: Vec<ProcIndex>,
    tolerance: f64,
}

impl SelectionList {
    /// Build the list over `processes`. With `presort`, the initial
    /// order is by descending rate, which gives the heuristic a head
    /// start.
    pub fn new<P: Process>(processes: &[P], presort: bool, tolerance: f64) -> Self {
        let mut entries: Vec<(ProcIndex, Rate)> =
            processes.iter().map(|p| (p.index(), p.rate())).collect();
        if presort {
            // Stable, so equal rates keep index order.
            entries.sort_by(|a, b| b.1.cmp(&a.1));
        }
        SelectionList {
            order: entries.into_iter().map(|(index, _)| index).collect(),
            tolerance,
        }
    }

    /// Current scan order, front first.
    pub fn order(&self) -> &[ProcIndex] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Draw one process with probability `rate / total`.
    ///
    /// `total` must be the true sum of the live rates; a positive
    /// mismatch larger than the rounding tolerance fails with
    /// [`StochError::SelectionExhausted`].
    pub fn select<P, R>(&mut self, processes: &[P], rng: &mut R, total: Rate) -> StochResult<ProcIndex>
    where
        P: Process,
        R: Rng + ?Sized,
    {
        let u: f64 = rng.gen();
        self.select_at(processes, u * total.value(), total)
    }

    /// Select the process whose cumulative-rate interval contains
    /// `threshold`, then promote it one position.
    pub fn select_at<P: Process>(
        &mut self,
        processes: &[P],
        threshold: f64,
        total: Rate,
    ) -> StochResult<ProcIndex> {
        if processes.len() != self.order.len() {
            return Err(StochError::IndexOutOfRange {
                index: ProcIndex::new(processes.len()),
                len: self.order.len(),
            });
        }
        let rates = self
            .order
            .iter()
            .map(|i| processes.get(i.raw()).map_or(Rate::ZERO, |p| p.rate()));
        let position = scan(rates, threshold, total.value(), self.tolerance)?;
        let chosen = self.order[position];
        if position > 0 {
            self.order.swap(position, position - 1);
        }
        Ok(chosen)
    }
}
