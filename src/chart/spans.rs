//! One sentence's chart: a cell per span.
//!
//! Spans are half-open word ranges `start..end` with `start < end <= len`.
//! Cells are stored in a triangular vector indexed by `(start, end)`:
//!
//! ```text
//! end=1: [0..1]
//! end=2: [0..2] [1..2]
//! end=3: [0..3] [1..3] [2..3]
//! index(start, end) = end * (end - 1) / 2 + start
//! ```

use super::cell::ChartCell;
use super::factory::ChartCellFactory;
use super::metrics::AdmissionStats;
use crate::{AgendaItem, ChartError, ScoredCategory};

#[derive(Debug)]
pub struct Chart {
    length: usize,
    cells: Vec<ChartCell>,
}

impl Chart {
    /// Start a sentence of `length` words on `factory` and make its cells.
    pub fn new(factory: &mut ChartCellFactory, length: usize) -> Result<Self, ChartError> {
        factory.start_sentence(length)?;
        let cells = (0..length * (length + 1) / 2).map(|_| factory.make()).collect();
        Ok(Chart { length, cells })
    }

    /// Sentence length in words.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    fn index(&self, start: usize, end: usize) -> Result<usize, ChartError> {
        if start >= end || end > self.length {
            return Err(ChartError::SpanOutOfRange { start, end, length: self.length });
        }
        Ok(end * (end - 1) / 2 + start)
    }

    pub fn cell(&self, start: usize, end: usize) -> Result<&ChartCell, ChartError> {
        let index = self.index(start, end)?;
        Ok(&self.cells[index])
    }

    pub fn cell_mut(&mut self, start: usize, end: usize) -> Result<&mut ChartCell, ChartError> {
        let index = self.index(start, end)?;
        Ok(&mut self.cells[index])
    }

    /// Offer `item` to the cell for `start..end`.
    pub fn add(&mut self, start: usize, end: usize, item: AgendaItem) -> Result<bool, ChartError> {
        Ok(self.cell_mut(start, end)?.add(item))
    }

    /// Non-empty cells, narrowest spans first, then by start position.
    pub fn spans(&self) -> impl Iterator<Item = ((usize, usize), &ChartCell)> + '_ {
        (1..=self.length).flat_map(move |width| {
            (0..=self.length - width).filter_map(move |start| {
                let end = start + width;
                let cell = &self.cells[end * (end - 1) / 2 + start];
                (!cell.is_empty()).then_some(((start, end), cell))
            })
        })
    }

    /// Seed the single-word cells from a tagger's output.
    ///
    /// `make_item` turns word `i`'s scored category into the agenda item
    /// offered to cell `i..i+1`; cost and key conventions stay with the
    /// caller. Returns the number of items the cells kept.
    pub fn seed_lexical<F>(&mut self, tags: &[Vec<ScoredCategory>], mut make_item: F) -> Result<usize, ChartError>
    where
        F: FnMut(usize, &ScoredCategory) -> AgendaItem,
    {
        let mut kept = 0;
        for (word, candidates) in tags.iter().enumerate() {
            let cell = self.cell_mut(word, word + 1)?;
            for candidate in candidates {
                if cell.add(make_item(word, candidate)) {
                    kept += 1;
                }
            }
        }
        tracing::trace!(words = tags.len(), kept, "seeded lexical cells");
        Ok(kept)
    }

    /// Admission counters summed over all cells.
    pub fn stats(&self) -> AdmissionStats {
        let mut total = AdmissionStats::default();
        for cell in &self.cells {
            total += cell.stats();
        }
        total
    }
}
