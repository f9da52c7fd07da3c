//! The per-filter contract: declared capabilities, dependency functions,
//! and the `process` entry point.

use crate::buffer::ImageBuffer;
use crate::format::ImageAttributes;

/// Sentinel used by [`Filter::simultaneous_lines`] / [`Filter::max_buffering`]
/// to mean "unbounded" (required when `entire_plane` is set).
pub const UNBOUNDED: usize = usize::MAX;

/// A half-open row or column interval `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub lo: usize,
    pub hi: usize,
}

impl Range {
    pub const fn new(lo: usize, hi: usize) -> Self {
        Range { lo, hi }
    }

    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }
}

/// Capability flags a filter declares about itself. See the data model for
/// the five contractual invariants these must satisfy (checked by the
/// conformance harness, not at construction time, since they are properties
/// of a filter *kind*, not of one instance's parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterFlags {
    /// The filter carries context between consecutive output rows; rows
    /// must be requested strictly in increasing order, in multiples of
    /// `simultaneous_lines`.
    pub has_state: bool,
    /// Output row `i` depends only on input row `i` (and its column
    /// neighborhood, never its row neighborhood).
    pub same_row: bool,
    /// The filter requires the full input row span regardless of the
    /// requested output columns.
    pub entire_row: bool,
    /// The filter consumes the entire input plane before producing any
    /// output. Implies `entire_row` and forces
    /// `max_buffering() == simultaneous_lines() == UNBOUNDED`.
    pub entire_plane: bool,
    /// Input and output buffers for the same row may alias. Implies `same_row`.
    pub in_place: bool,
    /// The filter operates on all three planes jointly; otherwise luma-only.
    pub color: bool,
}

/// The per-filter interface described in the data model: pure functions of
/// construction parameters, plus the line-granular `process` entry point.
///
/// Default method bodies follow the base-class defaults in the original
/// filter ABI: `required_row_range(i) = [i, i + simultaneous_lines())`,
/// `required_col_range` is the identity, `simultaneous_lines()`/
/// `max_buffering()` are 1, and context/scratch are zero-sized with a
/// no-op `init_context`. Concrete filter kinds override only what differs.
pub trait Filter {
    /// Declared capability flags.
    fn flags(&self) -> FilterFlags;

    /// The `(width, height, pixel_type)` of this filter's output.
    fn image_attributes(&self) -> ImageAttributes;

    /// Output rows produced per `process` call.
    fn simultaneous_lines(&self) -> usize {
        1
    }

    /// Maximum simultaneously resident input rows this filter requires.
    fn max_buffering(&self) -> usize {
        1
    }

    /// Input row interval needed to produce output row `i`.
    fn required_row_range(&self, i: usize) -> Range {
        Range::new(i, i + self.simultaneous_lines())
    }

    /// Input column interval needed to produce output columns `[left, right)`.
    fn required_col_range(&self, left: usize, right: usize) -> Range {
        Range::new(left, right)
    }

    /// Bytes of per-instance scratch state.
    fn context_size(&self) -> usize {
        0
    }

    /// Bytes of per-call scratch needed to produce output columns `[left, right)`.
    fn tmp_size(&self, _left: usize, _right: usize) -> usize {
        0
    }

    /// One-time initialization of per-instance scratch context.
    fn init_context(&self, _ctx: &mut [u8]) {}

    /// Produces output rows `[i, i + simultaneous_lines())` within columns
    /// `[left, right)`, reading only `src` rows `required_row_range(i)` and
    /// columns `required_col_range(left, right)`.
    fn process(
        &self,
        ctx: &mut [u8],
        src: &ImageBuffer,
        dst: &mut ImageBuffer,
        tmp: &mut [u8],
        i: usize,
        left: usize,
        right: usize,
    );
}

/// Validates the flag invariants from the data model (§4.1 invariants 1-3).
/// Used both by the conformance harness and, defensively, by the graph
/// builder when assembling a chain.
pub fn validate_flag_invariants(flags: FilterFlags) -> Result<(), String> {
    if flags.entire_plane && !flags.entire_row {
        return Err("entire_plane requires entire_row".into());
    }
    if flags.in_place && !flags.same_row {
        return Err("in_place requires same_row".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entire_plane_without_entire_row_is_invalid() {
        let flags = FilterFlags { entire_plane: true, ..Default::default() };
        assert!(validate_flag_invariants(flags).is_err());
    }

    #[test]
    fn in_place_without_same_row_is_invalid() {
        let flags = FilterFlags { in_place: true, ..Default::default() };
        assert!(validate_flag_invariants(flags).is_err());
    }

    #[test]
    fn plain_flags_are_valid() {
        assert!(validate_flag_invariants(FilterFlags::default()).is_ok());
    }
}
