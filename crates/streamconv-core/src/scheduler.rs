//! Ring-buffered, cache-oblivious row scheduler.
//!
//! Drives a linear chain of filters sink-first: to produce sink row `i`, it
//! walks backward through [`Filter::required_row_range`] to find which rows
//! of each predecessor are missing, produces exactly those (in blocks of the
//! producer's `simultaneous_lines`), and only then calls the sink's
//! `process`. Per the data model, each internal edge is a ring buffer sized
//! to the *downstream* filter's declared `max_buffering` (or a full-plane
//! buffer when the downstream filter is `entire_plane`); this module is the
//! direct generalization of the original `FilterGraph::process` drive loop
//! described in spec.md §4.3.

use crate::buffer::{select_buffer_mask, ImageBuffer, PlaneBuffer, ALL_ONES};
use crate::filter::{Filter, Range, UNBOUNDED};
use crate::filters::FilterKind;

/// One internal edge: the materialized output of `chain[stage]`, addressed
/// as a ring (or full-plane) buffer, plus a cursor tracking how many rows
/// have been produced so far.
struct Edge {
    buffer: ImageBuffer,
    produced_hi: usize,
}

impl Edge {
    fn new(planes: usize, height: usize, row_bytes: usize, mask: usize) -> crate::error::Result<Self> {
        let mut bufs = Vec::with_capacity(planes);
        for _ in 0..planes {
            bufs.push(PlaneBuffer::new(height, row_bytes, mask)?);
        }
        Ok(Edge { buffer: ImageBuffer::new(bufs), produced_hi: 0 })
    }
}

/// Drives `chain` end to end, reading fully-resident `src` and writing fully
/// -resident `dst`, over column window `[col_lo, col_hi)`. `src`/`dst` must
/// already carry the plane count and dimensions the first/last filter in
/// the chain declare.
pub struct Scheduler<'a> {
    chain: &'a [FilterKind],
    ctxs: Vec<Vec<u8>>,
    edges: Vec<Edge>,
}

impl<'a> Scheduler<'a> {
    /// Builds a scheduler for `chain`, allocating one ring edge per internal
    /// stage boundary and one context buffer per filter, initializing each.
    /// `planes` is the plane arity of the segment this chain belongs to (1
    /// for luma-only or GRAY, 2 for a chroma-pair segment, 3 for a unified
    /// RGB/YUV-444 segment) — fixed for the whole segment, per the data
    /// model's "color filters share a single ImageBuffer" invariant.
    pub fn new(chain: &'a [FilterKind], planes: usize) -> crate::error::Result<Self> {
        let mut ctxs = Vec::with_capacity(chain.len());
        for f in chain {
            let mut ctx = vec![0u8; f.context_size()];
            f.init_context(&mut ctx);
            ctxs.push(ctx);
        }

        let mut edges = Vec::with_capacity(chain.len().saturating_sub(1));
        for stage in 0..chain.len().saturating_sub(1) {
            let producer = &chain[stage];
            let consumer = &chain[stage + 1];
            let attrs = producer.image_attributes();
            let consumer_buffering = consumer.max_buffering();
            let mask = if consumer.flags().entire_plane || consumer_buffering == UNBOUNDED {
                ALL_ONES
            } else {
                select_buffer_mask(consumer_buffering)
            };
            let row_bytes = attrs.width * attrs.pixel_type.pixel_size();
            edges.push(Edge::new(planes, attrs.height, row_bytes, mask)?);
        }

        Ok(Scheduler { chain, ctxs, edges })
    }

    /// Runs the full frame: drives the sink over every output row in
    /// `[0, sink_height)`, in steps of its `simultaneous_lines`, within
    /// column window `[col_lo, col_hi)`.
    pub fn run(&mut self, src: &ImageBuffer, dst: &mut ImageBuffer, col_lo: usize, col_hi: usize) {
        let last = self.chain.len() - 1;
        let sink = &self.chain[last];
        let height = sink.image_attributes().height;
        let step = sink.simultaneous_lines();

        if sink.flags().entire_plane {
            self.ensure_produced(last, height, Range::new(col_lo, col_hi), src, dst);
            return;
        }

        let mut i = 0;
        while i < height {
            self.ensure_produced(last, i + step, Range::new(col_lo, col_hi), src, dst);
            i += step;
        }
    }

    /// Ensures `chain[stage]`'s output is produced up to row `hi`, recursing
    /// into predecessors as needed, then (for internal stages) leaves the
    /// result in `self.edges[stage]`.
    fn ensure_produced(
        &mut self,
        stage: usize,
        hi: usize,
        col: Range,
        src: &ImageBuffer,
        dst: &mut ImageBuffer,
    ) {
        let last = self.chain.len() - 1;
        let height = self.chain[stage].image_attributes().height;
        let hi = hi.min(height);

        loop {
            let produced_hi = if stage < last { self.edges[stage].produced_hi } else { 0 };
            if stage < last && produced_hi >= hi {
                break;
            }

            let filter = &self.chain[stage];
            let flags = filter.flags();

            if flags.entire_plane {
                let col_needed = filter.required_col_range(col.lo, col.hi);
                if stage > 0 {
                    self.ensure_produced(stage - 1, self.chain[stage - 1].image_attributes().height, col_needed, src, dst);
                }
                self.process_stage(stage, 0, col.lo, col.hi, src, dst);
                if stage < last {
                    self.edges[stage].produced_hi = height;
                }
                if stage == last {
                    break;
                }
                continue;
            }

            let next_row = if stage < last { self.edges[stage].produced_hi } else { hi - filter.simultaneous_lines() };
            let row_range = filter.required_row_range(next_row);
            let col_needed = filter.required_col_range(col.lo, col.hi);

            if stage > 0 {
                self.ensure_produced(stage - 1, row_range.hi, col_needed, src, dst);
            }

            self.process_stage(stage, next_row, col.lo, col.hi, src, dst);

            if stage < last {
                let s = filter.simultaneous_lines();
                self.edges[stage].produced_hi = (next_row + s).min(height);
            } else {
                break;
            }
        }
    }

    fn process_stage(
        &mut self,
        stage: usize,
        row: usize,
        left: usize,
        right: usize,
        src: &ImageBuffer,
        dst: &mut ImageBuffer,
    ) {
        let last = self.chain.len() - 1;
        let filter = &self.chain[stage];
        let ctx = &mut self.ctxs[stage];

        // `tmp` scratch is reallocated per call; sized to this filter's own
        // declared requirement for the current column window. Reuse across
        // stages would require a shared scratch arena sized to the frame-
        // wide maximum, which `FilterGraph::tmp_size` computes for callers
        // driving the API surface directly (see graph.rs).
        let mut tmp = vec![0u8; filter.tmp_size(left, right)];

        match (stage == 0, stage == last) {
            (true, true) => filter.process(ctx, src, dst, &mut tmp, row, left, right),
            (true, false) => {
                let dst_buf = &mut self.edges[stage].buffer;
                filter.process(ctx, src, dst_buf, &mut tmp, row, left, right);
            }
            (false, true) => {
                let (before, _) = self.edges.split_at(stage);
                let src_buf = &before[stage - 1].buffer;
                filter.process(ctx, src_buf, dst, &mut tmp, row, left, right);
            }
            (false, false) => {
                let (before, after) = self.edges.split_at_mut(stage);
                let src_buf = &before[stage - 1].buffer;
                let dst_buf = &mut after[0].buffer;
                filter.process(ctx, src_buf, dst_buf, &mut tmp, row, left, right);
            }
        }
    }
}
