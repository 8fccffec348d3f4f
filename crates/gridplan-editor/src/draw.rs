//! Interactive belt drawing.
//!
//! A drag gesture lays one segment of pipeline cells. The pointer going down
//! starts the segment, each move onto an adjacent cell extends it, and the
//! pointer going up (or leaving the grid) ends it. Crossing a belt of another
//! segment drops a cross bridge on the shared cell.

use log::{debug, trace};

use gridplan_core::catalog::ElementKind;
use gridplan_core::entity::{NewPipelineCell, NewPipelineElement, PipelineCellPatch};
use gridplan_core::geometry::{Direction, GridPosition};
use gridplan_core::id::{PipelineCellId, SegmentId};
use gridplan_spatial::{Layout, Occupancy};

/// Where the state machine is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing {
        segment: SegmentId,
        last: GridPosition,
        last_cell: PipelineCellId,
    },
}

/// What a single input did to the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawStep {
    Started {
        segment: SegmentId,
        cell: PipelineCellId,
        bridged: bool,
    },
    Extended {
        cell: PipelineCellId,
        bridged: bool,
    },
    /// The pointer returned to a cell of the current segment; drawing
    /// continues from there.
    Reanchored,
    Ignored,
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineDraw {
    state: DrawState,
}

impl PipelineDraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    pub fn segment(&self) -> Option<&SegmentId> {
        match &self.state {
            DrawState::Drawing { segment, .. } => Some(segment),
            DrawState::Idle => None,
        }
    }

    /// Whether a belt may occupy `pos`: on the grid, off devices, and not on
    /// a splitter or merger.
    pub fn is_drawable(layout: &Layout, pos: GridPosition) -> bool {
        let index = layout.index();
        layout.grid().contains(pos)
            && !index.is_cell_occupied_by_device(pos, None)
            && !index.has_blocking_element(pos)
    }

    /// Start a new segment at `pos`. Ignored while already drawing or when
    /// `pos` is not drawable.
    pub fn begin(&mut self, layout: &mut Layout, pos: GridPosition) -> DrawStep {
        if self.is_drawing() || !Self::is_drawable(layout, pos) {
            trace!("draw start at {},{} ignored", pos.col, pos.row);
            return DrawStep::Ignored;
        }

        let segment = layout.allocate_segment_id();
        let bridged = bridge_if_crossing(layout, pos, &segment);
        let cell = layout.add_pipeline_cell(NewPipelineCell {
            position: pos,
            direction: Direction::Right,
            segment_id: segment.clone(),
        });
        debug!("started {segment} at {},{}", pos.col, pos.row);

        self.state = DrawState::Drawing {
            segment: segment.clone(),
            last: pos,
            last_cell: cell.clone(),
        };
        DrawStep::Started {
            segment,
            cell,
            bridged,
        }
    }

    /// Extend the current segment onto `pos`.
    pub fn extend(&mut self, layout: &mut Layout, pos: GridPosition) -> DrawStep {
        let DrawState::Drawing {
            segment,
            last,
            last_cell,
        } = &mut self.state
        else {
            return DrawStep::Ignored;
        };

        if !Self::is_drawable(layout, pos) || !last.is_adjacent(&pos) {
            trace!("draw move to {},{} ignored", pos.col, pos.row);
            return DrawStep::Ignored;
        }

        if let Some(existing) = layout.index().segment_cell_at(pos, segment).cloned() {
            *last = pos;
            *last_cell = existing;
            return DrawStep::Reanchored;
        }

        let direction = Direction::between(*last, pos);
        layout.update_pipeline_cell(last_cell, &PipelineCellPatch::direction(direction));
        let bridged = bridge_if_crossing(layout, pos, segment);
        let cell = layout.add_pipeline_cell(NewPipelineCell {
            position: pos,
            direction,
            segment_id: segment.clone(),
        });
        debug!(
            "extended {segment} to {},{} heading {direction:?}",
            pos.col, pos.row
        );

        *last = pos;
        *last_cell = cell.clone();
        DrawStep::Extended { cell, bridged }
    }

    /// Finish the gesture. Always returns to idle.
    pub fn end(&mut self) -> DrawStep {
        match std::mem::take(&mut self.state) {
            DrawState::Drawing { segment, .. } => {
                debug!("finished {segment}");
                DrawStep::Finished
            }
            DrawState::Idle => DrawStep::Ignored,
        }
    }

    /// Drop any gesture without logging it as finished.
    pub fn reset(&mut self) {
        self.state = DrawState::Idle;
    }
}

/// Add a cross bridge at `pos` if a belt of another segment is already there
/// and no bridge exists yet.
fn bridge_if_crossing(layout: &mut Layout, pos: GridPosition, segment: &SegmentId) -> bool {
    let index = layout.index();
    if !index.has_foreign_segment_cell(pos, segment) || index.has_cross_bridge(pos) {
        return false;
    }
    layout.add_pipeline_element(NewPipelineElement::new(ElementKind::CrossBridge, pos));
    true
}
