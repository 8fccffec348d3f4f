//! Editor application state.
//!
//! [`Editor`] owns the layout together with the interaction state around
//! it: the active tool, the entity selected for editing, an in-progress
//! move and the belt-drawing gesture. Input handlers translate pointer
//! events on grid cells into layout mutations.

use log::debug;

use gridplan_core::catalog::{DeviceKind, ElementKind};
use gridplan_core::entity::{NewDevice, NewPipelineElement};
use gridplan_core::geometry::{GridPosition, GridSize, Rotation};
use gridplan_core::id::{DeviceId, ElementId, PipelineCellId, SegmentId};
use gridplan_core::scene::SceneSnapshot;
use gridplan_core::store::EntityStore;
use gridplan_power::PowerCoverage;
use gridplan_spatial::{Layout, LoadSummary, Occupancy, PlacementError, cells_at};

use crate::config::EditorConfig;
use crate::draw::{DrawState, DrawStep, PipelineDraw};
use crate::error::EditError;

// ---------------------------------------------------------------------------
// Interaction types
// ---------------------------------------------------------------------------

/// What a plain click on the grid does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Pipeline,
    Device(DeviceKind),
    Element(ElementKind),
}

impl Tool {
    /// Tools that drop a new entity on click.
    pub fn is_placement(&self) -> bool {
        matches!(self, Tool::Device(_) | Tool::Element(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Pipeline => "pipeline",
            Tool::Device(_) => "device",
            Tool::Element(_) => "element",
        }
    }
}

/// The entity whose edit actions are offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Device(DeviceId),
    Cell(PipelineCellId),
    Element(ElementId),
}

/// The entity following the pointer until the next click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    Device(DeviceId),
    Element(ElementId),
}

/// Result of [`Editor::click`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    PlacedDevice(DeviceId),
    PlacedElement(ElementId),
    Moved,
    Selected(Option<Selection>),
    Ignored,
}

/// A ghost footprint under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub anchor: GridPosition,
    pub cells: Vec<GridPosition>,
    /// `Ok` when clicking here would succeed.
    pub verdict: Result<(), PlacementError>,
}

impl Preview {
    pub fn is_valid(&self) -> bool {
        self.verdict.is_ok()
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    layout: Layout,
    tool: Tool,
    selection: Option<Selection>,
    moving: Option<MoveTarget>,
    draw: PipelineDraw,
}

impl Editor {
    /// An empty layout at the configured default grid size.
    pub fn new(config: EditorConfig) -> Self {
        let grid = config.grid.default_size();
        Self::with_layout(config, Layout::new(grid))
    }

    pub fn with_layout(config: EditorConfig, layout: Layout) -> Self {
        Self {
            config,
            layout,
            tool: Tool::default(),
            selection: None,
            moving: None,
            draw: PipelineDraw::new(),
        }
    }

    // -- Read access --

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn store(&self) -> &EntityStore {
        self.layout.store()
    }

    pub fn grid(&self) -> GridSize {
        self.layout.grid()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn moving(&self) -> Option<&MoveTarget> {
        self.moving.as_ref()
    }

    pub fn draw_state(&self) -> &DrawState {
        self.draw.state()
    }

    pub fn is_drawing(&self) -> bool {
        self.draw.is_drawing()
    }

    /// Power queries against the current devices.
    pub fn power(&self) -> PowerCoverage<'_> {
        PowerCoverage::from_store(&self.config.power, self.layout.store())
    }

    // -- Tools --

    /// Switch tools. Leaving the pipeline tool ends any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool != Tool::Pipeline {
            self.draw.end();
        }
        debug!("tool set to {tool:?}");
        self.tool = tool;
    }

    /// Left click on `pos`.
    ///
    /// An active move is confirmed first. Otherwise placement tools place
    /// and the select tool selects. Clicks during a drawing gesture are
    /// ignored. A refused click leaves everything unchanged, including an
    /// active move.
    pub fn click(&mut self, pos: GridPosition) -> Result<ClickOutcome, EditError> {
        if self.draw.is_drawing() {
            return Ok(ClickOutcome::Ignored);
        }

        if let Some(target) = self.moving.clone() {
            match &target {
                MoveTarget::Device(id) => {
                    self.layout
                        .try_move_device(id, pos)?
                        .ok_or(EditError::StaleReference)?;
                }
                MoveTarget::Element(id) => {
                    self.layout
                        .try_move_pipeline_element(id, pos)?
                        .ok_or(EditError::StaleReference)?;
                }
            }
            self.moving = None;
            return Ok(ClickOutcome::Moved);
        }

        match self.tool {
            Tool::Device(kind) => {
                let id = self.layout.try_add_device(NewDevice::new(kind, pos))?;
                Ok(ClickOutcome::PlacedDevice(id))
            }
            Tool::Element(kind) => {
                let id = self
                    .layout
                    .try_add_pipeline_element(NewPipelineElement::new(kind, pos))?;
                Ok(ClickOutcome::PlacedElement(id))
            }
            Tool::Select => {
                self.selection = self.entity_at(pos);
                Ok(ClickOutcome::Selected(self.selection.clone()))
            }
            Tool::Pipeline => Ok(ClickOutcome::Ignored),
        }
    }

    /// Right click. Placement tools fall back to select and an active move
    /// is abandoned with the entity left where it was. Returns whether
    /// anything changed.
    pub fn cancel(&mut self) -> bool {
        let mut changed = false;
        if self.tool.is_placement() {
            self.tool = Tool::Select;
            changed = true;
        }
        if let Some(target) = self.moving.take() {
            debug!("move of {target:?} cancelled");
            if matches!(target, MoveTarget::Element(_)) {
                self.selection = None;
            }
            changed = true;
        }
        changed
    }

    /// The entity a select click on `pos` picks: elements sit above belts,
    /// which sit above devices.
    pub fn entity_at(&self, pos: GridPosition) -> Option<Selection> {
        let store = self.layout.store();
        let index = self.layout.index();
        if let Some((id, _)) = index.element_at(pos, None) {
            return Some(Selection::Element(id.clone()));
        }
        if let Some(cell) = store.pipeline_cells().iter().find(|c| c.position() == pos) {
            return Some(Selection::Cell(cell.id.clone()));
        }
        index.device_at(pos).map(|id| Selection::Device(id.clone()))
    }

    // -- Belt drawing --

    pub fn pointer_down(&mut self, pos: GridPosition) -> Result<DrawStep, EditError> {
        if self.tool != Tool::Pipeline {
            return Err(EditError::WrongTool(Tool::Pipeline.name()));
        }
        match self.draw.begin(&mut self.layout, pos) {
            DrawStep::Ignored if !self.draw.is_drawing() => Err(EditError::NotDrawable(pos)),
            step => Ok(step),
        }
    }

    pub fn pointer_move(&mut self, pos: GridPosition) -> DrawStep {
        if self.tool != Tool::Pipeline {
            return DrawStep::Ignored;
        }
        self.draw.extend(&mut self.layout, pos)
    }

    pub fn pointer_up(&mut self) -> DrawStep {
        self.draw.end()
    }

    pub fn pointer_leave(&mut self) -> DrawStep {
        self.draw.end()
    }

    // -- Selection and edit actions --

    pub fn select(&mut self, selection: Selection) -> Result<(), EditError> {
        if !self.exists(&selection) {
            return Err(EditError::StaleReference);
        }
        self.selection = Some(selection);
        Ok(())
    }

    /// Let `id` follow the pointer until the next click.
    pub fn begin_move_device(&mut self, id: &DeviceId) -> Result<(), EditError> {
        if self.layout.store().device(id).is_none() {
            return Err(EditError::StaleReference);
        }
        self.draw.end();
        self.moving = Some(MoveTarget::Device(id.clone()));
        self.selection = None;
        Ok(())
    }

    pub fn begin_move_element(&mut self, id: &ElementId) -> Result<(), EditError> {
        if self.layout.store().pipeline_element(id).is_none() {
            return Err(EditError::StaleReference);
        }
        self.draw.end();
        self.moving = Some(MoveTarget::Element(id.clone()));
        self.selection = None;
        Ok(())
    }

    /// Rotate the selected device or element by 90 degrees.
    pub fn rotate_selected(&mut self) -> Result<Rotation, EditError> {
        let rotation = match &self.selection {
            Some(Selection::Device(id)) => self.layout.rotate_device(id),
            Some(Selection::Element(id)) => self.layout.rotate_pipeline_element(id),
            Some(Selection::Cell(_)) => return Err(EditError::WrongSelection),
            None => None,
        };
        rotation.ok_or(EditError::StaleReference)
    }

    /// Delete the selected entity. A selected belt cell is removed alone.
    pub fn delete_selected(&mut self) -> Result<(), EditError> {
        let removed = match self.selection.clone() {
            Some(Selection::Device(id)) => {
                let removed = self.layout.remove_device(&id).is_some();
                if self.moving == Some(MoveTarget::Device(id)) {
                    self.moving = None;
                }
                removed
            }
            Some(Selection::Element(id)) => {
                let removed = self.layout.remove_pipeline_element(&id).is_some();
                if self.moving == Some(MoveTarget::Element(id)) {
                    self.moving = None;
                }
                removed
            }
            Some(Selection::Cell(id)) => match self.layout.remove_pipeline_cell(&id) {
                Some(cell) => {
                    self.end_draw_of(&cell.segment_id);
                    true
                }
                None => false,
            },
            None => false,
        };
        self.selection = None;
        if removed {
            Ok(())
        } else {
            Err(EditError::StaleReference)
        }
    }

    /// Delete every cell of the selected belt cell's segment. Returns the
    /// number of cells removed.
    pub fn delete_selected_segment(&mut self) -> Result<usize, EditError> {
        let Some(selection) = &self.selection else {
            return Err(EditError::StaleReference);
        };
        let Selection::Cell(id) = selection else {
            return Err(EditError::WrongSelection);
        };
        let segment = self
            .layout
            .store()
            .pipeline_cell(id)
            .map(|c| c.segment_id.clone())
            .ok_or(EditError::StaleReference)?;
        let removed = self.layout.remove_segment(&segment);
        self.end_draw_of(&segment);
        self.selection = None;
        Ok(removed.len())
    }

    /// A gesture cannot keep extending a segment whose cells were deleted.
    fn end_draw_of(&mut self, segment: &SegmentId) {
        if self.draw.segment() == Some(segment) {
            self.draw.end();
        }
    }

    fn exists(&self, selection: &Selection) -> bool {
        let store = self.layout.store();
        match selection {
            Selection::Device(id) => store.device(id).is_some(),
            Selection::Cell(id) => store.pipeline_cell(id).is_some(),
            Selection::Element(id) => store.pipeline_element(id).is_some(),
        }
    }

    // -- Grid --

    /// Resize the grid, clamping each side to the configured bounds.
    /// Entities left outside the new grid are kept.
    pub fn set_grid_size(&mut self, cols: u32, rows: u32) -> GridSize {
        let grid = self.config.grid.clamp(cols, rows);
        self.layout.set_grid_size(grid);
        grid
    }

    // -- Previews --

    /// Footprint of the active device tool at `pos`. `None` when another
    /// tool is active or `pos` is off the grid.
    pub fn device_preview(&self, pos: GridPosition) -> Option<Preview> {
        let Tool::Device(kind) = self.tool else {
            return None;
        };
        if !self.grid().contains(pos) {
            return None;
        }
        Some(Preview {
            anchor: pos,
            cells: cells_at(kind, pos),
            verdict: self.layout.check_device(kind, pos, None),
        })
    }

    pub fn element_preview(&self, pos: GridPosition) -> Option<Preview> {
        if !matches!(self.tool, Tool::Element(_)) || !self.grid().contains(pos) {
            return None;
        }
        Some(Preview {
            anchor: pos,
            cells: vec![pos],
            verdict: self.layout.check_element(pos, None),
        })
    }

    /// Where the entity being moved would land.
    pub fn move_preview(&self, pos: GridPosition) -> Option<Preview> {
        if !self.grid().contains(pos) {
            return None;
        }
        match self.moving.as_ref()? {
            MoveTarget::Device(id) => {
                let device = self.layout.store().device(id)?;
                let verdict = if device.anchor() == pos {
                    Ok(())
                } else {
                    self.layout.check_device(device.kind, pos, Some(id))
                };
                Some(Preview {
                    anchor: pos,
                    cells: cells_at(device.kind, pos),
                    verdict,
                })
            }
            MoveTarget::Element(id) => {
                let element = self.layout.store().pipeline_element(id)?;
                let verdict = if element.position() == pos {
                    Ok(())
                } else {
                    self.layout.check_element(pos, Some(id))
                };
                Some(Preview {
                    anchor: pos,
                    cells: vec![pos],
                    verdict,
                })
            }
        }
    }

    // -- Whole scene --

    pub fn snapshot(&self) -> SceneSnapshot {
        self.layout.snapshot()
    }

    /// Replace the layout and drop all interaction state.
    pub fn load(&mut self, snapshot: SceneSnapshot) -> LoadSummary {
        self.reset_interaction();
        self.layout.load(snapshot)
    }

    /// Remove every entity, keeping the grid size.
    pub fn clear_all(&mut self) {
        self.reset_interaction();
        self.layout.clear();
        debug!("layout cleared");
    }

    fn reset_interaction(&mut self) {
        self.selection = None;
        self.moving = None;
        self.draw.reset();
    }
}
