//! Draw state and the save/restore stack

use vektor_core::{
    Affine2D, Color, CompositeOperationState, LineCap, LineJoin, Paint, Scissor,
};

use crate::text::FontStyle;

/// Everything `fill`, `stroke` and `text` read when drawing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    pub composite: CompositeOperationState,
    pub shape_anti_alias: bool,
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: f32,
    pub miter_limit: f32,
    pub line_join: LineJoin,
    pub line_cap: LineCap,
    pub alpha: f32,
    pub transform: Affine2D,
    pub scissor: Scissor,
    pub font: FontStyle,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            composite: CompositeOperationState::default(),
            shape_anti_alias: true,
            fill: Paint::color(Color::WHITE),
            stroke: Paint::color(Color::BLACK),
            stroke_width: 1.0,
            miter_limit: 10.0,
            line_join: LineJoin::Miter,
            line_cap: LineCap::Butt,
            alpha: 1.0,
            transform: Affine2D::IDENTITY,
            scissor: Scissor::DISABLED,
            font: FontStyle::default(),
        }
    }
}

/// Bounded LIFO of draw states.
///
/// There is always a current state; `save` pushes a copy of it and `restore`
/// brings the copy back. Saving past the depth limit and restoring the
/// bottom state are ignored.
#[derive(Clone, Debug)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
    max_depth: usize,
}

impl StateStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            current: DrawState::default(),
            saved: Vec::with_capacity(max_depth),
            max_depth: max_depth.max(1),
        }
    }

    pub fn current(&self) -> &DrawState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut DrawState {
        &mut self.current
    }

    /// Number of states, including the current one
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }

    /// Push a copy of the current state; returns `false` at the depth limit
    pub fn save(&mut self) -> bool {
        if self.depth() >= self.max_depth {
            tracing::trace!(depth = self.depth(), "state stack full, save ignored");
            return false;
        }
        self.saved.push(self.current);
        true
    }

    /// Return to the last saved state; returns `false` if nothing was saved
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => {
                tracing::trace!("state stack at bottom, restore ignored");
                false
            }
        }
    }

    /// Reset the current state to defaults
    pub fn reset(&mut self) {
        self.current = DrawState::default();
    }

    /// Drop all saved states and reset to a single default state
    pub fn clear(&mut self) {
        self.saved.clear();
        self.reset();
    }
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new(32)
    }
}
