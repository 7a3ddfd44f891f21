use arrayvec::ArrayVec;

use crate::engine::EngineState;
use crate::types::{Extent, MoveAxis, Point2, Tile, MAX_STACK_DEPTH};

/// Read-only copy of everything a renderer or driver needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StackSnapshot {
    pub tiles: ArrayVec<Tile, MAX_STACK_DEPTH>,
    pub active_slot: usize,
    pub active: Tile,
    pub last_anchor: Point2,
    pub bounds: Extent,
    pub axis: MoveAxis,
    pub state: EngineState,
    pub score: u32,
    pub combo: u32,
    pub best_combo: u32,
    pub high_score: u32,
    pub high_combo: u32,
    pub is_new_record: bool,
    pub active_fragments: usize,
    /// Seconds left before input is accepted again.
    pub cooldown_secs: f32,
}

impl StackSnapshot {
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.active_slot = 0;
        self.active = Tile::new(0, Extent::default(), MoveAxis::Horizontal);
        self.last_anchor = Point2::ORIGIN;
        self.bounds = Extent::default();
        self.axis = MoveAxis::Horizontal;
        self.state = EngineState::Moving;
        self.score = 0;
        self.combo = 0;
        self.best_combo = 0;
        self.high_score = 0;
        self.high_combo = 0;
        self.is_new_record = false;
        self.active_fragments = 0;
        self.cooldown_secs = 0.0;
    }

    pub fn playable(&self) -> bool {
        self.state == EngineState::Moving
    }

    /// Layer of the highest committed tile, or `None` before the first placement.
    pub fn top_layer(&self) -> Option<i32> {
        self.score.checked_sub(1).map(|s| s as i32)
    }
}

impl Default for StackSnapshot {
    fn default() -> Self {
        let mut s = Self {
            tiles: ArrayVec::new(),
            active_slot: 0,
            active: Tile::new(0, Extent::default(), MoveAxis::Horizontal),
            last_anchor: Point2::ORIGIN,
            bounds: Extent::default(),
            axis: MoveAxis::Horizontal,
            state: EngineState::Moving,
            score: 0,
            combo: 0,
            best_combo: 0,
            high_score: 0,
            high_combo: 0,
            is_new_record: false,
            active_fragments: 0,
            cooldown_secs: 0.0,
        };
        s.clear();
        s
    }
}
