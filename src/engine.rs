//! The public façade: a single-threaded engine owning its own transposition
//! table and search context across calls, so repeated searches on the same
//! game benefit from a warm table without any shared/concurrent state.

use crate::board::Position;
use crate::moves::types::Move;
use crate::search::context::SearchContext;
use crate::search::eval;
use crate::search::search::find_best_move_with;
use crate::search::tt::TranspositionTable;

/// Owns everything a search needs to run beyond the position itself. One
/// `Engine` is meant to live for an entire game; nothing here is `Send` by
/// design, matching the single-process, single-thread concurrency model.
pub struct Engine {
    table: TranspositionTable,
    context: SearchContext,
}

impl Engine {
    pub fn new() -> Self {
        Self { table: TranspositionTable::new(), context: SearchContext::new() }
    }

    /// Search `position` to `depth`, optionally bounded by `time_budget_ms`.
    /// Reuses the transposition table across calls; killer/history state is
    /// reset so the previous move's heuristics don't leak into this one.
    pub fn find_best_move(
        &mut self,
        position: &mut Position,
        depth: i32,
        time_budget_ms: Option<u64>,
    ) -> Option<Move> {
        self.context.clear();
        find_best_move_with(position, &mut self.context, &mut self.table, depth, time_budget_ms)
    }

    pub fn evaluate(&self, position: &Position) -> i32 {
        eval::evaluate(position)
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.context.clear();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_returns_a_move_from_the_starting_position() {
        let mut engine = Engine::new();
        let mut pos = Position::new();
        let mv = engine.find_best_move(&mut pos, 3, Some(2000));
        assert!(mv.is_some());
    }

    #[test]
    fn engine_reuses_its_table_across_searches() {
        let mut engine = Engine::new();
        let mut pos = Position::new();
        engine.find_best_move(&mut pos, 3, Some(2000));
        let second = engine.find_best_move(&mut pos, 3, Some(2000));
        assert!(second.is_some());
    }
}
