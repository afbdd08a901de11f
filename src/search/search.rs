//! The search driver: iterative deepening with aspiration windows around a
//! negamax alpha-beta core (PVS, LMR, null-move pruning, quiescence at the
//! leaves). Trimmed to the named heuristics only — no reverse/futility/
//! late-move pruning or check extensions layered on top.

use crate::board::Position;
use crate::moves::attacks::in_check;
use crate::moves::execute::{make_move, make_null_move, unmake_move, unmake_null_move};
use crate::moves::movegen::{generate_captures, generate_legal};
use crate::moves::types::Move;
use crate::search::context::SearchContext;
use crate::search::eval::evaluate;
use crate::search::ordering::order_moves;
use crate::search::tt::{MATE_SCORE, MATE_THRESHOLD, NodeType, TranspositionTable};
use std::time::{Duration, Instant};

const INF: i32 = 32_000;
const QUIESCENCE_MAX_DEPTH: i32 = 4;
const ASPIRATION_WINDOW: i32 = 50;
const NODE_TIME_CHECK_MASK: u64 = 1023;

/// Mate scores are stored in the TT as distance-from-this-node, not
/// distance-from-root, so a shallower probe with a cached mate still
/// reports the correct distance once adjusted back at the probing ply.
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_hits: u64,
    pub cutoffs: u64,
}

pub struct TimeManager {
    start: Instant,
    limit: Option<Duration>,
    stopped: bool,
}

impl TimeManager {
    pub fn new(limit_ms: Option<u64>) -> Self {
        Self { start: Instant::now(), limit: limit_ms.map(Duration::from_millis), stopped: false }
    }

    #[inline]
    pub fn check(&mut self) {
        if self.stopped {
            return;
        }
        if let Some(limit) = self.limit {
            if self.start.elapsed() >= limit {
                self.stopped = true;
            }
        }
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.stopped
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Capture-only search at the leaves. Sorted by a plain MVV-LVA key; the
/// full move orderer's killer/history machinery isn't meaningful here since
/// quiescence plies don't correspond to the main search's killer table.
fn quiescence(
    pos: &mut Position,
    stats: &mut SearchStats,
    time: &mut TimeManager,
    mut alpha: i32,
    beta: i32,
    qdepth: i32,
) -> i32 {
    stats.nodes += 1;
    stats.qnodes += 1;
    if stats.nodes & NODE_TIME_CHECK_MASK == 0 {
        time.check();
    }
    if time.is_expired() {
        return alpha;
    }

    let stand_pat = evaluate(pos);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }
    if qdepth <= 0 {
        return alpha;
    }

    let mut captures = Vec::with_capacity(32);
    let mut scratch = Vec::with_capacity(64);
    generate_captures(pos, &mut captures, &mut scratch);
    captures.sort_by_cached_key(|mv| {
        let victim = if mv.is_en_passant() {
            crate::piece::PieceType::Pawn.value()
        } else {
            pos.piece_at(mv.to).map(|p| p.kind.value()).unwrap_or(0)
        };
        std::cmp::Reverse(victim * 10 - mv.piece.attacker_rank())
    });

    for mv in captures {
        let undo = make_move(pos, mv);
        let score = -quiescence(pos, stats, time, -beta, -alpha, qdepth - 1);
        unmake_move(pos, undo);

        if time.is_expired() {
            return alpha;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }
    alpha
}

/// Negamax alpha-beta with PVS, LMR, and null-move pruning. Returns the
/// best move found (`None` only on a cancelled or terminal node) and its
/// score from the side-to-move's perspective.
#[allow(clippy::too_many_arguments)]
fn search(
    pos: &mut Position,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    stats: &mut SearchStats,
    time: &mut TimeManager,
    depth: i32,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    allow_null: bool,
) -> (Option<Move>, i32) {
    stats.nodes += 1;
    if stats.nodes & NODE_TIME_CHECK_MASK == 0 {
        time.check();
    }
    if time.is_expired() {
        return (None, 0);
    }

    let key = pos.zobrist();
    let mut hash_move = None;
    if let Some((tt_move, tt_score, tt_depth, tt_bound)) = tt.probe(key) {
        stats.tt_hits += 1;
        hash_move = tt_move;
        if tt_depth as i32 >= depth {
            let adjusted = score_from_tt(tt_score, ply);
            match tt_bound {
                b if b == NodeType::Exact as u8 => return (tt_move, adjusted),
                b if b == NodeType::LowerBound as u8 && adjusted >= beta => return (tt_move, adjusted),
                b if b == NodeType::UpperBound as u8 && adjusted <= alpha => return (tt_move, adjusted),
                _ => {}
            }
        }
    }

    if depth <= 0 {
        return (None, quiescence(pos, stats, time, alpha, beta, QUIESCENCE_MAX_DEPTH));
    }

    let mut legal = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(64);
    generate_legal(pos, &mut legal, &mut scratch);

    if legal.is_empty() {
        let color = pos.side_to_move();
        let score = if in_check(pos, color) { -(MATE_SCORE - ply) } else { 0 };
        return (None, score);
    }

    let side_in_check = in_check(pos, pos.side_to_move());

    if allow_null && depth >= 3 && !side_in_check {
        let undo = make_null_move(pos);
        let (_, s) = search(pos, ctx, tt, stats, time, depth - 1 - 2, ply + 1, -beta, -beta + 1, false);
        unmake_null_move(pos, undo);
        if -s >= beta {
            stats.cutoffs += 1;
            return (None, beta);
        }
    }

    order_moves(&mut legal, pos, ctx, ply as usize, hash_move);

    let mut best_move = None;
    let mut best_score = -INF;
    let original_alpha = alpha;

    for (i, &mv) in legal.iter().enumerate() {
        let undo = make_move(pos, mv);

        let score = if i == 0 {
            let (_, s) = search(pos, ctx, tt, stats, time, depth - 1, ply + 1, -beta, -alpha, true);
            -s
        } else {
            let reduce = depth >= 3 && !mv.is_capture() && i > 3;
            let reduced_depth = (depth - 1) - if reduce { 1 } else { 0 };
            let (_, s) = search(pos, ctx, tt, stats, time, reduced_depth, ply + 1, -alpha - 1, -alpha, true);
            let mut score = -s;
            if score > alpha && score < beta {
                let (_, s2) = search(pos, ctx, tt, stats, time, depth - 1, ply + 1, -beta, -alpha, true);
                score = -s2;
            }
            score
        };

        unmake_move(pos, undo);

        if time.is_expired() {
            return (None, 0);
        }

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        alpha = alpha.max(best_score);
        if alpha >= beta {
            stats.cutoffs += 1;
            if !mv.is_capture() {
                ctx.update_killer(ply as usize, mv);
                ctx.update_history(pos.side_to_move(), mv, depth);
            }
            break;
        }
    }

    let bound = if best_score <= original_alpha {
        NodeType::UpperBound
    } else if best_score >= beta {
        NodeType::LowerBound
    } else {
        NodeType::Exact
    };
    tt.save(key, best_move, score_to_tt(best_score, ply), depth.max(0) as u8, bound as u8);

    (best_move, best_score)
}

fn aspiration_search(
    pos: &mut Position,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    stats: &mut SearchStats,
    time: &mut TimeManager,
    depth: i32,
    previous_score: i32,
) -> (Option<Move>, i32) {
    let mut alpha = previous_score - ASPIRATION_WINDOW;
    let mut beta = previous_score + ASPIRATION_WINDOW;

    loop {
        let (mv, score) = search(pos, ctx, tt, stats, time, depth, 0, alpha, beta, true);
        if time.is_expired() {
            return (None, 0);
        }
        if score <= alpha || score >= beta {
            alpha = -INF;
            beta = INF;
            continue;
        }
        return (mv, score);
    }
}

/// Top-level entry: iterative deepening up to `depth_limit`, bounded by
/// `time_budget_ms` if given, reusing the caller's table and context.
/// Always returns a legal move unless the position has none.
pub fn find_best_move_with(
    pos: &mut Position,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    depth_limit: i32,
    time_budget_ms: Option<u64>,
) -> Option<Move> {
    let mut stats = SearchStats::default();
    let mut time = TimeManager::new(time_budget_ms);

    let mut best: Option<Move> = None;
    let mut score = 0;

    for depth in 1..=depth_limit {
        if time.is_expired() {
            break;
        }
        tt.new_search();
        let (mv, s) = aspiration_search(pos, ctx, tt, &mut stats, &mut time, depth, score);
        if !time.is_expired() {
            if let Some(m) = mv {
                best = Some(m);
                score = s;
            }
        }
        if score.abs() > MATE_THRESHOLD {
            break;
        }
    }

    if best.is_none() {
        let mut legal = Vec::with_capacity(64);
        let mut scratch = Vec::with_capacity(64);
        generate_legal(pos, &mut legal, &mut scratch);
        best = legal.into_iter().next();
    }
    best
}

/// Convenience wrapper for one-off searches that don't need a table or
/// context surviving past this call.
pub fn find_best_move(pos: &mut Position, depth_limit: i32, time_budget_ms: Option<u64>) -> Option<Move> {
    let mut ctx = SearchContext::new();
    let mut tt = TranspositionTable::new();
    find_best_move_with(pos, &mut ctx, &mut tt, depth_limit, time_budget_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::types::{CAPTURE, QUIET_MOVE};
    use crate::piece::PieceType;
    use crate::square::Square;

    #[test]
    fn finds_mate_in_one() {
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let best = find_best_move(&mut pos, 3, Some(2000)).unwrap();
        assert_eq!(best.from, Square::A1);
        assert_eq!(best.to, Square::A8);
    }

    #[test]
    fn finds_free_queen_capture() {
        let mut pos = Position::from_fen("4k3/8/8/8/3q4/8/8/3QK3 w - - 0 1").unwrap();
        let best = find_best_move(&mut pos, 4, Some(2000)).unwrap();
        assert_eq!(best.to, Square::D4);
    }

    #[test]
    fn returns_a_legal_move_from_the_starting_position() {
        let mut pos = Position::new();
        let best = find_best_move(&mut pos, 3, Some(2000)).unwrap();
        let mut legal = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut pos, &mut legal, &mut scratch);
        assert!(legal.contains(&best));
    }

    #[test]
    fn quiescence_resolves_a_hanging_capture() {
        let mut pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut stats = SearchStats::default();
        let mut time = TimeManager::new(Some(1000));
        let score = quiescence(&mut pos, &mut stats, &mut time, -INF, INF, QUIESCENCE_MAX_DEPTH);
        assert!(score > 50);
    }

    #[test]
    fn mate_score_is_encoded_as_distance_from_root() {
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let mut ctx = SearchContext::new();
        let mut tt = TranspositionTable::with_capacity_log2(10);
        let mut stats = SearchStats::default();
        let mut time = TimeManager::new(Some(2000));
        let (_, score) = search(&mut pos, &mut ctx, &mut tt, &mut stats, &mut time, 2, 0, -INF, INF, true);
        assert!(score > MATE_THRESHOLD);
    }

    #[test]
    fn time_budget_of_zero_still_returns_a_move() {
        let mut pos = Position::new();
        let best = find_best_move(&mut pos, 10, Some(0));
        assert!(best.is_some());
    }

    #[allow(dead_code)]
    fn mv(from: Square, to: Square, piece: PieceType, flags: u8) -> Move {
        Move { from, to, piece, promotion: None, flags }
    }

    #[test]
    fn capture_flag_constants_are_distinct() {
        assert_ne!(CAPTURE, QUIET_MOVE);
    }
}
