//! Depth-limited minimax with alpha-beta pruning for the Gobblet engine.
//!
//! The search is a pair of mutually recursive node functions. Both are
//! parameterized by the one side the whole search optimizes for: the
//! maximize node expands that side's moves, the minimize node expands the
//! opponent's. Leaves (depth exhausted, or no legal moves) are scored with
//! the engine's exact terminal evaluation, not the two-in-a-row heuristic.
//!
//! Everything here is pure and synchronous; each recursive call works on
//! its own copied `GameState`, so sibling branches never alias.

use gobblet_engine::{GameState, Move, Player};

/// Pick the best move for `side`, searching `depth_limit` plies.
///
/// Returns the chosen move and its backed-up value. The move is `None`
/// when `side` has no legal moves or `depth_limit` is 0; callers must not
/// try to apply it. Ties are broken by generation order: the first move to
/// strictly beat the incumbent wins.
pub fn select_move(state: &GameState, side: Player, depth_limit: u32) -> (Option<Move>, i32) {
    max_node(state, side, i32::MIN, i32::MAX, depth_limit)
}

/// Layer favorable to `side`: pick the child maximizing the backed-up value.
fn max_node(
    state: &GameState,
    side: Player,
    mut alpha: i32,
    beta: i32,
    depth: u32,
) -> (Option<Move>, i32) {
    let moves = state.moves(side);
    if depth == 0 || moves.is_empty() {
        return (None, state.score_exact(side));
    }

    let mut best_move = None;
    let mut best_value = i32::MIN;

    for mov in moves {
        let child = state.apply(side, mov).expect("generated move must be legal");
        let (_, value) = min_node(&child, side, alpha, beta, depth - 1);

        if value > best_value {
            best_value = value;
            best_move = Some(mov);
        }

        alpha = alpha.max(value);
        if beta <= alpha {
            break;
        }
    }

    (best_move, best_value)
}

/// Layer unfavorable to `side`: the opponent moves, minimizing the value.
fn min_node(
    state: &GameState,
    side: Player,
    alpha: i32,
    mut beta: i32,
    depth: u32,
) -> (Option<Move>, i32) {
    let opponent = side.opponent();
    let moves = state.moves(opponent);
    if depth == 0 || moves.is_empty() {
        return (None, state.score_exact(side));
    }

    let mut best_move = None;
    let mut best_value = i32::MAX;

    for mov in moves {
        let child = state.apply(opponent, mov).expect("generated move must be legal");
        let (_, value) = max_node(&child, side, alpha, beta, depth - 1);

        if value < best_value {
            best_value = value;
            best_move = Some(mov);
        }

        beta = beta.min(value);
        if beta <= alpha {
            break;
        }
    }

    (best_move, best_value)
}
