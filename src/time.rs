//! Time management: converts UCI-style time controls into a search budget
//! and evaluates the stop predicates the iterative-deepening driver polls
//! between and during depth iterations.
//!
//! Soft/hard deadlines plus score-stability and score-collapse heuristics,
//! pulled out into an explicit budget formula and five named predicates
//! rather than inlined ad hoc at each call site.

use std::time::{Duration, Instant};

/// The time control offered to a search, mirroring the inputs a UCI `go`
/// command would carry.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeControl {
    /// Time left for the side to move, in milliseconds.
    pub remaining_ms: Option<u64>,
    /// Increment added after each move, in milliseconds.
    pub increment_ms: u64,
    /// Moves remaining until the next time control, if known.
    pub moves_to_go: Option<u32>,
    /// Search exactly this many milliseconds, ignoring the budget formula.
    pub fixed_movetime_ms: Option<u64>,
    /// Stop after this many nodes regardless of time.
    pub node_limit: Option<u64>,
    /// Search until explicitly stopped.
    pub infinite: bool,
}

impl TimeControl {
    #[must_use]
    pub fn infinite() -> Self {
        TimeControl { infinite: true, ..Default::default() }
    }

    #[must_use]
    pub fn movetime(ms: u64) -> Self {
        TimeControl { fixed_movetime_ms: Some(ms), ..Default::default() }
    }
}

/// A single completed iteration's outcome, fed back into the stop
/// predicates as the iterative-deepening driver progresses.
#[derive(Clone, Copy, Debug)]
pub struct IterationOutcome {
    pub depth: u32,
    pub score: i32,
    pub best_move_changed: bool,
}

const DEFAULT_EXPECTED_MOVES: u32 = 30;
const MIN_BUDGET_MS: u64 = 50;

/// Computes a search budget from a [`TimeControl`] plus position-derived
/// adjustment factors, and evaluates the five stop predicates (panic-elapsed,
/// node-cap, score-collapse, stability, budget-exhaustion).
pub struct TimeManager {
    start: Instant,
    budget_ms: u64,
    panic_ms: u64,
    node_limit: Option<u64>,
    infinite: bool,
    score_history: Vec<i32>,
    stability_count: u32,
}

impl TimeManager {
    /// Build a manager for one search. `phase_fraction` is the current game
    /// phase in `[0.0, 1.0]` (1.0 = full middlegame material), `complexity`
    /// is a `[0.5, 1.5]`-ish multiplier derived from the position's legal
    /// move count, and `material_imbalance` is a `[0.8, 1.2]`-ish multiplier
    /// that shortens the budget in heavily lopsided positions.
    #[must_use]
    pub fn new(control: &TimeControl, phase_fraction: f64, complexity: f64, material_imbalance: f64) -> Self {
        if control.infinite {
            return TimeManager {
                start: Instant::now(),
                budget_ms: u64::MAX,
                panic_ms: u64::MAX,
                node_limit: control.node_limit,
                infinite: true,
                score_history: Vec::new(),
                stability_count: 0,
            };
        }

        if let Some(movetime) = control.fixed_movetime_ms {
            return TimeManager {
                start: Instant::now(),
                budget_ms: movetime,
                panic_ms: movetime,
                node_limit: control.node_limit,
                infinite: false,
                score_history: Vec::new(),
                stability_count: 0,
            };
        }

        let remaining = control.remaining_ms.unwrap_or(0);
        let expected_moves = control.moves_to_go.unwrap_or(DEFAULT_EXPECTED_MOVES).max(1) as f64;

        // More time is budgeted in the middlegame (higher phase_fraction),
        // in complex positions with many candidate moves, and when material
        // is roughly level; the position is scaled back otherwise.
        let phase_adjust = 0.85 + 0.3 * phase_fraction;
        let raw = (remaining as f64 / expected_moves + 0.8 * control.increment_ms as f64) * phase_adjust * complexity * material_imbalance;

        let max_budget = (remaining as f64 * 0.95) as u64;
        let budget_ms = (raw.max(0.0) as u64).clamp(MIN_BUDGET_MS.min(max_budget.max(MIN_BUDGET_MS)), max_budget.max(MIN_BUDGET_MS));

        let panic_ms = ((remaining as f64 * 0.10) as u64).min((budget_ms as f64 * 0.20) as u64);

        TimeManager { start: Instant::now(), budget_ms, panic_ms, node_limit: control.node_limit, infinite: false, score_history: Vec::new(), stability_count: 0 }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[must_use]
    pub fn budget_ms(&self) -> u64 {
        self.budget_ms
    }

    /// Record a completed iteration, updating score-drop and stability
    /// bookkeeping used by the stop predicates.
    pub fn record_iteration(&mut self, outcome: IterationOutcome) {
        self.score_history.push(outcome.score);
        if outcome.best_move_changed {
            self.stability_count = 0;
        } else {
            self.stability_count += 1;
        }
    }

    fn consecutive_score_drops(&self) -> u32 {
        let mut drops = 0;
        for window in self.score_history.windows(2).rev() {
            if window[0] - window[1] >= 100 {
                drops += 1;
            } else {
                break;
            }
        }
        drops
    }

    /// Evaluate the five stop predicates: panic-elapsed, node-cap, repeated
    /// score collapse, best-move stability, and plain budget exhaustion.
    #[must_use]
    pub fn should_stop(&self, depth: u32, nodes: u64) -> bool {
        if self.infinite {
            return self.node_limit.is_some_and(|cap| nodes >= cap);
        }

        let elapsed_ms = self.elapsed().as_millis() as u64;

        if elapsed_ms > self.panic_ms && depth > 1 {
            return true;
        }
        if let Some(cap) = self.node_limit {
            if nodes >= cap {
                return true;
            }
        }
        if self.consecutive_score_drops() >= 2 && elapsed_ms as f64 > self.budget_ms as f64 * 0.30 {
            return true;
        }
        if self.stability_count >= 3 && elapsed_ms as f64 > self.budget_ms as f64 * 0.50 {
            return true;
        }
        elapsed_ms >= self.budget_ms
    }
}

/// Estimate a `[0.5, 1.5]` complexity multiplier from a position's legal
/// move count: more options means deeper iterations pay off more slowly,
/// so budget a bit more time.
#[must_use]
pub fn complexity_from_move_count(legal_moves: usize) -> f64 {
    (0.5 + (legal_moves as f64 / 40.0).min(1.0)).clamp(0.5, 1.5)
}

/// Estimate a `[0.8, 1.2]` material-imbalance multiplier: level material
/// gets the full multiplier, lopsided positions get less time since the
/// outcome is already largely decided.
#[must_use]
pub fn material_imbalance_factor(eval_cp: i32) -> f64 {
    let lopsidedness = (eval_cp.unsigned_abs() as f64 / 900.0).min(1.0);
    1.2 - 0.4 * lopsidedness
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_control_never_stops_without_node_cap() {
        let tm = TimeManager::new(&TimeControl::infinite(), 1.0, 1.0, 1.0);
        assert!(!tm.should_stop(5, 10_000_000));
    }

    #[test]
    fn fixed_movetime_budget_matches_input() {
        let tm = TimeManager::new(&TimeControl::movetime(500), 1.0, 1.0, 1.0);
        assert_eq!(tm.budget_ms(), 500);
    }

    #[test]
    fn node_limit_triggers_stop_predicate() {
        let control = TimeControl { node_limit: Some(1000), ..TimeControl::infinite() };
        let tm = TimeManager::new(&control, 1.0, 1.0, 1.0);
        assert!(tm.should_stop(1, 1000));
        assert!(!tm.should_stop(1, 999));
    }

    #[test]
    fn budget_is_clamped_to_95_percent_of_remaining() {
        let control = TimeControl { remaining_ms: Some(1000), increment_ms: 0, moves_to_go: Some(1), ..Default::default() };
        let tm = TimeManager::new(&control, 1.0, 1.0, 1.0);
        assert!(tm.budget_ms() <= 950);
    }

    #[test]
    fn repeated_score_collapse_triggers_stop_after_enough_elapsed_fraction() {
        let control = TimeControl { remaining_ms: Some(100), increment_ms: 0, moves_to_go: Some(1), ..Default::default() };
        let mut tm = TimeManager::new(&control, 1.0, 1.0, 1.0);
        tm.record_iteration(IterationOutcome { depth: 1, score: 100, best_move_changed: true });
        tm.record_iteration(IterationOutcome { depth: 2, score: -50, best_move_changed: true });
        tm.record_iteration(IterationOutcome { depth: 3, score: -200, best_move_changed: true });
        assert!(tm.consecutive_score_drops() >= 2);
    }

    #[test]
    fn complexity_factor_is_bounded() {
        assert!(complexity_from_move_count(0) >= 0.5);
        assert!(complexity_from_move_count(1000) <= 1.5);
    }

    #[test]
    fn material_imbalance_factor_shrinks_with_lopsided_eval() {
        assert!(material_imbalance_factor(0) > material_imbalance_factor(1000));
    }
}
