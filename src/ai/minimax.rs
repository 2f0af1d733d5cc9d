use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::evaluation::{heuristic, terminal_utility};
use crate::game::{legal_moves, GameState, Move, MoveSource};

/// 不限深度的哨兵值。每步都会减少弹珠总数，因此搜索必然终止。
pub const UNBOUNDED_DEPTH: i32 = i32::MAX;
/// 默认搜索深度，与命令行版本一致。
pub const DEFAULT_DEPTH: i32 = 15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_move: Option<Move>,
}

impl SearchResult {
    fn leaf(value: f64) -> Self {
        Self {
            value,
            best_move: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
    pub depth_reached: u32,
}

/// 带 alpha-beta 剪枝的 minimax 搜索。
///
/// `depth <= 0` 按 0 处理；终局判断优先于深度耗尽。同分时保留
/// `legal_moves` 顺序中最先出现的走法。
pub fn search(
    state: &GameState,
    depth: i32,
    alpha: f64,
    beta: f64,
    maximizing: bool,
) -> SearchResult {
    let mut stats = SearchStats::default();
    alpha_beta(state, depth, alpha, beta, maximizing, 0, &mut stats)
}

pub fn search_with_stats(
    state: &GameState,
    depth: i32,
    maximizing: bool,
) -> (SearchResult, SearchStats) {
    let mut stats = SearchStats::default();
    let result = alpha_beta(
        state,
        depth,
        f64::NEG_INFINITY,
        f64::INFINITY,
        maximizing,
        0,
        &mut stats,
    );
    (result, stats)
}

fn alpha_beta(
    state: &GameState,
    depth: i32,
    mut alpha: f64,
    mut beta: f64,
    maximizing: bool,
    ply: u32,
    stats: &mut SearchStats,
) -> SearchResult {
    stats.nodes += 1;
    if ply > stats.depth_reached {
        stats.depth_reached = ply;
    }

    if state.is_terminal() {
        return SearchResult::leaf(terminal_utility(state, maximizing));
    }
    if depth <= 0 {
        return SearchResult::leaf(heuristic(state, state.variant));
    }

    let mut best_move = None;

    if maximizing {
        let mut value = f64::NEG_INFINITY;
        for mv in legal_moves(state) {
            let child = state.apply_move(mv);
            let score = alpha_beta(&child, depth - 1, alpha, beta, false, ply + 1, stats).value;
            if score > value {
                value = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        SearchResult { value, best_move }
    } else {
        let mut value = f64::INFINITY;
        for mv in legal_moves(state) {
            let child = state.apply_move(mv);
            let score = alpha_beta(&child, depth - 1, alpha, beta, true, ply + 1, stats).value;
            if score < value {
                value = score;
                best_move = Some(mv);
            }
            beta = beta.min(score);
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        SearchResult { value, best_move }
    }
}

/// 不剪枝的穷举 minimax，用于核对 alpha-beta 的结果。
pub fn minimax(state: &GameState, depth: i32, maximizing: bool) -> SearchResult {
    if state.is_terminal() {
        return SearchResult::leaf(terminal_utility(state, maximizing));
    }
    if depth <= 0 {
        return SearchResult::leaf(heuristic(state, state.variant));
    }

    let mut best = SearchResult::leaf(if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    });
    for mv in legal_moves(state) {
        let score = minimax(&state.apply_move(mv), depth - 1, !maximizing).value;
        let improves = if maximizing {
            score > best.value
        } else {
            score < best.value
        };
        if improves {
            best = SearchResult {
                value: score,
                best_move: Some(mv),
            };
        }
    }
    best
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "normal" | "medium" => Ok(AiDifficulty::Normal),
            "hard" => Ok(AiDifficulty::Hard),
            "expert" | "extreme" => Ok(AiDifficulty::Expert),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiConfig {
    pub depth: i32,
}

impl AiConfig {
    pub fn new(depth: i32) -> Self {
        Self { depth }
    }

    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Easy => Self { depth: 1 },
            AiDifficulty::Normal => Self { depth: 4 },
            AiDifficulty::Hard => Self { depth: 8 },
            AiDifficulty::Expert => Self {
                depth: DEFAULT_DEPTH,
            },
        }
    }

    pub fn unbounded() -> Self {
        Self {
            depth: UNBOUNDED_DEPTH,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_move: Option<Move>,
    pub evaluation: f64,
    pub nodes: u64,
    pub cutoffs: u64,
    pub depth_reached: u32,
}

/// 代表电脑一方，总是以最大化一方的身份从根节点搜索。
#[derive(Debug, Clone, Default)]
pub struct AiAgent {
    config: AiConfig,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn decide(&self, state: &GameState) -> AiDecision {
        let (result, stats) = search_with_stats(state, self.config.depth, true);
        AiDecision {
            best_move: result.best_move,
            evaluation: result.value,
            nodes: stats.nodes,
            cutoffs: stats.cutoffs,
            depth_reached: stats.depth_reached,
        }
    }
}

impl MoveSource for AiAgent {
    fn next_move(&mut self, state: &GameState) -> Option<Move> {
        self.decide(state).best_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::evaluation::WIN_VALUE;
    use crate::game::Variant;

    fn root(state: &GameState, depth: i32) -> SearchResult {
        search(state, depth, f64::NEG_INFINITY, f64::INFINITY, true)
    }

    #[test]
    fn terminal_root_returns_without_a_move() {
        let state = GameState::new(1, 0, Variant::Normal);
        let (result, stats) = search_with_stats(&state, 10, true);
        assert_eq!(result.best_move, None);
        assert_eq!(result.value, -(WIN_VALUE + 2.0));
        assert_eq!(stats.nodes, 1);
    }

    #[test]
    fn terminal_check_precedes_depth_exhaustion() {
        let state = GameState::new(0, 3, Variant::Normal);
        assert_eq!(root(&state, 0).value, -(WIN_VALUE + 9.0));
    }

    #[test]
    fn non_positive_depth_falls_back_to_heuristic() {
        let state = GameState::new(5, 5, Variant::Normal);
        let result = root(&state, -3);
        assert_eq!(result.value, -10.0);
        assert_eq!(result.best_move, None);
    }

    #[test]
    fn three_three_normal_prefers_taking_two() {
        let state = GameState::new(3, 3, Variant::Normal);
        let result = root(&state, 10);
        assert_eq!(result.best_move, Some(Move::BLUE_TWO));
        assert_eq!(result.value, -(WIN_VALUE + 6.0));
    }

    #[test]
    fn ties_go_to_the_first_move_in_priority_order() {
        // red 2 and blue 2 both back up -504 at depth 1
        let state = GameState::new(3, 3, Variant::Normal);
        let result = root(&state, 1);
        assert_eq!(result.value, -504.0);
        assert_eq!(result.best_move, Some(Move::RED_TWO));

        // misere order is blue 1, red 1, ...; the first two tie
        let state = GameState::new(3, 3, Variant::Misere);
        let result = root(&state, 1);
        assert_eq!(result.value, -1.0);
        assert_eq!(result.best_move, Some(Move::BLUE_ONE));

        // red 1 and blue 2 are both winning here
        let state = GameState::new(2, 4, Variant::Misere);
        let result = root(&state, 10);
        assert_eq!(result.value, WIN_VALUE + 2.0);
        assert_eq!(result.best_move, Some(Move::RED_ONE));
    }

    #[test]
    fn full_search_finds_known_wins() {
        let result = root(&GameState::new(6, 4, Variant::Normal), 15);
        assert_eq!(result.value, WIN_VALUE + 6.0);
        assert_eq!(result.best_move, Some(Move::RED_TWO));

        let result = root(&GameState::new(6, 4, Variant::Misere), 15);
        assert_eq!(result.value, WIN_VALUE + 2.0);
        assert_eq!(result.best_move, Some(Move::BLUE_ONE));
    }

    #[test]
    fn pruning_never_changes_the_value() {
        for variant in [Variant::Normal, Variant::Misere] {
            for red in 0..7 {
                for blue in 0..7 {
                    let state = GameState::new(red, blue, variant);
                    for depth in 0..6 {
                        let pruned = root(&state, depth);
                        let plain = minimax(&state, depth, true);
                        assert_eq!(pruned.value, plain.value, "{state} depth={depth}");
                        assert_eq!(pruned.best_move, plain.best_move, "{state} depth={depth}");
                    }
                }
            }
        }
    }

    #[test]
    fn pruning_visits_fewer_nodes() {
        let state = GameState::new(6, 6, Variant::Normal);
        let (_, stats) = search_with_stats(&state, UNBOUNDED_DEPTH, true);
        assert!(stats.cutoffs > 0);
        assert!(stats.depth_reached <= state.total());
    }

    #[test]
    fn unbounded_search_terminates() {
        let state = GameState::new(8, 7, Variant::Misere);
        let (result, stats) = search_with_stats(&state, UNBOUNDED_DEPTH, true);
        assert!(result.best_move.is_some());
        assert!(result.value.abs() > WIN_VALUE);
        assert!(stats.depth_reached <= 15);

        let agent = AiAgent::new(AiConfig::unbounded());
        let decision = agent.decide(&state);
        assert_eq!(decision.best_move, result.best_move);
        assert_eq!(decision.evaluation, result.value);
    }

    #[test]
    fn search_is_deterministic() {
        let state = GameState::new(7, 9, Variant::Normal);
        let first = root(&state, 6);
        let second = root(&state, 6);
        assert_eq!(first, second);
        assert_eq!(first.best_move, Some(Move::BLUE_TWO));
        assert_eq!(first.value, -506.0);
    }

    #[test]
    fn agent_decision_on_finished_game_has_no_move() {
        let agent = AiAgent::new(AiConfig::from_difficulty(AiDifficulty::Easy));
        let decision = agent.decide(&GameState::new(0, 0, Variant::Normal));
        assert!(decision.best_move.is_none());
        assert_eq!(decision.nodes, 1);
    }

    #[test]
    fn difficulty_tokens_parse() {
        assert_eq!("Hard".parse::<AiDifficulty>(), Ok(AiDifficulty::Hard));
        assert_eq!(AiConfig::from_difficulty(AiDifficulty::Expert).depth, DEFAULT_DEPTH);
        assert!("godlike".parse::<AiDifficulty>().is_err());
    }
}
