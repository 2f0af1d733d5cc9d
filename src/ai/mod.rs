//! AI 算法模块：终局效用、启发式估值与 minimax / alpha-beta 搜索。

pub mod evaluation;
pub mod minimax;

pub use evaluation::{heuristic, terminal_utility, WIN_VALUE};
pub use minimax::{
    minimax, search, search_with_stats, AiAgent, AiConfig, AiDecision, AiDifficulty,
    SearchResult, SearchStats, DEFAULT_DEPTH, UNBOUNDED_DEPTH,
};
