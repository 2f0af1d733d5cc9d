//! 游戏核心逻辑模块（状态、走法规则、回合驱动）。

pub mod rules;
pub mod session;
pub mod state;

pub use rules::{is_legal, legal_moves, playable_moves, Move, RuleEngine, RuleError};
pub use session::{MatchConfig, MoveSource, RandomMoves, ScriptedMoves, Session};
pub use state::{GameEvent, GameOutcome, GameState, PileColor, Side, Variant};
