use std::collections::VecDeque;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::rules::{playable_moves, Move, RuleEngine, RuleError};
use super::state::{GameEvent, GameOutcome, GameState, Side, Variant};
use crate::ai::{AiAgent, AiConfig, AiDecision, DEFAULT_DEPTH};
use crate::log;

/// 人类一方的走法来源（界面输入、脚本、随机或另一个 AI）。
///
/// 返回的走法应当属于 `playable_moves(state)`；会话在应用前会再校验一次。
pub trait MoveSource {
    fn next_move(&mut self, state: &GameState) -> Option<Move>;
}

/// 依次给出预先设定的走法。
#[derive(Debug, Clone, Default)]
pub struct ScriptedMoves {
    moves: VecDeque<Move>,
}

impl ScriptedMoves {
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl MoveSource for ScriptedMoves {
    fn next_move(&mut self, _state: &GameState) -> Option<Move> {
        self.moves.pop_front()
    }
}

/// 在合法走法中均匀随机选择。
pub struct RandomMoves {
    rng: SmallRng,
}

impl RandomMoves {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMoves {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSource for RandomMoves {
    fn next_move(&mut self, state: &GameState) -> Option<Move> {
        playable_moves(state).choose(&mut self.rng).copied()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    pub red: u32,
    pub blue: u32,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub first_player: Side,
    #[serde(default = "default_depth")]
    pub depth: i32,
}

fn default_depth() -> i32 {
    DEFAULT_DEPTH
}

impl MatchConfig {
    pub fn new(red: u32, blue: u32) -> Self {
        Self {
            red,
            blue,
            variant: Variant::default(),
            first_player: Side::default(),
            depth: DEFAULT_DEPTH,
        }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_first_player(mut self, side: Side) -> Self {
        self.first_player = side;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// 按 `red blue [variant] [first_player] [depth]` 的位置顺序解析参数。
    pub fn from_args(args: &[&str]) -> Result<Self, RuleError> {
        let invalid = |reason: String| RuleError::InvalidConfig { reason };

        let [red, blue, rest @ ..] = args else {
            return Err(invalid("expected at least red and blue counts".into()));
        };
        if rest.len() > 3 {
            return Err(invalid(format!("unexpected argument {:?}", rest[3])));
        }

        let red = red
            .parse::<u32>()
            .map_err(|_| invalid(format!("red count {red:?} is not a non-negative integer")))?;
        let blue = blue
            .parse::<u32>()
            .map_err(|_| invalid(format!("blue count {blue:?} is not a non-negative integer")))?;
        let mut config = MatchConfig::new(red, blue);

        if let Some(token) = rest.first() {
            config.variant = Variant::from_str(token)
                .map_err(|_| invalid(format!("unknown variant {token:?}")))?;
        }
        if let Some(token) = rest.get(1) {
            config.first_player = Side::from_str(token)
                .map_err(|_| invalid(format!("unknown first player {token:?}")))?;
        }
        if let Some(token) = rest.get(2) {
            config.depth = token
                .parse::<i32>()
                .map_err(|_| invalid(format!("depth {token:?} is not an integer")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.depth < 1 {
            return Err(RuleError::InvalidConfig {
                reason: format!("depth must be greater than 0, got {}", self.depth),
            });
        }
        if self.red == 0 || self.blue == 0 {
            return Err(RuleError::InvalidConfig {
                reason: "both piles must start with at least one marble".into(),
            });
        }
        Ok(())
    }

    pub fn initial_state(&self) -> GameState {
        GameState::new(self.red, self.blue, self.variant)
    }
}

/// 一局对局：交替调用搜索（电脑）和外部走法来源（人类），直到终局。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    config: MatchConfig,
    state: GameState,
    to_move: Side,
    plies: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    event_log: Vec<GameEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outcome: Option<GameOutcome>,
}

impl Session {
    pub fn new(config: MatchConfig) -> Result<Self, RuleError> {
        config.validate()?;
        Ok(Self {
            config,
            state: config.initial_state(),
            to_move: config.first_player,
            plies: 0,
            event_log: Vec::new(),
            outcome: None,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.event_log
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        playable_moves(&self.state)
    }

    fn ensure_turn(&self, side: Side) -> Result<(), RuleError> {
        if self.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if self.to_move != side {
            return Err(RuleError::NotPlayerTurn {
                expected: self.to_move,
                actual: side,
            });
        }
        Ok(())
    }

    /// 电脑一方按配置深度搜索并落子，返回搜索结论。
    pub fn play_computer(&mut self) -> Result<AiDecision, RuleError> {
        self.ensure_turn(Side::Computer)?;
        let agent = AiAgent::new(AiConfig::new(self.config.depth));
        let decision = agent.decide(&self.state);
        let mv = decision.best_move.ok_or(RuleError::NoMoveAvailable {
            side: Side::Computer,
        })?;
        self.apply_ply(Side::Computer, mv)?;
        Ok(decision)
    }

    pub fn play_human(&mut self, mv: Move) -> Result<(), RuleError> {
        self.ensure_turn(Side::Human)?;
        self.apply_ply(Side::Human, mv)
    }

    /// 轮到谁就让谁走一步，人类一方的走法取自 `human`。
    pub fn step(&mut self, human: &mut dyn MoveSource) -> Result<Move, RuleError> {
        match self.to_move {
            Side::Computer => {
                let decision = self.play_computer()?;
                decision.best_move.ok_or(RuleError::NoMoveAvailable {
                    side: Side::Computer,
                })
            }
            Side::Human => {
                if self.is_finished() {
                    return Err(RuleError::GameFinished);
                }
                let mv = human
                    .next_move(&self.state)
                    .ok_or(RuleError::NoMoveAvailable { side: Side::Human })?;
                self.play_human(mv)?;
                Ok(mv)
            }
        }
    }

    pub fn run(&mut self, human: &mut dyn MoveSource) -> Result<GameOutcome, RuleError> {
        while self.outcome.is_none() {
            self.step(human)?;
        }
        self.outcome.ok_or(RuleError::GameFinished)
    }

    fn apply_ply(&mut self, side: Side, mv: Move) -> Result<(), RuleError> {
        self.state = RuleEngine::play(&self.state, mv)?;
        self.plies += 1;

        log!("{side} takes {mv} -> {}", self.state);
        self.event_log.push(GameEvent::MovePlayed {
            side,
            color: mv.color,
            amount: mv.amount,
            red: self.state.red,
            blue: self.state.blue,
        });

        self.to_move = side.opponent();

        if self.state.is_terminal() {
            let outcome = GameOutcome::decide(&self.state, self.to_move, self.plies);
            log!(
                "game over: {} wins with a score of {}",
                outcome.winner,
                outcome.score
            );
            self.event_log.push(outcome.event());
            self.outcome = Some(outcome);
        }

        Ok(())
    }
}
