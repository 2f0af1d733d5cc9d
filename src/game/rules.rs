use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::{GameState, PileColor, Side, Variant};

/// 一步走法：从某一堆中取走 1 或 2 颗弹珠。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Move {
    pub color: PileColor,
    pub amount: u8,
}

impl Move {
    pub const RED_TWO: Move = Move {
        color: PileColor::Red,
        amount: 2,
    };
    pub const BLUE_TWO: Move = Move {
        color: PileColor::Blue,
        amount: 2,
    };
    pub const RED_ONE: Move = Move {
        color: PileColor::Red,
        amount: 1,
    };
    pub const BLUE_ONE: Move = Move {
        color: PileColor::Blue,
        amount: 1,
    };

    /// 普通版的走法优先级：先大后小，先红后蓝。
    pub const ALL: [Move; 4] = [Move::RED_TWO, Move::BLUE_TWO, Move::RED_ONE, Move::BLUE_ONE];

    pub fn new(color: PileColor, amount: u8) -> Result<Self, RuleError> {
        match amount {
            1 | 2 => Ok(Self { color, amount }),
            _ => Err(RuleError::InvalidAmount { amount }),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameFinished,
    NotPlayerTurn {
        expected: Side,
        actual: Side,
    },
    InvalidAmount {
        amount: u8,
    },
    IllegalMove {
        color: PileColor,
        amount: u8,
        available: u32,
    },
    NoMoveAvailable {
        side: Side,
    },
    InvalidConfig {
        reason: String,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::GameFinished => write!(f, "the game is already over"),
            RuleError::NotPlayerTurn { expected, actual } => {
                write!(f, "it is {expected}'s turn, not {actual}'s")
            }
            RuleError::InvalidAmount { amount } => {
                write!(f, "a move takes 1 or 2 marbles, got {amount}")
            }
            RuleError::IllegalMove {
                color,
                amount,
                available,
            } => write!(
                f,
                "cannot take {amount} {color} marble(s) with only {available} left"
            ),
            RuleError::NoMoveAvailable { side } => write!(f, "{side} produced no move"),
            RuleError::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for RuleError {}

/// 按固定优先级生成合法走法；misère 版整体反转。
///
/// 这个顺序同时也是搜索的走法排序与同分决胜规则。只看各堆剩余数量，
/// 不判断终局：`(0, 5)` 仍会给出蓝色的两步。
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    let mut moves: Vec<Move> = Move::ALL
        .iter()
        .copied()
        .filter(|mv| state.count(mv.color) >= mv.amount as u32)
        .collect();

    if state.variant == Variant::Misere {
        moves.reverse();
    }

    moves
}

/// 对局中实际可走的步：终局后为空。
pub fn playable_moves(state: &GameState) -> Vec<Move> {
    if state.is_terminal() {
        return Vec::new();
    }
    legal_moves(state)
}

pub fn is_legal(state: &GameState, mv: Move) -> bool {
    playable_moves(state).contains(&mv)
}

/// 无状态的规则检查与落子入口。
pub struct RuleEngine;

impl RuleEngine {
    /// 外部走法来源提交走法前的合法性检查。
    pub fn validate(state: &GameState, mv: Move) -> Result<(), RuleError> {
        if state.is_terminal() {
            return Err(RuleError::GameFinished);
        }
        if !matches!(mv.amount, 1 | 2) {
            return Err(RuleError::InvalidAmount { amount: mv.amount });
        }
        let available = state.count(mv.color);
        if available < mv.amount as u32 {
            return Err(RuleError::IllegalMove {
                color: mv.color,
                amount: mv.amount,
                available,
            });
        }
        Ok(())
    }

    /// 校验后应用走法，返回新状态。
    pub fn play(state: &GameState, mv: Move) -> Result<GameState, RuleError> {
        Self::validate(state, mv)?;
        Ok(state.apply_move(mv))
    }
}
