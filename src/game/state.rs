use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::rules::Move;

/// 终局计分中红色弹珠的权重。
pub const RED_WEIGHT: u32 = 2;
/// 终局计分中蓝色弹珠的权重。
pub const BLUE_WEIGHT: u32 = 3;

/// 弹珠堆的颜色。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PileColor {
    Red,
    Blue,
}

impl fmt::Display for PileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PileColor::Red => write!(f, "red"),
            PileColor::Blue => write!(f, "blue"),
        }
    }
}

/// 计分规则：普通版或 misère 版。整局游戏中保持不变。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Normal,
    Misere,
}

impl FromStr for Variant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "standard" => Ok(Variant::Normal),
            "misere" | "misère" => Ok(Variant::Misere),
            _ => Err(()),
        }
    }
}

/// 对局双方。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Computer,
    Human,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Computer => Side::Human,
            Side::Human => Side::Computer,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Computer => write!(f, "Computer"),
            Side::Human => write!(f, "Human"),
        }
    }
}

impl FromStr for Side {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "computer" | "cpu" | "ai" => Ok(Side::Computer),
            "human" | "player" => Ok(Side::Human),
            _ => Err(()),
        }
    }
}

/// 某一时刻的牌面快照。按值传递，搜索的每个分支都持有自己的副本。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GameState {
    pub red: u32,
    pub blue: u32,
    #[serde(default)]
    pub variant: Variant,
}

impl GameState {
    pub fn new(red: u32, blue: u32, variant: Variant) -> Self {
        Self { red, blue, variant }
    }

    /// 任意一堆为空即终局。
    pub fn is_terminal(&self) -> bool {
        self.red == 0 || self.blue == 0
    }

    pub fn count(&self, color: PileColor) -> u32 {
        match color {
            PileColor::Red => self.red,
            PileColor::Blue => self.blue,
        }
    }

    pub fn total(&self) -> u32 {
        self.red.saturating_add(self.blue)
    }

    /// 剩余弹珠的加权分数：`2×红 + 3×蓝`。
    pub fn final_score(&self) -> u32 {
        self.red
            .saturating_mul(RED_WEIGHT)
            .saturating_add(self.blue.saturating_mul(BLUE_WEIGHT))
    }

    /// 返回应用走法后的新状态。数量在零处截断，因此这是一个全函数。
    pub fn apply_move(&self, mv: Move) -> GameState {
        let mut next = *self;
        match mv.color {
            PileColor::Red => next.red = next.red.saturating_sub(mv.amount as u32),
            PileColor::Blue => next.blue = next.blue.saturating_sub(mv.amount as u32),
        }
        next
    }

    pub fn sample() -> Self {
        GameState::new(3, 3, Variant::Normal)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::sample()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "red={} blue={}", self.red, self.blue)
    }
}

/// 对局事件流，供渲染层逐步消费。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MovePlayed {
        side: Side,
        color: PileColor,
        amount: u8,
        red: u32,
        blue: u32,
    },
    GameWon {
        winner: Side,
        score: u32,
        red: u32,
        blue: u32,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: Side,
    pub score: u32,
    pub red: u32,
    pub blue: u32,
    pub plies: u32,
}

impl GameOutcome {
    /// 根据终局状态和下一个应走的一方判定胜者。
    ///
    /// 普通版中，轮到走棋时已有一堆为空的一方判负；misère 版相反。
    pub fn decide(state: &GameState, to_move: Side, plies: u32) -> Self {
        let winner = match state.variant {
            Variant::Normal => to_move.opponent(),
            Variant::Misere => to_move,
        };
        Self {
            winner,
            score: state.final_score(),
            red: state.red,
            blue: state.blue,
            plies,
        }
    }

    pub fn event(&self) -> GameEvent {
        GameEvent::GameWon {
            winner: self.winner,
            score: self.score,
            red: self.red,
            blue: self.blue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_when_either_pile_is_empty() {
        assert!(GameState::new(0, 4, Variant::Normal).is_terminal());
        assert!(GameState::new(1, 0, Variant::Misere).is_terminal());
        assert!(!GameState::new(1, 1, Variant::Normal).is_terminal());
    }

    #[test]
    fn apply_move_clamps_at_zero_and_keeps_variant() {
        let state = GameState::new(1, 5, Variant::Misere);
        let next = state.apply_move(Move::RED_TWO);
        assert_eq!(next.red, 0);
        assert_eq!(next.blue, 5);
        assert_eq!(next.variant, Variant::Misere);
        // the source value is untouched
        assert_eq!(state.red, 1);
    }

    #[test]
    fn final_score_weights_blue_higher() {
        assert_eq!(GameState::new(2, 0, Variant::Normal).final_score(), 4);
        assert_eq!(GameState::new(0, 3, Variant::Normal).final_score(), 9);
    }

    #[test]
    fn outcome_follows_variant() {
        let end = GameState::new(0, 2, Variant::Normal);
        let normal = GameOutcome::decide(&end, Side::Computer, 5);
        assert_eq!(normal.winner, Side::Human);
        assert_eq!(normal.score, 6);

        let end = GameState::new(0, 2, Variant::Misere);
        let misere = GameOutcome::decide(&end, Side::Computer, 5);
        assert_eq!(misere.winner, Side::Computer);
    }

    #[test]
    fn variant_tokens_parse() {
        assert_eq!("standard".parse::<Variant>(), Ok(Variant::Normal));
        assert_eq!("MISERE".parse::<Variant>(), Ok(Variant::Misere));
        assert_eq!("misère".parse::<Variant>(), Ok(Variant::Misere));
        assert!("other".parse::<Variant>().is_err());
    }

    #[test]
    fn state_round_trips_through_json_with_default_variant() {
        let state: GameState = serde_json::from_str(r#"{"red":4,"blue":7}"#).expect("valid json");
        assert_eq!(state, GameState::new(4, 7, Variant::Normal));
    }
}
