//! 终局效用与截断搜索时的启发式估值。两者互不替代。

use crate::game::{GameState, Variant};

/// 已分胜负的局面相对任何启发式估值的偏移量。
pub const WIN_VALUE: f64 = 1_000_000.0;

/// 某一堆只剩 1 或 2 颗时的惩罚。
const NEAR_LOSS_PENALTY: f64 = 500.0;
/// 两堆差距达到阈值时的惩罚。
const IMBALANCE_PENALTY: f64 = 100.0;
const IMBALANCE_THRESHOLD: u32 = 3;

/// 终局效用，站在最大化一方的视角。
///
/// `maximizing` 表示此节点轮到最大化一方走。普通版中轮到走棋的一方判负，
/// misère 版中轮到走棋的一方获胜；分值大小为 `WIN_VALUE + 2×红 + 3×蓝`。
pub fn terminal_utility(state: &GameState, maximizing: bool) -> f64 {
    debug_assert!(state.is_terminal());
    let magnitude = WIN_VALUE + state.final_score() as f64;
    let mover_wins = state.variant == Variant::Misere;
    if mover_wins == maximizing {
        magnitude
    } else {
        -magnitude
    }
}

/// 深度耗尽但尚未终局时的估值。对任意非负的两堆数量都有定义。
pub fn heuristic(state: &GameState, variant: Variant) -> f64 {
    match variant {
        Variant::Normal => {
            // 尽量拖延，不要急着清空某一堆
            let reduction = -(state.total() as f64);

            let near_loss = if is_near_empty(state.red) || is_near_empty(state.blue) {
                -NEAR_LOSS_PENALTY
            } else {
                0.0
            };

            let balance = if state.red.abs_diff(state.blue) >= IMBALANCE_THRESHOLD {
                -IMBALANCE_PENALTY
            } else {
                0.0
            };

            reduction + near_loss + balance
        }
        Variant::Misere => -(state.red.abs_diff(state.blue) as f64),
    }
}

fn is_near_empty(count: u32) -> bool {
    matches!(count, 1 | 2)
}
