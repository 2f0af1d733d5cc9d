pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    heuristic, minimax, search, search_with_stats, terminal_utility, AiAgent, AiConfig,
    AiDecision, AiDifficulty, SearchResult, SearchStats, DEFAULT_DEPTH, UNBOUNDED_DEPTH,
};
pub use game::{
    is_legal, legal_moves, playable_moves, GameEvent, GameOutcome, GameState, MatchConfig, Move,
    MoveSource, PileColor, RandomMoves, RuleEngine, RuleError, ScriptedMoves, Session, Side,
    Variant,
};

#[cfg(all(target_arch = "wasm32", feature = "wee_alloc"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// 单步走子后返回给前端的结果：新状态、本步产生的事件以及可能的终局信息。
#[derive(Debug, Clone, Serialize)]
pub struct TurnResolution {
    pub state: GameState,
    pub to_move: Side,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameOutcome>,
}

impl TurnResolution {
    fn since(session: &Session, first_event: usize) -> Self {
        Self {
            state: *session.state(),
            to_move: session.to_move(),
            events: session.events()[first_event..].to_vec(),
            outcome: session.outcome().copied(),
        }
    }
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    applied: TurnResolution,
}

fn make_agent(depth: Option<i32>, difficulty: Option<String>) -> AiAgent {
    let config = match (depth, difficulty.as_deref()) {
        (Some(depth), _) => AiConfig::new(depth),
        (None, Some(value)) => value
            .parse::<AiDifficulty>()
            .map(AiConfig::from_difficulty)
            .unwrap_or_default(),
        (None, None) => AiConfig::default(),
    };
    AiAgent::new(config)
}

#[wasm_bindgen]
pub struct NimEngine {
    session: Session,
}

#[wasm_bindgen]
impl NimEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<NimEngine, JsValue> {
        let config = if let Some(json) = config_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            let sample = GameState::sample();
            MatchConfig::new(sample.red, sample.blue)
        };
        let session = Session::new(config).map_err(to_js_error)?;
        Ok(NimEngine { session })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.state()).map_err(serde_to_js_error)
    }

    pub fn session_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session).map_err(serde_to_js_error)
    }

    pub fn legal_moves_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.legal_moves()).map_err(serde_to_js_error)
    }

    pub fn outcome_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.outcome()).map_err(serde_to_js_error)
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn play_human_json(&mut self, move_json: &str) -> Result<String, JsValue> {
        let mv: Move = serde_json::from_str(move_json).map_err(serde_to_js_error)?;
        let first_event = self.session.events().len();
        self.session.play_human(mv).map_err(to_js_error)?;
        serde_json::to_string(&TurnResolution::since(&self.session, first_event))
            .map_err(serde_to_js_error)
    }

    pub fn apply_ai_move(&mut self) -> Result<String, JsValue> {
        let first_event = self.session.events().len();
        let decision = self.session.play_computer().map_err(to_js_error)?;
        let response = AiMoveResponse {
            decision,
            applied: TurnResolution::since(&self.session, first_event),
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 在延迟之后给出电脑的建议走法，但不落子。
    pub fn think_ai(&self, delay_ms: Option<u32>) -> Promise {
        let state = *self.session.state();
        let agent = make_agent(Some(self.session.config().depth), None);
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let decision = agent.decide(&state);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 按优先级列出走法，只看数量，不看是否已终局。
#[wasm_bindgen(js_name = "legalMoves")]
pub fn legal_moves_js(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    to_value(&legal_moves(&state)).map_err(JsValue::from)
}

/// 当前真正可走的走法；终局时为空。
#[wasm_bindgen(js_name = "playableMoves")]
pub fn playable_moves_js(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    to_value(&playable_moves(&state)).map_err(JsValue::from)
}

/// 数量在零处截断，不会失败。
#[wasm_bindgen(js_name = "applyMove")]
pub fn apply_move_js(state: JsValue, mv: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let mv: Move = from_value(mv).map_err(JsValue::from)?;
    to_value(&state.apply_move(mv)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "playMove")]
pub fn play_move_js(state: JsValue, mv: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let mv: Move = from_value(mv).map_err(JsValue::from)?;
    let next = RuleEngine::play(&state, mv).map_err(to_js_error)?;
    to_value(&next).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "isTerminal")]
pub fn is_terminal_js(state: JsValue) -> Result<bool, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    Ok(state.is_terminal())
}

#[wasm_bindgen(js_name = "heuristicValue")]
pub fn heuristic_value_js(state: JsValue) -> Result<f64, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    Ok(heuristic(&state, state.variant))
}

#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    state: JsValue,
    depth: Option<i32>,
    difficulty: Option<String>,
) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let decision = make_agent(depth, difficulty).decide(&state);
    to_value(&decision).map_err(JsValue::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_prefers_explicit_depth_over_difficulty() {
        let agent = make_agent(Some(3), Some("easy".into()));
        assert_eq!(agent.config().depth, 3);

        let agent = make_agent(None, Some("hard".into()));
        assert_eq!(agent.config().depth, 8);

        let agent = make_agent(None, Some("unknown".into()));
        assert_eq!(agent.config().depth, DEFAULT_DEPTH);
    }

    #[test]
    fn turn_resolution_only_carries_new_events() {
        let config = MatchConfig::new(2, 2).with_first_player(Side::Human);
        let mut session = Session::new(config).expect("valid config");
        session.play_human(Move::RED_ONE).expect("legal move");
        let first_event = session.events().len();
        session.play_computer().expect("computer can move");

        let resolution = TurnResolution::since(&session, first_event);
        assert!(!resolution.events.is_empty());
        assert!(matches!(
            resolution.events[0],
            GameEvent::MovePlayed {
                side: Side::Computer,
                ..
            }
        ));
    }
}
