//! Request/response shapes for the `analyze`, `suggest` and `matrix` commands.
//!
//! This is the host side of the engine: it parses client payloads, picks the
//! strategy, sorts and trims the ranking. Scoring itself lives in
//! `triage_core`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use triage_core::{Quadrant, ScoreError, ScoredTask, Task, Weights, detect_cycles, score_tasks_on};

/// Client-facing message for payloads that are not a task list.
pub const MALFORMED_MESSAGE: &str = "Invalid tasks JSON";

/// Strategy names clients are known to send. All map to the one algorithm.
const KNOWN_STRATEGIES: &[&str] = &["smart_balance", "fastest_wins", "high_impact", "deadline_driven"];

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid tasks JSON: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error(transparent)]
    Scoring(#[from] ScoreError),
}

impl RequestError {
    /// 2 for client mistakes, 1 for scoring failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            RequestError::MalformedPayload(_) => 2,
            RequestError::Scoring(_) => 1,
        }
    }

    /// JSON body reported back to the client.
    pub fn body(&self) -> Value {
        let message = match self {
            RequestError::MalformedPayload(_) => MALFORMED_MESSAGE.to_string(),
            RequestError::Scoring(e) => e.to_string(),
        };
        serde_json::json!({ "error": message })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    SmartBalance,
}

impl Strategy {
    pub fn resolve(requested: Option<&str>) -> Self {
        match requested {
            None => {}
            Some(name) if KNOWN_STRATEGIES.contains(&name) => {
                debug!(requested = name, "strategy mapped to smart_balance");
            }
            Some(name) => {
                warn!(requested = name, "unknown strategy, using smart_balance");
            }
        }
        Strategy::SmartBalance
    }
}

/// Either `{ "tasks": [...], "strategy": "..." }` or a bare task array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub strategy: Option<String>,
}

pub fn parse_request(input: &str) -> Result<Request, RequestError> {
    let value: Value = serde_json::from_str(input).map_err(RequestError::MalformedPayload)?;
    let request = match value {
        Value::Array(_) => Request {
            tasks: serde_json::from_value(value).map_err(RequestError::MalformedPayload)?,
            strategy: None,
        },
        other => serde_json::from_value(other).map_err(RequestError::MalformedPayload)?,
    };
    Ok(request)
}

/// Sort by score, highest first. Equal scores keep their input order.
pub fn rank(mut scored: Vec<ScoredTask>) -> Vec<ScoredTask> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub strategy: Strategy,
    pub tasks: Vec<ScoredTask>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub task: ScoredTask,
    pub why: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
    pub strategy: Strategy,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantGroup {
    pub quadrant: Quadrant,
    pub title: &'static str,
    pub tasks: Vec<ScoredTask>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixResponse {
    pub quadrants: Vec<QuadrantGroup>,
}

pub fn analyze(input: &str, weights: &Weights, today: NaiveDate) -> Result<AnalyzeResponse, RequestError> {
    let req = parse_request(input)?;
    let strategy = Strategy::resolve(req.strategy.as_deref());
    let scored = score_tasks_on(&req.tasks, weights, today)?;
    Ok(AnalyzeResponse {
        strategy,
        tasks: rank(scored),
    })
}

pub fn suggest(
    input: &str,
    weights: &Weights,
    today: NaiveDate,
    limit: usize,
) -> Result<SuggestResponse, RequestError> {
    let AnalyzeResponse { strategy, tasks } = analyze(input, weights, today)?;
    let suggestions = tasks
        .into_iter()
        .take(limit)
        .map(|task| Suggestion {
            why: task.explanation.clone(),
            task,
        })
        .collect();
    Ok(SuggestResponse {
        strategy,
        suggestions,
    })
}

pub fn matrix(input: &str, weights: &Weights, today: NaiveDate) -> Result<MatrixResponse, RequestError> {
    let req = parse_request(input)?;
    let scored = rank(score_tasks_on(&req.tasks, weights, today)?);
    let cycles = detect_cycles(&req.tasks);

    let mut quadrants: Vec<QuadrantGroup> = Quadrant::ALL
        .iter()
        .map(|&quadrant| QuadrantGroup {
            quadrant,
            title: quadrant.title(),
            tasks: Vec::new(),
        })
        .collect();

    for task in scored {
        let q = Quadrant::classify(&task.task, today, &cycles)?;
        if let Some(group) = quadrants.iter_mut().find(|g| g.quadrant == q) {
            group.tasks.push(task);
        }
    }

    Ok(MatrixResponse { quadrants })
}
