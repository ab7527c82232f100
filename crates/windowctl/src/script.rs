use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use window_core::util::parse_local_ts;
use window_core::{Clock, FrequencyGate, ManualClock, PlacementKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Mark(PlacementKey),
    Check(PlacementKey),
    Show(PlacementKey),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub at: NaiveDateTime,
    pub op: Op,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub line: usize,
    pub at: String,
    pub op: &'static str,
    pub placement: String,
    pub result: &'static str,
}

impl Outcome {
    pub fn to_line(&self) -> String {
        format!("{} {} {} {}", self.at, self.op, self.placement, self.result)
    }
}

pub fn parse_script(raw: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = parse_step(line).with_context(|| format!("script line {line_no}"))?;
        steps.push(Step {
            line: line_no,
            at: step.0,
            op: step.1,
        });
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<(NaiveDateTime, Op)> {
    let mut parts = line.split_whitespace();
    let at = parse_local_ts(parts.next().unwrap_or(""))?;
    let cmd = parts.next().unwrap_or("");
    let key = parts.next().map(PlacementKey::from);
    if parts.next().is_some() {
        bail!("too many fields");
    }
    let op = match (cmd.to_lowercase().as_str(), key) {
        ("mark", Some(key)) => Op::Mark(key),
        ("check", Some(key)) => Op::Check(key),
        ("show", Some(key)) => Op::Show(key),
        ("clear", None) => Op::Clear,
        ("mark" | "check" | "show", None) => bail!("missing placement for {cmd}"),
        ("clear", Some(_)) => bail!("clear takes no placement"),
        _ => bail!("unknown command {cmd:?}"),
    };
    Ok((at, op))
}

/// Replays `steps` in order, moving the clock to each step's timestamp.
/// Timestamps may go backwards; the clock simply follows them.
pub fn run<C: Clock>(gate: &mut FrequencyGate<C>, clock: &ManualClock, steps: &[Step]) -> Vec<Outcome> {
    let mut out = Vec::new();
    for step in steps {
        clock.set(step.at);
        let at = step.at.format("%Y-%m-%dT%H:%M").to_string();
        match &step.op {
            Op::Mark(key) => gate.record_shown(key),
            Op::Clear => gate.clear(),
            Op::Check(key) => {
                let result = if gate.should_show(key) { "allowed" } else { "limited" };
                out.push(Outcome {
                    line: step.line,
                    at,
                    op: "check",
                    placement: key.to_string(),
                    result,
                });
            }
            Op::Show(key) => {
                let result = if gate.should_show(key) {
                    gate.record_shown(key);
                    "shown"
                } else {
                    "skipped"
                };
                out.push(Outcome {
                    line: step.line,
                    at,
                    op: "show",
                    placement: key.to_string(),
                    result,
                });
            }
        }
    }
    out
}
