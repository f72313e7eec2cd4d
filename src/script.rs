//! Line-oriented event scripts for driving an annotation session headlessly
//!
//! One event per line, `#` starts a comment:
//!
//! ```text
//! resize 1200 800
//! down draw 410 220
//! move 480 230
//! up
//! fill
//! snapshot preview.png
//! save
//! ```

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::annotator::{Annotator, Command, Outcome, PointerButton};
use crate::source::ImageSource;
use crate::store::LabelStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Resize(f32, f32),
    Down(PointerButton, f32, f32),
    Move(f32, f32),
    Up,
    Command(Command),
    Snapshot(PathBuf),
    Quit,
}

/// Parsed event with its 1-based line number
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub event: Event,
}

pub fn parse(text: &str) -> Result<Vec<ScriptLine>> {
    let mut events = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let event = parse_event(content).with_context(|| format!("line {}: {:?}", line, raw))?;
        events.push(ScriptLine { line, event });
    }
    Ok(events)
}

fn parse_event(content: &str) -> Result<Event> {
    let words: Vec<&str> = content.split_whitespace().collect();
    let event = match words.as_slice() {
        ["resize", w, h] => Event::Resize(number(w)?, number(h)?),
        ["down", button, x, y] => {
            let button = match *button {
                "draw" => PointerButton::Primary,
                "erase" => PointerButton::Secondary,
                other => bail!("unknown button {:?}, expected draw or erase", other),
            };
            Event::Down(button, number(x)?, number(y)?)
        }
        ["move", x, y] => Event::Move(number(x)?, number(y)?),
        ["up"] => Event::Up,
        ["fill"] => Event::Command(Command::Fill),
        ["clear"] => Event::Command(Command::Clear),
        ["save"] => Event::Command(Command::Save),
        ["skip"] => Event::Command(Command::Skip),
        ["brush", delta] => {
            let delta: i32 = delta
                .parse()
                .with_context(|| format!("invalid brush delta {:?}", delta))?;
            Event::Command(Command::AdjustBrush(delta))
        }
        ["snapshot", path] => Event::Snapshot(PathBuf::from(path)),
        ["quit"] => Event::Quit,
        _ => bail!("unrecognized event"),
    };
    Ok(event)
}

fn number(word: &str) -> Result<f32> {
    word.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .with_context(|| format!("invalid coordinate {:?}", word))
}

/// Tally of what a replay did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub saved: usize,
    pub skipped: usize,
    pub failed_saves: usize,
}

/// Feed events to the annotator until the script or the session ends.
///
/// Write failures are logged and counted; the item stays active so a later
/// `save` line can retry.
pub fn replay<S, L>(annotator: &mut Annotator<S, L>, script: &[ScriptLine]) -> Result<ReplayReport>
where
    S: ImageSource,
    L: LabelStore,
{
    let mut report = ReplayReport::default();

    for (idx, step) in script.iter().enumerate() {
        if annotator.is_complete() {
            let rest = script.len() - idx;
            tracing::info!("Session complete, ignoring {} remaining event(s)", rest);
            break;
        }

        match &step.event {
            Event::Resize(w, h) => annotator.on_resize(*w, *h),
            Event::Down(button, x, y) => annotator.on_pointer_down(*button, *x, *y),
            Event::Move(x, y) => annotator.on_pointer_move(*x, *y),
            Event::Up => annotator.on_pointer_up(),
            Event::Command(command) => match annotator.on_command(*command) {
                Ok(Outcome::Saved { .. }) => report.saved += 1,
                Ok(Outcome::Skipped { .. }) => report.skipped += 1,
                Ok(outcome) => tracing::debug!("line {}: {:?}", step.line, outcome),
                Err(err) => {
                    report.failed_saves += 1;
                    tracing::error!("line {}: {:#}", step.line, anyhow::Error::from(err));
                }
            },
            Event::Snapshot(path) => match annotator.present() {
                Some(frame) => {
                    frame
                        .save(path)
                        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
                    tracing::info!("Snapshot written to {}", path.display());
                }
                None => tracing::warn!("line {}: no image to snapshot", step.line),
            },
            Event::Quit => {
                annotator.quit();
                break;
            }
        }
    }

    Ok(report)
}
