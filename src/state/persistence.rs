//! Settings store for [`ViewerState`]
//!
//! The file is plain text: ten whitespace-separated scalars in a fixed order
//! with no header or version tag.
//!
//! | # | Field |
//! |---|-------|
//! | 0-2 | background colour r, g, b |
//! | 3 | overlay enabled (`0` / `1`) |
//! | 4-6 | camera position x, y, z |
//! | 7-9 | camera front x, y, z |
//!
//! Loading is best-effort and never fails: a missing file leaves the state
//! untouched, and parsing stops at the first absent or malformed token so any
//! field not yet read keeps its previous value. The camera front is applied
//! only once all three of its components are read. Saving truncates and rewrites
//! the file in place.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use log::{debug, info, warn};

use super::ViewerState;
use crate::error::Result;

/// Number of scalars in a complete settings file
pub const FIELD_COUNT: usize = 10;

/// How much of a settings file made it into the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// All fields were read
    Loaded,
    /// Only the first `fields` fields were read, in order
    Partial { fields: usize },
    /// The file is missing or unreadable; nothing changed
    NotFound,
}

impl LoadOutcome {
    /// Number of fields applied to the state
    pub fn fields_applied(&self) -> usize {
        match self {
            LoadOutcome::Loaded => FIELD_COUNT,
            LoadOutcome::Partial { fields } => *fields,
            LoadOutcome::NotFound => 0,
        }
    }
}

/// Applies a saved settings file to `state` in place
pub fn load_into(path: impl AsRef<Path>, state: &mut ViewerState) -> LoadOutcome {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!("No viewer state loaded from {}: {}", path.display(), err);
            return LoadOutcome::NotFound;
        }
    };

    let fields = apply_text(state, &text);
    let outcome = if fields == FIELD_COUNT {
        LoadOutcome::Loaded
    } else {
        LoadOutcome::Partial { fields }
    };

    match outcome {
        LoadOutcome::Loaded => info!("Loaded viewer state from {}", path.display()),
        _ => warn!(
            "Viewer state file {} is incomplete: applied {} of {} fields",
            path.display(),
            fields,
            FIELD_COUNT
        ),
    }

    outcome
}

/// Applies whitespace-separated scalars to `state`, returning how many were used
pub fn apply_text(state: &mut ViewerState, text: &str) -> usize {
    let mut front = state.camera.front;
    let mut applied = 0;

    for (slot, token) in text.split_whitespace().take(FIELD_COUNT).enumerate() {
        let accepted = match slot {
            0..=2 => parse_scalar(token).map(|v| state.clear_color[slot] = v),
            3 => parse_flag(token).map(|v| state.overlay_enabled = v),
            4 => parse_scalar(token).map(|v| state.camera.position.x = v),
            5 => parse_scalar(token).map(|v| state.camera.position.y = v),
            6 => parse_scalar(token).map(|v| state.camera.position.z = v),
            7 => parse_scalar(token).map(|v| front.x = v),
            8 => parse_scalar(token).map(|v| front.y = v),
            _ => parse_scalar(token).map(|v| front.z = v),
        };

        if accepted.is_none() {
            break;
        }
        applied += 1;
    }

    // A partly read front would mix old and new components
    if applied == FIELD_COUNT && !state.camera.set_front(front) {
        warn!("Ignoring degenerate camera front vector {:?}", front);
    }

    applied
}

/// Writes the persisted fields of `state` to `path`, replacing any previous file
pub fn save(path: impl AsRef<Path>, state: &ViewerState) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    write_fields(&mut out, state)?;
    out.flush()?;

    info!("Saved viewer state to {}", path.display());
    Ok(())
}

fn write_fields(out: &mut impl Write, state: &ViewerState) -> std::io::Result<()> {
    let camera = &state.camera;
    for channel in state.clear_color {
        writeln!(out, "{}", channel)?;
    }
    writeln!(out, "{}", u8::from(state.overlay_enabled))?;
    for value in [camera.position.x, camera.position.y, camera.position.z] {
        writeln!(out, "{}", value)?;
    }
    for value in [camera.front.x, camera.front.y, camera.front.z] {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

fn parse_scalar(token: &str) -> Option<f32> {
    token.parse::<f32>().ok()
}

fn parse_flag(token: &str) -> Option<bool> {
    match token {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}
