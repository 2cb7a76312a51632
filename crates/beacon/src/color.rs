//! CLI color helpers.
//!
//! Every function respects `NO_COLOR`, `FORCE_COLOR` and TTY detection through
//! `owo-colors`' `if_supports_color()`. `--no-color` sets an in-process flag
//! that skips styling altogether.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

const BEAM: Rgb = Rgb::from_hex(0xE3B341); // Badges, new activity
const TIDE: Rgb = Rgb::from_hex(0x5FA8D3); // Source names
const KELP: Rgb = Rgb::from_hex(0x6B9F5E); // Clear/success
const FLARE: Rgb = Rgb::from_hex(0xC8644E); // Errors
const FOG: Rgb = Rgb::from_hex(0x5C6370); // Secondary info

fn no_color() -> bool {
    NO_COLOR_FLAG.load(Ordering::Relaxed)
}

fn paint_stdout(text: &str, rgb: Rgb) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.truecolor(rgb.r, rgb.g, rgb.b))
        .to_string()
}

fn paint_stderr(text: &str, rgb: Rgb) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stderr, |t| t.truecolor(rgb.r, rgb.g, rgb.b))
        .to_string()
}

/// Badge text and anything flagged as new.
pub fn beam(text: &str) -> String {
    paint_stdout(text, BEAM)
}

/// Source and category names.
pub fn tide(text: &str) -> String {
    paint_stdout(text, TIDE)
}

pub fn kelp(text: &str) -> String {
    paint_stdout(text, KELP)
}

pub fn muted(text: &str) -> String {
    paint_stdout(text, FOG)
}

pub fn bold(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

/// Error styling for stderr.
pub fn error(text: &str) -> String {
    paint_stderr(text, FLARE)
}

/// Warning styling for stderr.
pub fn warning(text: &str) -> String {
    paint_stderr(text, BEAM)
}

/// Secondary info on stderr.
pub fn hint(text: &str) -> String {
    paint_stderr(text, FOG)
}
