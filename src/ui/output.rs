//! Line-oriented CLI output
//!
//! Every step line carries a tone. Interactive terminals render it through
//! cliclack's log; CI and pipes get a bracketed tag instead.

use super::context::UiContext;
use console::{style, Style};

/// Severity of a step line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Ok,
    Warn,
    Info,
}

impl Tone {
    fn tag(self) -> &'static str {
        match self {
            Self::Ok => "[OK]",
            Self::Warn => "[WARN]",
            Self::Info => "[INFO]",
        }
    }

    fn style(self) -> Style {
        match self {
            Self::Ok => Style::new().green(),
            Self::Warn => Style::new().yellow(),
            Self::Info => Style::new().cyan(),
        }
    }
}

fn step(ctx: &UiContext, tone: Tone, message: &str) {
    if ctx.use_fancy_output() {
        let _ = match tone {
            Tone::Ok => cliclack::log::success(message),
            Tone::Warn => cliclack::log::warning(message),
            Tone::Info => cliclack::log::info(message),
        };
    } else {
        println!("  {} {}", tone.style().apply_to(tone.tag()), message);
    }
}

fn outro(ctx: &UiContext, tone: Tone, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(tone.style().bold().apply_to(message)).ok();
    } else {
        println!();
        println!("{} {}", tone.style().apply_to(tone.tag()), message);
    }
}

/// Banner opening a report
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).green().bold()).ok();
    } else {
        println!("{}", style(title).green().bold());
        println!();
    }
}

pub fn outro_success(ctx: &UiContext, message: &str) {
    outro(ctx, Tone::Ok, message);
}

pub fn outro_warn(ctx: &UiContext, message: &str) {
    outro(ctx, Tone::Warn, message);
}

pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Tone::Ok, message);
}

/// Success line with a dimmed detail in parentheses
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Tone::Ok, &format!("{} ({})", message, style(detail).dim()));
}

/// Warning line followed by what to do about it
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    step(ctx, Tone::Warn, &format!("{} - {}", message, style(hint).dim()));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Tone::Info, message);
}

/// Dimmed follow-up note
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Key-value line colored by whether the value is healthy
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let tone = if ok { Tone::Ok } else { Tone::Warn };
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), tone.style().apply_to(value));
    } else {
        println!("  {} {}: {}", tone.tag(), key, value);
    }
}
