//! Command handlers
//!
//! Every handler runs against the engine's control surface, so the table
//! works the same on the board and against a test double.

use core::fmt::Write;

use super::parser::{parse_arg, ParsedCommand};
use super::ConsoleError;
use crate::audio::{Destination, ToneControl, ToneKind};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Accepted tone frequency range in Hz
pub const FREQ_RANGE: core::ops::RangeInclusive<f32> = 20.0..=4000.0;

/// Longest cadence half in ms
pub const MAX_CADENCE_MS: u32 = 60_000;

/// Highest accepted destination gain
pub const MAX_GAIN: f32 = 4.0;

/// Handler arguments
pub struct Context<'a> {
    pub engine: &'a mut dyn ToneControl,
    pub now_us: u64,
    pub out: &'a mut dyn Write,
}

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub usage: &'static str,
    pub brief: &'static str,
    pub handler: fn(&ParsedCommand<'_>, &mut Context<'_>) -> Result<(), ConsoleError>,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", usage: "help [cmd]", brief: "List commands", handler: cmd_help },
    CommandDescriptor { name: "tone", usage: "tone <hz|dial|ringback|busy> [pulse]", brief: "Start a tone", handler: cmd_tone },
    CommandDescriptor { name: "noise", usage: "noise <0..1>", brief: "Line hiss only", handler: cmd_noise },
    CommandDescriptor { name: "stop", usage: "stop", brief: "Stop the tone", handler: cmd_stop },
    CommandDescriptor { name: "click", usage: "click", brief: "Hook click", handler: cmd_click },
    CommandDescriptor { name: "cadence", usage: "cadence <on_ms> <off_ms>", brief: "Set pulse timing", handler: cmd_cadence },
    CommandDescriptor { name: "gain", usage: "gain <handset|base> <0..4>", brief: "Set output gain", handler: cmd_gain },
    CommandDescriptor { name: "stats", usage: "stats", brief: "Engine statistics", handler: cmd_stats },
    CommandDescriptor { name: "version", usage: "version", brief: "Firmware version", handler: cmd_version },
];

/// Execute a parsed command
pub fn execute(cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    if cmd.is_empty() {
        return Ok(());
    }

    let desc = COMMANDS
        .iter()
        .find(|c| c.name == cmd.command)
        .ok_or(ConsoleError::UnknownCommand)?;
    if cmd.overflow {
        return Err(ConsoleError::TooManyArgs);
    }

    (desc.handler)(cmd, ctx)
}

/// All command names
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|c| c.name)
}

fn ensure_enabled(ctx: &Context<'_>) -> Result<(), ConsoleError> {
    if ctx.engine.stats().fault.active {
        Err(ConsoleError::EngineDisabled)
    } else {
        Ok(())
    }
}

// --- Command Implementations ---

fn cmd_help(cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    if let Some(name) = cmd.arg(0) {
        let c = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .ok_or(ConsoleError::UnknownCommand)?;
        let _ = writeln!(ctx.out, "{}: {}", c.usage, c.brief);
    } else {
        for c in COMMANDS {
            let _ = writeln!(ctx.out, "  {:<38} {}", c.usage, c.brief);
        }
    }
    Ok(())
}

fn cmd_tone(cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    let what = cmd.arg(0).ok_or(ConsoleError::MissingArg)?;
    ensure_enabled(ctx)?;

    if let Some(kind) = ToneKind::parse(what) {
        if cmd.arg(1).is_some() {
            return Err(ConsoleError::InvalidValue);
        }
        ctx.engine.start_preset(kind, ctx.now_us);
        let _ = writeln!(ctx.out, "tone {}", what);
        return Ok(());
    }

    let hz: f32 = parse_arg(cmd, 0)?;
    if !FREQ_RANGE.contains(&hz) {
        return Err(ConsoleError::OutOfRange);
    }
    let pulsing = match cmd.arg(1) {
        None => false,
        Some("pulse") => true,
        Some(_) => return Err(ConsoleError::InvalidValue),
    };

    ctx.engine.start(hz, pulsing, ctx.now_us);
    let _ = writeln!(ctx.out, "tone {} Hz{}", hz, if pulsing { " pulse" } else { "" });
    Ok(())
}

fn cmd_noise(cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    let level: f32 = parse_arg(cmd, 0)?;
    if !(0.0..=1.0).contains(&level) {
        return Err(ConsoleError::OutOfRange);
    }
    ensure_enabled(ctx)?;

    ctx.engine.start_noise_only(level, ctx.now_us);
    let _ = writeln!(ctx.out, "noise {}", level);
    Ok(())
}

fn cmd_stop(_cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    ensure_enabled(ctx)?;
    ctx.engine.stop(ctx.now_us);
    let _ = writeln!(ctx.out, "stopped");
    Ok(())
}

fn cmd_click(_cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    ensure_enabled(ctx)?;
    ctx.engine.trigger_click();
    let _ = writeln!(ctx.out, "click");
    Ok(())
}

fn cmd_cadence(cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    let on_ms: u32 = parse_arg(cmd, 0)?;
    let off_ms: u32 = parse_arg(cmd, 1)?;
    if on_ms == 0 || on_ms > MAX_CADENCE_MS || off_ms > MAX_CADENCE_MS {
        return Err(ConsoleError::OutOfRange);
    }
    ensure_enabled(ctx)?;

    ctx.engine.set_pulse_timing(on_ms, off_ms);
    let _ = writeln!(ctx.out, "cadence {}/{} ms", on_ms, off_ms);
    Ok(())
}

fn cmd_gain(cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    let dest = cmd.arg(0).ok_or(ConsoleError::MissingArg)?;
    let dest = Destination::parse(dest).ok_or(ConsoleError::InvalidValue)?;
    let gain: f32 = parse_arg(cmd, 1)?;
    if !(0.0..=MAX_GAIN).contains(&gain) {
        return Err(ConsoleError::OutOfRange);
    }
    ensure_enabled(ctx)?;

    if !ctx.engine.set_destination_gain(dest, gain) {
        return Err(ConsoleError::OutOfRange);
    }
    let _ = writeln!(ctx.out, "gain {}={}", dest.as_str(), gain);
    Ok(())
}

fn cmd_stats(_cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    let s = ctx.engine.stats();
    let _ = writeln!(ctx.out, "destination: {}", s.destination.as_str());
    let _ = writeln!(ctx.out, "frames: {} generated, {} silent", s.generated, s.silent);
    let _ = writeln!(
        ctx.out,
        "delivery: {} sent, {} partial, {} dropped, {} bytes",
        s.delivery.sent, s.delivery.partial, s.delivery.dropped, s.delivery.bytes
    );
    if s.fault.active {
        let _ = writeln!(ctx.out, "fault: {} ({}), count {}", s.fault.code.as_str(), s.fault.data, s.fault.count);
    } else {
        let _ = writeln!(ctx.out, "fault: none");
    }
    Ok(())
}

fn cmd_version(_cmd: &ParsedCommand<'_>, ctx: &mut Context<'_>) -> Result<(), ConsoleError> {
    let _ = writeln!(ctx.out, "{}", VERSION);
    Ok(())
}
