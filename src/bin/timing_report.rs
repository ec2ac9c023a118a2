use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use narration_sync::{
    EngineConfig, PlaybackSession, PositionLookupTable, SearchStats, TimingDiagnostics,
    TimingDocument,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[path = "timing_report/json_report_formatter.rs"]
mod json_report_formatter;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Parser)]
#[command(name = "timing_report")]
#[command(about = "Validate a narration timing document and simulate highlight playback")]
struct Args {
    /// Timing document (flat or nested under "timing").
    document: PathBuf,
    #[arg(long, env = "NARRATION_SYNC_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides the configured playback cadence.
    #[arg(long, env = "NARRATION_SYNC_FRAME_MS")]
    frame_ms: Option<u64>,
    /// Overrides the configured lookup table interval.
    #[arg(long, env = "NARRATION_SYNC_LOOKUP_INTERVAL_MS")]
    lookup_interval_ms: Option<u64>,
    #[arg(long, env = "NARRATION_SYNC_LOOKUP_OUT")]
    lookup_out: Option<PathBuf>,
    /// Report destination; stdout when omitted.
    #[arg(long, env = "NARRATION_SYNC_REPORT_OUT")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Report {
    schema_version: u32,
    meta: Meta,
    diagnostics: TimingDiagnostics,
    playback: PlaybackSimulation,
    #[serde(skip_serializing_if = "Option::is_none")]
    lookup: Option<LookupSummary>,
}

#[derive(Debug, Serialize)]
struct Meta {
    generated_at: String,
    document: String,
    document_version: Option<String>,
    declared_total_duration_ms: Option<u64>,
    frame_interval_ms: u64,
    locality_probe_span: usize,
    duplicate_start_policy: &'static str,
}

#[derive(Debug, Serialize)]
struct PlaybackSimulation {
    frames: u64,
    change_events: u64,
    word_changes: u64,
    sentence_changes: u64,
    search_stats: SearchStats,
}

#[derive(Debug, Serialize)]
struct LookupSummary {
    path: String,
    interval_ms: u64,
    entries: usize,
    word_coverage: f32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path).map_err(|err| {
            format!("Failed to load engine config '{}': {err}", path.display())
        })?,
        None => EngineConfig::default(),
    };
    if let Some(frame_ms) = args.frame_ms {
        config.frame_interval_ms = frame_ms;
    }
    if let Some(interval_ms) = args.lookup_interval_ms {
        config.lookup_interval_ms = interval_ms;
    }
    config
        .validate()
        .map_err(|err| format!("Invalid engine settings: {err}"))?;

    let document = TimingDocument::from_path(&args.document).map_err(|err| {
        format!(
            "Failed to ingest timing document '{}': {err}",
            args.document.display()
        )
    })?;
    let document_version = document.version.clone();
    let declared_total_duration_ms = document.declared_total_duration_ms;

    let mut session = PlaybackSession::new(config.clone());
    session
        .load_document(document)
        .map_err(|err| format!("Timing data rejected: {err}"))?;
    let index = session
        .index()
        .cloned()
        .ok_or_else(|| "Session holds no timing index after load".to_string())?;
    tracing::info!(
        words = index.word_count(),
        sentences = index.sentence_count(),
        total_duration_ms = index.total_duration_ms(),
        "loaded timing document"
    );

    let diagnostics = TimingDiagnostics::compute(&index);
    let playback = simulate_playback(&mut session, index.total_duration_ms(), config.frame_interval_ms);
    tracing::info!(
        frames = playback.frames,
        change_events = playback.change_events,
        "simulated playback"
    );

    let lookup = match &args.lookup_out {
        Some(path) => {
            let table = PositionLookupTable::build(&index, config.lookup_interval_ms)
                .map_err(|err| format!("Failed to build lookup table: {err}"))?;
            json_report_formatter::write_json(path, &table)?;
            tracing::info!(path = %path.display(), entries = table.len(), "wrote lookup table");
            Some(LookupSummary {
                path: path.display().to_string(),
                interval_ms: table.interval_ms(),
                entries: table.len(),
                word_coverage: table.word_coverage(),
            })
        }
        None => None,
    };

    let report = Report {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            document: args.document.display().to_string(),
            document_version,
            declared_total_duration_ms,
            frame_interval_ms: config.frame_interval_ms,
            locality_probe_span: config.locality_probe_span,
            duplicate_start_policy: config.duplicate_start_policy.as_str(),
        },
        diagnostics,
        playback: PlaybackSimulation {
            search_stats: index.search_stats(),
            ..playback
        },
        lookup,
    };

    match &args.output {
        Some(path) => json_report_formatter::write_json(path, &report),
        None => json_report_formatter::print_json(&report),
    }
}

/// Drives the session the way a 60 Hz position callback would.
fn simulate_playback(
    session: &mut PlaybackSession,
    total_duration_ms: u64,
    frame_interval_ms: u64,
) -> PlaybackSimulation {
    let mut sim = PlaybackSimulation {
        frames: 0,
        change_events: 0,
        word_changes: 0,
        sentence_changes: 0,
        search_stats: SearchStats::default(),
    };
    let mut previous = (None, None);
    let mut position = 0u64;
    while position <= total_duration_ms {
        let position_ms = i64::try_from(position).unwrap_or(i64::MAX);
        if let Some(update) = session.on_position(position_ms) {
            sim.frames += 1;
            if update.changed {
                sim.change_events += 1;
                if update.word_index != previous.0 {
                    sim.word_changes += 1;
                }
                if update.sentence_index != previous.1 {
                    sim.sentence_changes += 1;
                }
                previous = (update.word_index, update.sentence_index);
            }
        }
        position += frame_interval_ms;
    }
    sim
}
