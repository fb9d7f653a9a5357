//! Prints the raid-block status and monument table for a configuration file, and
//! optionally evaluates a raid and a PvP attack at a world position.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use raidguard::config::ConfigLoader;
use raidguard::policy::{
    Biome, Landmark, NeverDecays, OverrideCommand, PolicyContext, UniformSplatMap, Victim,
};
use raidguard::primitives::{ActorId, Clock, Position, SystemClock, TargetId, WorldBounds};
use raidguard::telemetry::{TelemetryConfig, audit, init_tracing};
use raidguard::{PolicyDecision, PolicyDecisionEngine, PolicyEngine, PolicyRequest};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "raid-status", about = "Inspect raid blocking and PvP zones")]
struct Args {
    /// JSON configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate at this instant (RFC 3339) instead of now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Admin override: on, off or reset.
    #[arg(long = "override")]
    override_command: Option<OverrideCommand>,

    /// Side length of the square world.
    #[arg(long, default_value_t = 4000.0)]
    world_size: f32,

    /// Biome covering the whole map.
    #[arg(long)]
    biome: Option<String>,

    /// Landmark as `name@x,z`. Repeatable.
    #[arg(long = "landmark", value_parser = parse_landmark)]
    landmarks: Vec<Landmark>,

    /// Position to evaluate a raid and a PvP attack at, as `x,z`.
    #[arg(long, value_parser = parse_position)]
    at_position: Option<Position>,

    /// Emit the status as JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_position(raw: &str) -> Result<Position, String> {
    let (x, z) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,z`, got `{raw}`"))?;
    let x = x.trim().parse::<f32>().map_err(|err| err.to_string())?;
    let z = z.trim().parse::<f32>().map_err(|err| err.to_string())?;
    Ok(Position::new(x, 0.0, z))
}

fn parse_landmark(raw: &str) -> Result<Landmark, String> {
    let (name, position) = raw
        .split_once('@')
        .ok_or_else(|| format!("expected `name@x,z`, got `{raw}`"))?;
    Ok(Landmark::from_prefab(name, parse_position(position)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&TelemetryConfig::default().with_verbosity(args.verbose));

    let config = match &args.config {
        Some(path) => {
            let loaded = ConfigLoader::new()
                .load_path(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?;
            for warning in &loaded.warnings {
                warn!(%warning, "configuration fallback");
            }
            loaded.config
        }
        None => raidguard::policy::EngineConfig::default(),
    };

    let mut terrain = UniformSplatMap::new(WorldBounds::centered(args.world_size)?);
    if let Some(name) = &args.biome {
        let Some(biome) = Biome::from_name(name) else {
            bail!("unknown biome `{name}`");
        };
        terrain = terrain.with_weight(biome, 1.0);
    }

    let engine = PolicyDecisionEngine::builder()
        .with_config(config)
        .with_splat_sampler(Arc::new(terrain))
        .with_decay_lookup(Arc::new(NeverDecays))
        .with_landmarks(args.landmarks)
        .build()?;
    if let Some(command) = args.override_command {
        engine.apply_override(command);
    }

    let now = args.at.unwrap_or_else(|| SystemClock.now());
    let status = engine.status(now);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", status.raid.summary());
        print!("{}", status.monument_report());
    }

    if let Some(position) = args.at_position {
        evaluate_at(&engine, position, now);
    }
    Ok(())
}

fn evaluate_at(engine: &PolicyDecisionEngine, position: Position, now: DateTime<Utc>) {
    let context = PolicyContext::new(now, position, ActorId::new(1)).with_target(TargetId::new(1));
    let raid = PolicyRequest::raid_on_prefab(context, "wall.stone", true, false);
    let decision = engine.evaluate(&raid);
    audit::record(&raid, &decision, "wall.stone");
    report("raid on a foreign wall", &decision);

    let pvp = PolicyRequest::interact(context, Victim::Actor { id: ActorId::new(2) });
    let decision = engine.evaluate(&pvp);
    info!(zones = ?engine.diagnose(position, now), "zones at position");
    report("attack on another player", &decision);
}

fn report(label: &str, decision: &PolicyDecision) {
    let verdict = if decision.is_allow() { "allowed" } else { "blocked" };
    match decision.message() {
        Some(message) => println!("{label}: {verdict} ({}) {message}", decision.reason()),
        None => println!("{label}: {verdict} ({})", decision.reason()),
    }
}
