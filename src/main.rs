//! Duckshot entry point
//!
//! On the web this boots the browser host. Natively it plays a headless
//! session with a scripted shooter against the virtual-clock scheduler and
//! prints the final HUD.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result, bail};
    use clap::Parser;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use duckshot::consts::ROUND_TIME_SECS;
    use duckshot::scheduler::ManualScheduler;
    use duckshot::sim::GamePhase;
    use duckshot::submission::{SubmissionReply, SubmitOutcome};
    use duckshot::{Engine, EngineConfig, Settings};

    #[derive(Parser, Debug)]
    #[command(name = "duckshot")]
    #[command(about = "Play a headless duckshot session with a scripted shooter")]
    pub struct Args {
        /// Session seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Chance that a shot is aimed at a live target
        #[arg(long, default_value_t = 0.7)]
        accuracy: f32,
        /// Shots per second
        #[arg(long, default_value_t = 2.0)]
        rate: f32,
        /// Settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long, default_value_t = 800.0)]
        width: f32,
        #[arg(long, default_value_t = 500.0)]
        height: f32,
        /// Print the final HUD as JSON
        #[arg(long)]
        json: bool,
    }

    type Headless = Engine<ManualScheduler>;

    /// Fastest shooter: a thousand shots per second
    const MIN_SHOT_INTERVAL: Duration = Duration::from_millis(1);
    /// Slowest shooter: one shot per round
    const MAX_SHOT_INTERVAL: Duration = Duration::from_secs(ROUND_TIME_SECS as u64);

    /// Virtual time between shots. Rates whose period would not fit a
    /// session-sized `Duration` are rejected.
    pub(crate) fn shot_interval(rate: f32) -> Result<Duration> {
        if !rate.is_finite() || rate <= 0.0 {
            bail!("rate must be a positive number of shots per second");
        }
        let step = Duration::try_from_secs_f32(1.0 / rate)
            .with_context(|| format!("rate {rate} gives no representable shot interval"))?;
        if !(MIN_SHOT_INTERVAL..=MAX_SHOT_INTERVAL).contains(&step) {
            bail!(
                "rate {rate} is out of range: one shot every {:.6}s, allowed {}ms..={}s",
                step.as_secs_f64(),
                MIN_SHOT_INTERVAL.as_millis(),
                MAX_SHOT_INTERVAL.as_secs()
            );
        }
        Ok(step)
    }

    pub fn run(args: Args) -> Result<()> {
        if !(0.0..=1.0).contains(&args.accuracy) {
            bail!("accuracy must be within 0..=1, got {}", args.accuracy);
        }
        let step = shot_interval(args.rate)?;

        let settings = match &args.settings {
            Some(path) => Settings::load_from(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        let seed = args.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        });

        let submitted = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&submitted);
        let mut engine = Engine::new(
            ManualScheduler::new(),
            EngineConfig {
                seed,
                width: args.width,
                height: args.height,
            },
            move |score: u64, reply: SubmissionReply| {
                *sink.borrow_mut() = Some(score);
                reply.resolve(Ok(SubmitOutcome::accepted(format!(
                    "Final score {score} recorded"
                ))));
            },
            || log::info!("Login requested"),
        )
        .with_settings(settings);

        let mut shooter = Pcg32::seed_from_u64(seed ^ 0x5EED);

        engine.start()?;
        loop {
            match engine.phase() {
                GamePhase::Playing => {
                    engine.advance_clock(step);
                    if engine.phase() == GamePhase::Playing {
                        shoot(&mut engine, &mut shooter, args.accuracy);
                    }
                }
                GamePhase::RoundEnd => {
                    log::info!(
                        "Round {} done: score {} misses {}",
                        engine.round(),
                        engine.score(),
                        engine.state().scoring.misses
                    );
                    engine.advance_round()?;
                }
                GamePhase::GameEnd => break,
                GamePhase::Start => bail!("session returned to the start screen unexpectedly"),
            }
        }

        let hud = engine.hud();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&hud)?);
        } else {
            println!("=== SESSION RESULTS ===");
            println!("  Seed:       {seed}");
            println!("  Score:      {}", hud.score);
            println!("  Hits:       {}", hud.hits);
            println!("  Misses:     {}", hud.misses);
            println!("  Max streak: {}", hud.max_streak);
            if let Some(accuracy) = hud.accuracy {
                println!("  Accuracy:   {:.1}%", accuracy * 100.0);
            }
            if let Some(score) = *submitted.borrow() {
                println!("  Submitted:  {score}");
            }
        }
        Ok(())
    }

    /// Fire once: at the newest live target, or into the water on a miss roll
    fn shoot(engine: &mut Headless, rng: &mut Pcg32, accuracy: f32) {
        let aimed = rng.random::<f32>() < accuracy;
        let state = engine.state();
        let target = state
            .targets
            .iter()
            .rev()
            .find(|t| !t.destroyed)
            .map(|t| t.pos);
        let point = match (aimed, target) {
            (true, Some(pos)) => pos,
            _ => {
                let vp = state.viewport;
                Vec2::new(rng.random::<f32>() * vp.width, vp.height - 1.0)
            }
        };
        engine.handle_click(point.x, point.y);
    }

}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    duckshot::platform::web::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    headless::run(headless::Args::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
