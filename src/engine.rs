//! Round and session lifecycle
//!
//! `Engine` owns the game state and the two cadences of a running round.
//! Hosts drive it with lifecycle calls (`start`, `advance_round`, `reset`),
//! pointer clicks, and cadence firings routed back through `on_cadence`.
//!
//! Cadence rules:
//! - at most one frame and one countdown cadence are armed at a time
//! - leaving Playing cancels both before anything else happens
//! - a firing whose handle is no longer armed is ignored

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, SilentAudio, SoundEffect};
use crate::consts::*;
use crate::error::{Action, EngineError};
use crate::renderer::{DrawSurface, Frame, SceneInputs, compose};
use crate::scheduler::{Cadence, CadenceHandle, ManualScheduler, Scheduler};
use crate::settings::Settings;
use crate::sim::{
    Countdown, GamePhase, GameRng, GameState, HitOutcome, RandomSource, ScoreTracker, Target,
    Viewport, countdown, tick,
};
use crate::submission::{LoginRequester, ScoreSubmitter, SubmissionStatus, SubmissionTracker};

/// Construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed for spawns and decoration
    pub seed: u64,
    pub width: f32,
    pub height: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let vp = Viewport::default();
        Self {
            seed: 0,
            width: vp.width,
            height: vp.height,
        }
    }
}

/// Serializable status snapshot for host UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub score: u64,
    pub round: u32,
    pub total_rounds: u32,
    pub time_remaining: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub hits: u32,
    pub misses: u32,
    pub accuracy: Option<f32>,
    pub submission: SubmissionStatus,
}

pub struct Engine<S: Scheduler> {
    state: GameState,
    rng: Box<dyn RandomSource>,
    scheduler: S,
    frame: Option<CadenceHandle>,
    countdown: Option<CadenceHandle>,
    submitter: Box<dyn ScoreSubmitter>,
    login: Box<dyn LoginRequester>,
    audio: Box<dyn AudioSink>,
    surface: Option<Box<dyn DrawSurface>>,
    settings: Settings,
    submission: SubmissionTracker,
    /// Held only while `enter_round` runs. Nothing inside it calls back into
    /// the engine, so no caller ever sees it held; a re-entrant round start
    /// would get `RoundStartInProgress`.
    entering_round: bool,
}

impl<S: Scheduler> Engine<S> {
    pub fn new(
        scheduler: S,
        config: EngineConfig,
        submitter: impl ScoreSubmitter + 'static,
        login: impl LoginRequester + 'static,
    ) -> Self {
        let mut rng: Box<dyn RandomSource> = Box::new(GameRng::new(config.seed));
        let viewport = Viewport::new(config.width, config.height);
        let state = GameState::new(viewport, &mut *rng);
        log::info!(
            "Engine ready: {}x{} seed={}",
            viewport.width,
            viewport.height,
            config.seed
        );
        Self {
            state,
            rng,
            scheduler,
            frame: None,
            countdown: None,
            submitter: Box::new(submitter),
            login: Box::new(login),
            audio: Box::new(SilentAudio),
            surface: None,
            settings: Settings::default(),
            submission: SubmissionTracker::new(),
            entering_round: false,
        }
    }

    /// Replace the randomness source; the idle scene is rebuilt from it
    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self.state = GameState::new(self.state.viewport, &mut *self.rng);
        self
    }

    pub fn with_surface(mut self, surface: impl DrawSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self.redraw();
        self
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self.audio.apply_settings(&self.settings);
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.set_settings(settings);
        self
    }

    // === Lifecycle ===

    /// Begin a session at round 1. Only valid from Start.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.expect_phase(GamePhase::Start, Action::Start)?;
        self.state.scoring = ScoreTracker::new();
        self.submission.reset();
        log::info!("Session started");
        self.enter_round(1)
    }

    /// Move from the round summary to the next round
    pub fn advance_round(&mut self) -> Result<(), EngineError> {
        self.expect_phase(GamePhase::RoundEnd, Action::AdvanceRound)?;
        let next = self.state.round_index() + 1;
        self.enter_round(next)
    }

    /// Tear everything down and return to Start. Valid from any phase.
    pub fn reset(&mut self) {
        self.halt_cadences();
        self.audio.stop_music();
        self.entering_round = false;
        self.state.reset_session(&mut *self.rng);
        self.submission.reset();
        log::info!("Session reset");
        self.redraw();
    }

    /// Ask the login collaborator to sign the player in (game-end screen)
    pub fn request_login(&mut self) -> Result<(), EngineError> {
        self.expect_phase(GamePhase::GameEnd, Action::RequestLogin)?;
        log::info!("Login requested");
        self.login.request_login();
        Ok(())
    }

    /// Stop all cadences. The engine stays usable; a later `start` or
    /// `reset` rearms as needed.
    pub fn teardown(&mut self) {
        self.halt_cadences();
        self.audio.stop_music();
        log::debug!("Engine torn down");
    }

    fn expect_phase(&self, phase: GamePhase, action: Action) -> Result<(), EngineError> {
        if self.state.phase == phase {
            return Ok(());
        }
        let err = EngineError::InvalidTransition {
            from: self.state.phase,
            action,
        };
        log::warn!("Rejected transition: {err}");
        Err(err)
    }

    fn enter_round(&mut self, index: u32) -> Result<(), EngineError> {
        if self.entering_round {
            log::warn!("Round {index} start ignored: already entering a round");
            return Err(EngineError::RoundStartInProgress { round: index });
        }
        self.entering_round = true;

        // Never stack cadences
        self.halt_cadences();
        self.state.begin_round(index, &mut *self.rng);
        self.frame = Some(self.scheduler.arm(Cadence::Frame, FRAME_PERIOD));
        self.countdown = Some(self.scheduler.arm(Cadence::Countdown, COUNTDOWN_PERIOD));

        self.audio.play(SoundEffect::RoundStart);
        self.audio.start_music();
        log::info!("Round {index}/{TOTAL_ROUNDS} started");
        self.redraw();

        self.entering_round = false;
        Ok(())
    }

    /// Countdown hit zero: close the round and decide what comes next
    fn finish_round(&mut self) {
        self.halt_cadences();
        self.audio.stop_music();
        let round = self.state.round_index();
        let is_final = self.state.round.is_final();
        self.state.end_round();

        if is_final {
            self.state.phase = GamePhase::GameEnd;
            self.audio.play(SoundEffect::GameEnd);
            log::info!("Game over: final score {}", self.state.scoring.score);
            self.submit_final_score();
        } else {
            self.state.phase = GamePhase::RoundEnd;
            self.audio.play(SoundEffect::RoundEnd);
            log::info!(
                "Round {round} complete: score {}",
                self.state.scoring.score
            );
        }
        self.redraw();
    }

    fn submit_final_score(&mut self) {
        let score = self.state.scoring.score;
        match self.submission.begin(score) {
            Some(reply) => self.submitter.submit_score(score, reply),
            None => log::debug!("Score already submitted this session"),
        }
    }

    fn halt_cadences(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.countdown.take() {
            self.scheduler.cancel(handle);
        }
    }

    // === Inputs ===

    /// Route a cadence firing. Stale handles are ignored.
    pub fn on_cadence(&mut self, handle: CadenceHandle) {
        if self.frame == Some(handle) {
            self.on_frame();
        } else if self.countdown == Some(handle) {
            self.on_countdown();
        } else {
            log::trace!("Ignoring stale {:?} firing #{}", handle.cadence, handle.id);
        }
    }

    fn on_frame(&mut self) {
        let report = tick(&mut self.state, &mut *self.rng, FRAME_DT);
        if let Some(id) = report.spawned {
            log::trace!("Frame {}: spawned #{id}", self.state.time_ticks);
        }
        self.redraw();
    }

    fn on_countdown(&mut self) {
        match countdown(&mut self.state) {
            Countdown::Expired => self.finish_round(),
            Countdown::Running { remaining } => log::trace!("{remaining}s left"),
            Countdown::Idle => {}
        }
    }

    /// Pointer click in surface pixels. Ignored (None) unless a round is running.
    pub fn handle_click(&mut self, x: f32, y: f32) -> Option<HitOutcome> {
        if self.state.phase != GamePhase::Playing || !self.state.round.running {
            return None;
        }
        if !x.is_finite() || !y.is_finite() {
            log::warn!("Ignoring click at non-finite position ({x}, {y})");
            return None;
        }

        let outcome = self.state.apply_click(Vec2::new(x, y));
        match outcome {
            HitOutcome::Destroyed {
                target_id,
                kind,
                points,
            } => {
                log::debug!("Hit #{target_id} ({kind:?}) for {points}");
                self.audio.play(SoundEffect::Quack);
            }
            HitOutcome::ArmorHit {
                target_id,
                hp_remaining,
            } => {
                log::debug!("Armor hit #{target_id}, {hp_remaining} hp left");
                self.audio.play(SoundEffect::ArmorClank);
            }
            HitOutcome::Miss => log::debug!("Miss at ({x:.0}, {y:.0})"),
        }
        Some(outcome)
    }

    /// Put a target on the field directly, bypassing the spawner.
    /// Only takes effect while a round is running.
    pub fn place_target(&mut self, target: Target) -> bool {
        if self.state.phase != GamePhase::Playing || !self.state.round.running {
            return false;
        }
        log::debug!("Placed {:?} target #{}", target.kind, target.id);
        self.state.targets.push(target);
        true
    }

    /// New surface size; clamped to the playable minimum
    pub fn resize(&mut self, width: f32, height: f32) {
        let viewport = Viewport::new(width, height);
        log::debug!("Resize to {}x{}", viewport.width, viewport.height);
        self.state.resize(viewport, &mut *self.rng);
        self.redraw();
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.sanitized();
        self.audio.apply_settings(&self.settings);
        self.redraw();
    }

    // === Output ===

    /// Compose the current scene
    pub fn compose_frame(&self) -> Frame {
        let submission = self.submission.status();
        compose(
            &self.state,
            SceneInputs {
                settings: &self.settings,
                submission: &submission,
            },
        )
    }

    /// Redraw outside the frame cadence (e.g. after a submission resolves)
    pub fn refresh(&mut self) {
        self.redraw();
    }

    fn redraw(&mut self) {
        if self.surface.is_none() {
            return;
        }
        let frame = self.compose_frame();
        if let Some(surface) = self.surface.as_mut()
            && let Err(err) = surface.present(&frame)
        {
            log::warn!("Frame dropped: {err}");
        }
    }

    pub fn hud(&self) -> Hud {
        let scoring = &self.state.scoring;
        Hud {
            phase: self.state.phase,
            score: scoring.score,
            round: self.state.round_index(),
            total_rounds: TOTAL_ROUNDS,
            time_remaining: self.state.round.time_remaining,
            streak: scoring.streak,
            max_streak: scoring.max_streak,
            hits: scoring.hits,
            misses: scoring.misses,
            accuracy: scoring.accuracy(),
            submission: self.submission.status(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.scoring.score
    }

    pub fn round(&self) -> u32 {
        self.state.round_index()
    }

    pub fn time_remaining(&self) -> u32 {
        self.state.round.time_remaining
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.submission.status()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Handles of the armed cadences, if any
    pub fn cadences(&self) -> (Option<CadenceHandle>, Option<CadenceHandle>) {
        (self.frame, self.countdown)
    }
}

impl<S: Scheduler> Drop for Engine<S> {
    fn drop(&mut self) {
        self.halt_cadences();
        self.audio.stop_music();
    }
}

impl Engine<ManualScheduler> {
    /// Advance the virtual clock, firing due cadences in time order.
    /// Returns the number of firings delivered.
    pub fn advance_clock(&mut self, elapsed: Duration) -> usize {
        let until = self.scheduler.now() + elapsed;
        let mut fired = 0;
        while let Some(handle) = self.scheduler.next_due(until) {
            self.on_cadence(handle);
            fired += 1;
        }
        self.scheduler.settle(until);
        fired
    }

    /// Run the current round to its end
    pub fn finish_current_round(&mut self) {
        if self.state.phase == GamePhase::Playing {
            let left = u64::from(self.state.round.time_remaining);
            self.advance_clock(Duration::from_secs(left));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::renderer::FrameCapture;
    use crate::sim::{ScriptedRng, Target, TargetKind};
    use crate::submission::{SubmissionReply, SubmitOutcome};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> Engine<ManualScheduler> {
        Engine::new(
            ManualScheduler::new(),
            EngineConfig::default(),
            |_score: u64, _reply: SubmissionReply| {},
            || {},
        )
    }

    fn place(engine: &mut Engine<ManualScheduler>, kind: TargetKind, x: f32, y: f32) {
        let id = engine.state.next_entity_id();
        let round = engine.round();
        engine
            .state
            .targets
            .push(Target::new(id, kind, round, Vec2::new(x, y), Vec2::ZERO));
    }

    #[test]
    fn test_start_arms_both_cadences() {
        let mut e = engine();
        e.start().unwrap();
        assert_eq!(e.phase(), GamePhase::Playing);
        assert_eq!(e.round(), 1);
        assert_eq!(e.time_remaining(), ROUND_TIME_SECS);
        assert_eq!(e.scheduler().live_of(Cadence::Frame), 1);
        assert_eq!(e.scheduler().live_of(Cadence::Countdown), 1);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut e = engine();
        e.start().unwrap();
        let err = e.start().unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransition {
                from: GamePhase::Playing,
                action: Action::Start
            }
        );
        assert_eq!(e.scheduler().live(), 2);
        assert_eq!(e.scheduler().armed_total(), 2);
    }

    #[test]
    fn test_advance_round_only_from_round_end() {
        let mut e = engine();
        assert!(e.advance_round().is_err());
        e.start().unwrap();
        assert!(e.advance_round().is_err());
        e.finish_current_round();
        assert_eq!(e.phase(), GamePhase::RoundEnd);
        assert_eq!(e.scheduler().live(), 0);
        e.advance_round().unwrap();
        assert_eq!(e.round(), 2);
    }

    #[test]
    fn test_stale_firing_ignored() {
        let mut e = engine();
        e.start().unwrap();
        let (frame, _) = e.cadences();
        let frame = frame.unwrap();
        e.reset();
        e.on_cadence(frame);
        assert_eq!(e.state().time_ticks, 0);
        assert_eq!(e.phase(), GamePhase::Start);
    }

    #[test]
    fn test_click_ignored_outside_playing() {
        let mut e = engine();
        assert_eq!(e.handle_click(10.0, 10.0), None);
        assert_eq!(e.state().scoring.misses, 0);
    }

    #[test]
    fn test_click_plays_cues() {
        let audio = Rc::new(RefCell::new(RecordingAudio::default()));
        let mut e = engine().with_audio(SharedAudio(Rc::clone(&audio)));
        e.start().unwrap();
        place(&mut e, TargetKind::Normal, 200.0, 200.0);
        assert!(matches!(
            e.handle_click(200.0, 200.0),
            Some(HitOutcome::Destroyed { points: 10, .. })
        ));
        assert_eq!(e.score(), 10);
        assert_eq!(
            audio.borrow().played,
            vec![SoundEffect::RoundStart, SoundEffect::Quack]
        );
    }

    #[test]
    fn test_round_entry_guard_is_released() {
        let mut e = engine();
        e.start().unwrap();
        assert!(!e.entering_round);
        e.finish_current_round();
        e.advance_round().unwrap();
        assert!(!e.entering_round);
        assert_eq!(e.round(), 2);
    }

    /// Fails every other present
    struct FlakySurface {
        calls: Rc<RefCell<usize>>,
    }

    impl DrawSurface for FlakySurface {
        fn present(&mut self, _frame: &Frame) -> Result<(), crate::error::RenderError> {
            let mut calls = self.calls.borrow_mut();
            *calls += 1;
            if *calls % 2 == 1 {
                Err(crate::error::RenderError::SurfaceLost)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_dropped_frames_do_not_stop_the_round() {
        let calls = Rc::new(RefCell::new(0));
        let mut e = engine()
            .with_rng(ScriptedRng::constant(0.99))
            .with_surface(FlakySurface {
                calls: Rc::clone(&calls),
            });
        e.start().unwrap();
        e.advance_clock(Duration::from_secs(2));
        assert_eq!(e.phase(), GamePhase::Playing);
        assert_eq!(e.time_remaining(), ROUND_TIME_SECS - 2);
        // One present per frame firing plus construction and round start
        assert_eq!(*calls.borrow(), 2 + e.state().time_ticks as usize);
    }

    #[test]
    fn test_music_follows_the_round() {
        let audio = Rc::new(RefCell::new(RecordingAudio::default()));
        let mut e = engine().with_audio(SharedAudio(Rc::clone(&audio)));
        assert!(!audio.borrow().music_playing);

        e.start().unwrap();
        assert!(audio.borrow().music_playing);
        e.finish_current_round();
        assert!(!audio.borrow().music_playing);

        e.advance_round().unwrap();
        assert!(audio.borrow().music_playing);
        e.reset();
        assert!(!audio.borrow().music_playing);
        assert_eq!(audio.borrow().music_starts, 2);

        e.start().unwrap();
        e.teardown();
        assert!(!audio.borrow().music_playing);
    }

    #[test]
    fn test_music_level_follows_settings() {
        let audio = Rc::new(RefCell::new(RecordingAudio::default()));
        let mut e = engine().with_audio(SharedAudio(Rc::clone(&audio)));
        e.set_settings(Settings {
            master_volume: 1.0,
            music_volume: 0.25,
            ..Settings::default()
        });
        assert!((audio.borrow().music_level - 0.25).abs() < 1e-6);
        e.set_settings(Settings {
            muted: true,
            ..Settings::default()
        });
        assert_eq!(audio.borrow().music_level, 0.0);
    }

    #[test]
    fn test_non_finite_click_ignored() {
        let mut e = engine();
        e.start().unwrap();
        assert_eq!(e.handle_click(f32::NAN, 5.0), None);
        assert_eq!(e.state().scoring.misses, 0);
    }

    #[test]
    fn test_request_login_only_at_game_end() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let mut e = Engine::new(
            ManualScheduler::new(),
            EngineConfig::default(),
            |_score: u64, _reply: SubmissionReply| {},
            move || *counter.borrow_mut() += 1,
        );
        assert!(e.request_login().is_err());
        e.start().unwrap();
        for _ in 0..TOTAL_ROUNDS - 1 {
            e.finish_current_round();
            e.advance_round().unwrap();
        }
        e.finish_current_round();
        assert_eq!(e.phase(), GamePhase::GameEnd);
        e.request_login().unwrap();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_surface_receives_frames() {
        let surface = Rc::new(RefCell::new(FrameCapture::default()));
        let mut e = engine()
            .with_rng(ScriptedRng::constant(0.99))
            .with_surface(Rc::clone(&surface));
        assert_eq!(surface.borrow().presented, 1);
        e.start().unwrap();
        e.advance_clock(Duration::from_millis(100));
        // Round start redraw plus five frames
        assert_eq!(surface.borrow().presented, 7);
        assert!(surface.borrow().last.is_some());
    }

    #[test]
    fn test_resize_clamps_and_regenerates_clouds() {
        let mut e = engine();
        let before = e.state().clouds.clone();
        e.resize(10.0, 10.0);
        assert_eq!(e.state().viewport, Viewport::new(MIN_WIDTH, MIN_HEIGHT));
        assert_ne!(
            e.state().clouds.iter().map(|c| c.pos).collect::<Vec<_>>(),
            before.iter().map(|c| c.pos).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_hud_serializes() {
        let mut e = engine();
        e.start().unwrap();
        let json = serde_json::to_value(e.hud()).unwrap();
        assert_eq!(json["phase"], "Playing");
        assert_eq!(json["round"], 1);
        assert_eq!(json["time_remaining"], ROUND_TIME_SECS);
        assert_eq!(json["submission"]["state"], "not_submitted");
    }

    #[test]
    fn test_submission_resolves_into_hud() {
        let mut e = Engine::new(
            ManualScheduler::new(),
            EngineConfig::default(),
            |score: u64, reply: SubmissionReply| {
                reply.resolve(Ok(SubmitOutcome::accepted(format!("Saved {score}"))));
            },
            || {},
        );
        e.start().unwrap();
        for _ in 0..TOTAL_ROUNDS - 1 {
            e.finish_current_round();
            e.advance_round().unwrap();
        }
        e.finish_current_round();
        assert_eq!(
            e.hud().submission,
            SubmissionStatus::Resolved(SubmitOutcome::accepted("Saved 0"))
        );
    }

    struct SharedAudio(Rc<RefCell<RecordingAudio>>);

    impl AudioSink for SharedAudio {
        fn play(&mut self, effect: SoundEffect) {
            self.0.borrow_mut().play(effect);
        }

        fn start_music(&mut self) {
            self.0.borrow_mut().start_music();
        }

        fn stop_music(&mut self) {
            self.0.borrow_mut().stop_music();
        }

        fn apply_settings(&mut self, settings: &Settings) {
            self.0.borrow_mut().apply_settings(settings);
        }
    }
}
