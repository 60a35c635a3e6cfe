//! Audio cues
//!
//! The engine emits one-shot `SoundEffect`s and starts/stops a background
//! music bed around each round. On the web both are synthesized with Web
//! Audio oscillators; everywhere else, or when no audio context can be
//! created, `SilentAudio` swallows them.

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Target destroyed
    Quack,
    /// Armored target absorbed a hit
    ArmorClank,
    /// Round begins
    RoundStart,
    /// Round timer ran out
    RoundEnd,
    /// Final round over
    GameEnd,
}

pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Begin the background music loop (no-op if already playing)
    fn start_music(&mut self) {}

    /// Silence the background music (no-op if not playing)
    fn stop_music(&mut self) {}

    /// Pick up volume and mute changes
    fn apply_settings(&mut self, _settings: &Settings) {}
}

/// No-op sink
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Sink that remembers what it was asked to play
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    pub played: Vec<SoundEffect>,
    pub music_playing: bool,
    /// Times the music went from silent to playing
    pub music_starts: u32,
    /// Music loudness after master volume, music volume and mute
    pub music_level: f32,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.played.push(effect);
    }

    fn start_music(&mut self) {
        if !self.music_playing {
            self.music_playing = true;
            self.music_starts += 1;
        }
    }

    fn stop_music(&mut self) {
        self.music_playing = false;
    }

    fn apply_settings(&mut self, settings: &Settings) {
        self.music_level = music_level(settings);
    }
}

/// Music gain for the given settings
pub fn music_level(settings: &Settings) -> f32 {
    if settings.muted {
        0.0
    } else {
        (settings.master_volume * settings.music_volume).clamp(0.0, 1.0)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect, music_level};
    use crate::settings::Settings;

    /// Drone voices of the music bed (root, fifth, octave)
    const MUSIC_VOICES: [(f32, OscillatorType); 3] = [
        (110.0, OscillatorType::Triangle),
        (164.81, OscillatorType::Sine),
        (220.0, OscillatorType::Sine),
    ];
    /// Scale applied to the music level; the bed sits under the effects
    const MUSIC_GAIN: f32 = 0.06;

    struct MusicBed {
        gain: GainNode,
        voices: Vec<OscillatorNode>,
    }

    /// Procedural Web Audio sink
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
        music_level: f32,
        music: Option<MusicBed>,
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: settings.master_volume,
                sfx_volume: settings.sfx_volume,
                muted: settings.muted,
                music_level: music_level(settings),
                music: None,
            }
        }

        fn build_music(ctx: &AudioContext, level: f32) -> Option<MusicBed> {
            let gain = ctx.create_gain().ok()?;
            gain.gain().set_value(level * MUSIC_GAIN);
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            let mut voices = Vec::with_capacity(MUSIC_VOICES.len());
            for (freq, osc_type) in MUSIC_VOICES {
                let osc = ctx.create_oscillator().ok()?;
                osc.set_type(osc_type);
                osc.frequency().set_value(freq);
                osc.connect_with_audio_node(&gain).ok()?;
                osc.start().ok();
                voices.push(osc);
            }
            Some(MusicBed { gain, voices })
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Nasal two-step honk
        fn play_quack(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 520.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain().set_value_at_time(vol * 0.15, t + 0.06).ok();
            gain.gain().set_value_at_time(vol * 0.3, t + 0.08).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.22)
                .ok();
            osc.frequency().set_value_at_time(520.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(340.0, t + 0.07)
                .ok();
            osc.frequency().set_value_at_time(480.0, t + 0.08).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(300.0, t + 0.2)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }

        /// Short metallic ping
        fn play_armor_clank(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                    .ok();
                osc.frequency().set_value_at_time(900.0, t).ok();
                osc.frequency().set_value_at_time(650.0, t + 0.04).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Triangle) {
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.12).ok();
            }
        }

        /// Rising or falling arpeggio
        fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], step: f64) {
            for (i, freq) in notes.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle)
                else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * step;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + step * 1.8)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + step * 2.0).ok();
            }
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Quack => self.play_quack(ctx, vol),
                SoundEffect::ArmorClank => self.play_armor_clank(ctx, vol),
                SoundEffect::RoundStart => {
                    self.play_arpeggio(ctx, vol, &[392.0, 523.25, 659.25], 0.09)
                }
                SoundEffect::RoundEnd => self.play_arpeggio(ctx, vol, &[659.25, 523.25], 0.12),
                SoundEffect::GameEnd => {
                    self.play_arpeggio(ctx, vol, &[523.25, 659.25, 783.99, 1046.5], 0.12)
                }
            }
        }

        fn start_music(&mut self) {
            if self.music.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            self.music = Self::build_music(ctx, self.music_level);
            if self.music.is_none() {
                log::warn!("Background music unavailable");
            }
        }

        fn stop_music(&mut self) {
            let Some(bed) = self.music.take() else { return };
            for osc in &bed.voices {
                osc.stop().ok();
            }
            bed.gain.disconnect().ok();
        }

        fn apply_settings(&mut self, settings: &Settings) {
            self.master_volume = settings.master_volume.clamp(0.0, 1.0);
            self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
            self.muted = settings.muted;
            self.music_level = music_level(settings);
            if let Some(bed) = &self.music {
                bed.gain.gain().set_value(self.music_level * MUSIC_GAIN);
            }
        }
    }
}
