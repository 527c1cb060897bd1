use std::collections::HashMap;
use std::path::Path;

use kira::manager::backend::DefaultBackend;
use kira::manager::{AudioManager, AudioManagerSettings};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::tween::Tween;
use kira::Volume;
use tracing::{info, warn};

/// A looping sound that can be paused, resumed and faded. Volume is linear amplitude.
pub trait SoundChannel {
    fn play(&mut self);
    fn pause(&mut self);
    /// Seeks to the start and plays.
    fn restart(&mut self);
    fn is_paused(&self) -> bool;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
}

/// Owns the output device and decoded sound data. Without a device every
/// channel request returns `None` and the game stays silent.
pub struct AudioContext {
    manager: Option<AudioManager>,
    sounds: HashMap<String, StaticSoundData>,
}

impl AudioContext {
    pub fn new() -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(manager) => Some(manager),
            Err(error) => {
                warn!(error = %error, "audio_unavailable");
                None
            }
        };
        Self {
            manager,
            sounds: HashMap::new(),
        }
    }

    /// A context that never touches an output device.
    pub fn silent() -> Self {
        Self {
            manager: None,
            sounds: HashMap::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    /// Missing or undecodable files are logged and skipped.
    pub fn load_sound(&mut self, name: &str, path: &Path) {
        if self.manager.is_none() {
            return;
        }
        match StaticSoundData::from_file(path) {
            Ok(sound) => {
                self.sounds.insert(name.to_string(), sound);
            }
            Err(error) => {
                warn!(
                    sound = name,
                    path = %path.display(),
                    error = %error,
                    "sound_load_failed"
                );
            }
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.sounds.len()
    }

    /// Starts `name` on a looping voice, paused at zero volume.
    pub fn looping(&mut self, name: &str) -> Option<LoopingSound> {
        let manager = self.manager.as_mut()?;
        let data = self.sounds.get(name)?;

        let mut settings = StaticSoundSettings::new().loop_region(0.0..);
        settings.volume = Volume::Amplitude(0.0).into();
        match manager.play(data.clone().with_settings(settings)) {
            Ok(handle) => {
                let mut sound = LoopingSound {
                    handle,
                    paused: false,
                    volume: 0.0,
                };
                sound.pause();
                info!(sound = name, "sound_channel_ready");
                Some(sound)
            }
            Err(error) => {
                warn!(sound = name, error = %error, "sound_play_failed");
                None
            }
        }
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new()
    }
}

pub struct LoopingSound {
    handle: StaticSoundHandle,
    paused: bool,
    volume: f32,
}

impl SoundChannel for LoopingSound {
    fn play(&mut self) {
        if !self.paused {
            return;
        }
        let _ = self.handle.resume(Tween::default());
        self.paused = false;
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        let _ = self.handle.pause(Tween::default());
        self.paused = true;
    }

    fn restart(&mut self) {
        let _ = self.handle.seek_to(0.0);
        self.paused = true;
        self.play();
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        let _ = self
            .handle
            .set_volume(Volume::Amplitude(volume as f64), Tween::default());
    }
}
