use std::fmt;
use std::path::Path;

/// Volume the background track is played at.
#[cfg(feature = "audio")]
const MUSIC_VOLUME: f32 = 0.5;

/// Something that can start and stop a looping track.
trait Playback: fmt::Debug {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Background track kept in step with the scene's music flag.
#[derive(Debug)]
pub(crate) struct BackgroundMusic {
    playback: Option<Box<dyn Playback>>,
    playing: bool,
}

impl BackgroundMusic {
    fn silent() -> Self {
        Self {
            playback: None,
            playing: false,
        }
    }

    #[cfg(any(test, feature = "audio"))]
    fn with_playback(playback: Box<dyn Playback>) -> Self {
        Self {
            playback: Some(playback),
            playing: false,
        }
    }

    /// Loads the track at `path`, falling back to silence when it cannot be played.
    #[cfg(feature = "audio")]
    pub(crate) async fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::silent();
        };
        let Some(path_str) = path.to_str() else {
            log::warn!("music path {} is not valid UTF-8", path.display());
            return Self::silent();
        };

        match macroquad::audio::load_sound(path_str).await {
            Ok(sound) => {
                log::info!("loaded background music from {}", path.display());
                Self::with_playback(Box::new(MacroquadPlayback { sound }))
            }
            Err(error) => {
                log::warn!("no background music found at {}: {error:?}", path.display());
                Self::silent()
            }
        }
    }

    /// Loads the track at `path`, falling back to silence when it cannot be played.
    #[cfg(not(feature = "audio"))]
    pub(crate) async fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            log::warn!(
                "built without the `audio` feature; ignoring music at {}",
                path.display()
            );
        }
        Self::silent()
    }

    /// Starts or stops the track so that it matches `enabled`.
    pub(crate) fn sync(&mut self, enabled: bool) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };

        if enabled && !self.playing {
            playback.start();
            self.playing = true;
        } else if !enabled && self.playing {
            playback.stop();
            self.playing = false;
        }
    }
}

#[cfg(feature = "audio")]
struct MacroquadPlayback {
    sound: macroquad::audio::Sound,
}

#[cfg(feature = "audio")]
impl fmt::Debug for MacroquadPlayback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroquadPlayback").finish_non_exhaustive()
    }
}

#[cfg(feature = "audio")]
impl Playback for MacroquadPlayback {
    fn start(&mut self) {
        macroquad::audio::play_sound(
            self.sound,
            macroquad::audio::PlaySoundParams {
                looped: true,
                volume: MUSIC_VOLUME,
            },
        );
    }

    fn stop(&mut self) {
        macroquad::audio::stop_sound(self.sound);
    }
}
