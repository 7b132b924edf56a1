pub mod app;
pub mod args;
pub mod audio;
pub mod music;
pub mod playback;
pub mod scope;
pub mod signal;
pub mod waveform;
pub mod wrap;

pub use playback::{AudioSink, DisplaySink, PlaybackTrigger};
pub use waveform::{generate, generate_named, Generator, Note, SampleBuffer, WaveShape};
