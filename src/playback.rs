use crate::waveform::{Generator, Note, SampleBuffer, WaveShape};

/// Plays a buffer, returning once playback has finished
pub trait AudioSink {
    fn play(&mut self, buffer: &SampleBuffer) -> anyhow::Result<()>;
}

/// Draws the most recently played buffer
pub trait DisplaySink {
    fn show(&mut self, buffer: &SampleBuffer);
}

/// Renders a note per key press, plays it and then displays it, in that order.
pub struct PlaybackTrigger<A, D> {
    generator: Generator,
    audio: A,
    display: D,
}

impl<A: AudioSink, D: DisplaySink> PlaybackTrigger<A, D> {
    pub fn new(audio: A, display: D) -> Self {
        Self::with_generator(Generator::default(), audio, display)
    }

    pub fn with_generator(generator: Generator, audio: A, display: D) -> Self {
        Self {
            generator,
            audio,
            display,
        }
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Blocks until the note has finished playing. The display is only updated if playback
    /// succeeded.
    pub fn play_key(&mut self, frequency_hz: f64, shape: WaveShape) -> anyhow::Result<()> {
        let note = Note {
            frequency_hz,
            duration_s: self.generator.duration_s,
        };
        let buffer = self.generator.render(shape, note);
        self.play_buffer(buffer)
    }

    /// Like `play_key` but does nothing if `shape_name` isn't a supported waveform.
    pub fn play_key_named(&mut self, frequency_hz: f64, shape_name: &str) -> anyhow::Result<()> {
        match self.generator.generate_named(shape_name, frequency_hz) {
            Some(buffer) => self.play_buffer(buffer),
            None => {
                log::debug!("ignoring key press for unsupported waveform {:?}", shape_name);
                Ok(())
            }
        }
    }

    fn play_buffer(&mut self, buffer: SampleBuffer) -> anyhow::Result<()> {
        log::debug!(
            "playing {} samples at {} Hz",
            buffer.len(),
            buffer.sample_rate_hz()
        );
        self.audio.play(&buffer)?;
        self.display.show(&buffer);
        Ok(())
    }
}
