use crate::{
    playback::AudioSink,
    waveform::{SampleBuffer, SAMPLE_RATE_HZ},
};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, Device, FromSample, OutputCallbackInfo, Sample, SampleFormat, SampleRate,
    SizedSample, Stream, StreamConfig,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc, RwLock,
    },
    thread,
    time::Duration,
};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

struct OutputDevice {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
}

impl OutputDevice {
    fn new() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        log::info!("cpal host: {}", host.id().name());
        let device = host
            .default_output_device()
            .ok_or(anyhow::anyhow!("no output device"))?;
        if let Ok(name) = device.name() {
            log::info!("cpal device: {}", name);
        } else {
            log::info!("cpal device: (no name)");
        }
        let default_config = device.default_output_config()?;
        log::info!("sample format: {}", default_config.sample_format());
        log::info!("num channels: {}", default_config.channels());
        // Notes are always rendered at this rate so ask the device for it rather than resampling.
        let config = StreamConfig {
            channels: default_config.channels(),
            sample_rate: SampleRate(SAMPLE_RATE_HZ),
            buffer_size: BufferSize::Default,
        };
        log::info!("sample rate: {}", config.sample_rate.0);
        Ok(Self {
            device,
            config,
            sample_format: default_config.sample_format(),
        })
    }
}

fn build_stream<T>(
    output: &OutputDevice,
    receiver: mpsc::Receiver<f32>,
    sink_cursor: Arc<RwLock<u64>>,
    stream_failed: Arc<AtomicBool>,
) -> anyhow::Result<Stream>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
{
    let channels = output.config.channels as usize;
    let stream = output.device.build_output_stream(
        &output.config,
        move |data: &mut [T], _: &OutputCallbackInfo| {
            let mut consumed = 0;
            for frame in data.chunks_mut(channels) {
                let value = match receiver.try_recv() {
                    Ok(input) => {
                        consumed += 1;
                        T::from_sample(input)
                    }
                    Err(_) => T::EQUILIBRIUM,
                };
                for element in frame {
                    *element = value;
                }
            }
            if consumed > 0 {
                if let Ok(mut sink_cursor) = sink_cursor.write() {
                    *sink_cursor += consumed;
                }
            }
        },
        move |err| {
            log::error!("stream error: {}", err);
            stream_failed.store(true, Ordering::SeqCst);
        },
        None,
    )?;
    Ok(stream)
}

/// Plays mono 16-bit buffers on the default output device, blocking until the device has
/// consumed every sample.
pub struct CpalAudioSink {
    config: StreamConfig,
    #[allow(unused)]
    stream: Stream,
    sender: mpsc::Sender<f32>,
    sink_cursor: Arc<RwLock<u64>>,
    stream_failed: Arc<AtomicBool>,
    source_cursor: u64,
    volume_scale: f32,
}

impl CpalAudioSink {
    pub fn new(volume_scale: f64) -> anyhow::Result<Self> {
        let output = OutputDevice::new()?;
        let (sender, receiver) = mpsc::channel::<f32>();
        let sink_cursor = Arc::new(RwLock::new(0));
        let stream_failed = Arc::new(AtomicBool::new(false));
        let sink_cursor_for_cpal_thread = Arc::clone(&sink_cursor);
        let stream_failed_for_cpal_thread = Arc::clone(&stream_failed);
        let stream = match output.sample_format {
            SampleFormat::I16 => build_stream::<i16>(
                &output,
                receiver,
                sink_cursor_for_cpal_thread,
                stream_failed_for_cpal_thread,
            )?,
            SampleFormat::F32 => build_stream::<f32>(
                &output,
                receiver,
                sink_cursor_for_cpal_thread,
                stream_failed_for_cpal_thread,
            )?,
            other => anyhow::bail!("unsupported sample format: {}", other),
        };
        stream.play()?;
        Ok(Self {
            config: output.config,
            stream,
            sender,
            sink_cursor,
            stream_failed,
            source_cursor: 0,
            volume_scale: volume_scale as f32,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn sink_cursor(&self) -> anyhow::Result<u64> {
        self.sink_cursor
            .read()
            .map(|sink_cursor| *sink_cursor)
            .map_err(|_| anyhow::anyhow!("audio thread panicked"))
    }

    fn send_sample(&mut self, sample: i16) -> anyhow::Result<()> {
        let value = f32::from_sample(sample) * self.volume_scale;
        if self.sender.send(value).is_err() {
            anyhow::bail!("failed to send data to cpal thread");
        }
        self.source_cursor += 1;
        Ok(())
    }
}

impl AudioSink for CpalAudioSink {
    fn play(&mut self, buffer: &SampleBuffer) -> anyhow::Result<()> {
        if buffer.sample_rate_hz() != self.sample_rate() {
            anyhow::bail!(
                "buffer sample rate {} does not match stream sample rate {}",
                buffer.sample_rate_hz(),
                self.sample_rate()
            );
        }
        for &sample in buffer.samples() {
            self.send_sample(sample)?;
        }
        while self.sink_cursor()? < self.source_cursor {
            if self.stream_failed.load(Ordering::SeqCst) {
                anyhow::bail!("audio stream failed during playback");
            }
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }
}
