use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use table_osc::audio::{
    engine::ToneEngine, parameters::ToneParameters, pingpong::PingPongBuffer, to_pcm16,
};
use table_osc::config::ToneConfig;
use table_osc::error::validate_frequency;
use table_osc::midi::handler::MidiHandler;
use table_osc::types::waveform::Waveform;

/// Wave table sine oscillator: live playback or offline WAV rendering
#[derive(Parser, Debug)]
#[command(name = "table-osc")]
#[command(about = "Table lookup oscillator", long_about = None)]
struct Args {
    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// List available devices and exit
    #[arg(short = 'l', long = "list")]
    list_devices: bool,

    /// Tone frequency in Hz (overrides the config file)
    #[arg(short = 'f', long = "frequency", conflicts_with = "note")]
    frequency: Option<f32>,

    /// Tone as a note name, e.g. a4 or c#3 (overrides the config file)
    #[arg(short = 'n', long = "note")]
    note: Option<String>,

    /// Waveform: sine, triangle, sawtooth or square
    #[arg(short = 'w', long = "waveform")]
    waveform: Option<Waveform>,

    /// Render to this WAV file instead of playing live
    #[arg(short = 'r', long = "render")]
    render: Option<PathBuf>,

    /// Length of the offline render in seconds
    #[arg(short = 's', long = "seconds", default_value_t = 2.0)]
    seconds: f32,
}

/// List available audio output devices
fn list_audio_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();

    let devices: Vec<String> = host
        .output_devices()?
        .filter_map(|device| device_name(&device))
        .collect();

    if devices.is_empty() {
        return Err(anyhow!("No audio output devices found"));
    }

    Ok(devices)
}

fn device_name(device: &cpal::Device) -> Option<String> {
    device
        .description()
        .ok()
        .map(|desc| desc.name().to_string())
}

/// Find device index by index string or case-insensitive name substring
fn find_device(kind: &str, devices: &[String], search: &str) -> Result<usize> {
    if let Ok(index) = search.parse::<usize>() {
        if index < devices.len() {
            return Ok(index);
        }
        return Err(anyhow!(
            "{} device index {} out of range (0-{})",
            kind,
            index,
            devices.len().saturating_sub(1)
        ));
    }

    let search_lower = search.to_lowercase();
    devices
        .iter()
        .position(|device| device.to_lowercase().contains(&search_lower))
        .ok_or_else(|| anyhow!("{} device '{}' not found", kind, search))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_devices {
        println!("Available MIDI Input Devices:");
        for (i, device) in MidiHandler::list_devices()?.iter().enumerate() {
            println!("  {}: {}", i, device);
        }
        println!("\nAvailable Audio Output Devices:");
        for (i, device) in list_audio_devices()?.iter().enumerate() {
            println!("  {}: {}", i, device);
        }
        return Ok(());
    }

    let config = load_config(&args)?;

    match &args.render {
        Some(path) => render_offline(&config, path, args.seconds),
        None => run_live(&config),
    }
}

/// Load the config file (or defaults) and apply command line overrides
fn load_config(args: &Args) -> Result<ToneConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            ToneConfig::load(path)?
        }
        None => ToneConfig::default(),
    };

    if let Some(frequency) = args.frequency {
        config.frequency = frequency;
        config.note = None;
    }
    if let Some(note) = &args.note {
        config.note = Some(note.clone());
    }
    if let Some(waveform) = args.waveform {
        config.waveform = waveform;
    }

    config.validate().context("Invalid settings")?;
    Ok(config)
}

/// Drive the engine through a ping-pong buffer and stream each half into a 16-bit WAV file
fn render_offline(config: &ToneConfig, path: &Path, seconds: f32) -> Result<()> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return Err(anyhow!("Render length must be a positive number of seconds"));
    }

    let frequency = config.tone_frequency()?;
    let params = Arc::new(ToneParameters::new(frequency, config.gain));
    let (_event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut engine = ToneEngine::new(config.sample_rate, config.waveform, params, event_rx);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: config.sample_rate.round() as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    let total = (seconds * config.sample_rate).round() as usize;
    log::info!(
        "Rendering {} samples of {} Hz {} to {}",
        total,
        frequency,
        config.waveform,
        path.display()
    );

    let mut buffer = PingPongBuffer::primed(config.block_size, &mut engine);
    let mut remaining = total;
    while remaining > 0 {
        let mut status: hound::Result<()> = Ok(());
        buffer.advance(&mut engine, |block| {
            let take = block.len().min(remaining);
            status = block[..take]
                .iter()
                .try_for_each(|&sample| writer.write_sample(to_pcm16(sample)));
            remaining -= take;
        });
        status.with_context(|| format!("Failed to write WAV file: {}", path.display()))?;
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;
    log::info!("Render complete");
    Ok(())
}

/// Play the tone on an output device until ctrl-c
fn run_live(config: &ToneConfig) -> Result<()> {
    let host = cpal::default_host();
    let device = match &config.devices.audioout {
        Some(search) => {
            let audio_devices = list_audio_devices()?;
            let index = find_device("Audio", &audio_devices, search)?;
            host.output_devices()?
                .filter(|device| device_name(device).is_some())
                .nth(index)
                .ok_or_else(|| anyhow!("Selected audio device not available"))?
        }
        None => host
            .default_output_device()
            .ok_or_else(|| anyhow!("No default audio output device"))?,
    };
    log::info!(
        "Using audio device: {}",
        device_name(&device).unwrap_or_else(|| "Unknown".to_string())
    );

    let audio_config = device.default_output_config()?;
    let sample_format = audio_config.sample_format();
    let stream_config: cpal::StreamConfig = audio_config.into();
    let sample_rate = stream_config.sample_rate as f32;
    let num_channels = stream_config.channels as usize;

    // The device rate may be lower than the configured one
    let frequency = config.tone_frequency()?;
    validate_frequency(sample_rate, frequency)
        .with_context(|| format!("Tone does not fit the device sample rate of {} Hz", sample_rate))?;

    let params = Arc::new(ToneParameters::new(frequency, config.gain));
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut engine = ToneEngine::new(sample_rate, config.waveform, params, event_rx);

    // With a MIDI keyboard attached the tone waits for the first key
    let _midi_handler = match &config.devices.midiin {
        Some(search) => {
            let midi_devices = MidiHandler::list_devices()?;
            let index = find_device("MIDI", &midi_devices, search)?;
            engine = engine.gated();
            Some(MidiHandler::connect(
                event_tx,
                index,
                config.devices.midi_channel_filter(),
            )?)
        }
        None => None,
    };

    let block_size = config.block_size;
    let _stream = match sample_format {
        cpal::SampleFormat::F32 => {
            start_audio_stream::<f32>(&device, &stream_config, engine, num_channels, block_size)?
        }
        cpal::SampleFormat::I16 => {
            start_audio_stream::<i16>(&device, &stream_config, engine, num_channels, block_size)?
        }
        cpal::SampleFormat::U16 => {
            start_audio_stream::<u16>(&device, &stream_config, engine, num_channels, block_size)?
        }
        other => return Err(anyhow!("Unsupported sample format: {:?}", other)),
    };

    log::info!(
        "Playing {} Hz {} at {} Hz, {} channel(s)... press ctrl-C to exit",
        frequency,
        config.waveform,
        sample_rate,
        num_channels
    );

    let should_exit = Arc::new(AtomicBool::new(false));
    {
        let should_exit = should_exit.clone();
        ctrlc::set_handler(move || should_exit.store(true, Ordering::Relaxed))
            .context("Failed to install ctrl-C handler")?;
    }

    while !should_exit.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(100));
    }

    log::info!("Exit requested");
    Ok(())
}

/// Start an output stream that renders the engine into every callback
fn start_audio_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut engine: ToneEngine,
    num_channels: usize,
    block_size: usize,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
{
    // Pre-allocate buffer for processing
    let mut temp_buffer = vec![0.0f32; block_size * num_channels];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if temp_buffer.len() < data.len() {
                temp_buffer.resize(data.len(), 0.0);
            }

            let rendered = &mut temp_buffer[..data.len()];
            engine.process(rendered, num_channels);

            for (out, sample) in data.iter_mut().zip(rendered.iter()) {
                *out = T::from_sample(*sample);
            }
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )?;

    stream.play()?;

    Ok(stream)
}
