//! Host simulation harness for `tapline`.
//!
//! Drives a configured pipeline from a WAV file through independent OS
//! threads standing in for the two interrupt contexts and the foreground
//! processor, so the lock-free queue transport runs under genuine
//! concurrent contention rather than a single-threaded simulation. This is
//! the vehicle for exercising the pipeline's end-to-end behavior by hand
//! against a real audio file.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::{Parser, ValueEnum};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use tapline::config::DspConfig;
use tapline::hal::mock::{MockAdc, MockDac, StdVectorMath};
use tapline::{Pipeline, PipelineConfig};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Variant {
    Passthrough,
    BufferedPassthrough,
    Fir,
    Schroeder,
}

#[derive(Parser)]
#[command(name = "tapline-sim")]
#[command(about = "Simulate the tapline audio pipeline against a WAV file", long_about = None)]
struct Args {
    /// Input WAV file (mono; float or integer PCM).
    #[arg(short, long)]
    input: PathBuf,

    /// Output WAV file (mono, 16-bit PCM).
    #[arg(short, long)]
    output: PathBuf,

    /// Which DSP core to run.
    #[arg(short, long, value_enum, default_value_t = Variant::Passthrough)]
    variant: Variant,

    /// Override the block pool size, e.g. to reproduce an under-provisioned
    /// scenario (2 buffers with a slow processor).
    #[arg(long)]
    num_buffers: Option<usize>,
}

fn config_for(variant: Variant, num_buffers: Option<usize>) -> PipelineConfig {
    let mut config = match variant {
        Variant::Passthrough => PipelineConfig::new().with_dsp(DspConfig::Passthrough),
        Variant::BufferedPassthrough => {
            PipelineConfig::new().with_dsp(DspConfig::BufferedPassthrough)
        }
        Variant::Fir => PipelineConfig::fir_lowpass(),
        Variant::Schroeder => PipelineConfig::schroeder(),
    };
    if let Some(n) = num_buffers {
        config = config.with_num_buffers(n);
    }
    config
}

fn read_samples(path: &PathBuf) -> (Vec<f32>, WavSpec) {
    let mut reader = WavReader::open(path).expect("failed to open input WAV");
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.expect("sample read error"))
            .collect(),
        SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.expect("sample read error") as f32 / max)
                .collect()
        }
    };
    (samples, spec)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let (samples, _in_spec) = read_samples(&args.input);
    let config = config_for(args.variant, args.num_buffers);
    let buffer_size = config.buffer_size;
    let fs = config.fs;

    let pipeline = Pipeline::new(&config, &StdVectorMath).expect("pipeline construction failed");
    let (mut producer, mut processor, mut consumer, metrics) = pipeline.into_parts();

    let producer_done = Arc::new(AtomicBool::new(false));

    // ADC codes are unsigned; recenter normalized [-1, 1] float samples into
    // a plausible 12-bit range before handing them to the producer.
    let producer_input = samples.clone();
    let producer_done_w = Arc::clone(&producer_done);
    let producer_handle = thread::spawn(move || {
        for x in producer_input {
            producer.on_adc_complete(x * 2048.0 + 2048.0);
        }
        producer_done_w.store(true, Ordering::Release);
    });

    let producer_done_r = Arc::clone(&producer_done);
    let processor_handle = thread::spawn(move || {
        let mut idle_streak = 0u32;
        loop {
            let did_work = processor.step().expect("DSP core failed mid-stream");
            if did_work {
                idle_streak = 0;
                continue;
            }
            idle_streak += 1;
            if producer_done_r.load(Ordering::Acquire) && idle_streak > 64 {
                break;
            }
            thread::yield_now();
        }
    });

    // Enough extra ticks for one block's pipeline-fill latency to drain,
    // with margin for scheduling jitter between the three threads.
    let total_ticks = samples.len() + buffer_size * 4;
    let consumer_handle = thread::spawn(move || {
        let mut adc = MockAdc::new(vec![]);
        let mut dac = MockDac::default();
        for _ in 0..total_ticks {
            consumer.on_timer_overflow(&mut adc, &mut dac);
        }
        dac.codes
    });

    producer_handle.join().expect("producer thread panicked");
    processor_handle.join().expect("processor thread panicked");
    let codes = consumer_handle.join().expect("consumer thread panicked");

    log::info!(
        "tapline-sim: {} input samples -> {} dac codes ({} producer drops, {} consumer drops, {} blocks processed, load={:.2})",
        samples.len(),
        codes.len(),
        metrics.producer_drops.load(Ordering::Relaxed),
        metrics.consumer_drops.load(Ordering::Relaxed),
        metrics.blocks_processed.load(Ordering::Relaxed),
        metrics.load.get_load(),
    );

    let out_spec = WavSpec {
        channels: 1,
        sample_rate: fs as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer =
        WavWriter::create(&args.output, out_spec).expect("failed to create output WAV");
    for code in codes {
        // Re-center the 12-bit unsigned DAC code to a signed 16-bit PCM
        // sample for playback in ordinary tools.
        let centered = (code as i32 - 2048) * 16;
        writer
            .write_sample(centered.clamp(i16::MIN as i32, i16::MAX as i32) as i16)
            .expect("failed to write sample");
    }
    writer.finalize().expect("failed to finalize output WAV");
}
