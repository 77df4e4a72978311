use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tapline::config::DspConfig;
use tapline::hal::mock::{MockAdc, MockDac, StdVectorMath};
use tapline::{Pipeline, PipelineConfig};

/// Runs one full block cycle — fill, process, drain back to `free` — so
/// the benchmark measures steady-state throughput rather than degrading
/// once the block pool empties.
fn bench_one_config(c: &mut Criterion, label: &str, config: PipelineConfig) {
    let mut pipeline = Pipeline::new(&config, &StdVectorMath).unwrap();
    let mut adc = MockAdc::new(vec![]);
    let mut dac = MockDac::default();

    c.bench_function(label, |b| {
        b.iter(|| {
            for i in 0..config.buffer_size {
                pipeline.producer_mut().on_adc_complete(black_box(i as f32));
            }
            pipeline.drain_processor().unwrap();
            for _ in 0..config.buffer_size {
                pipeline.consumer_mut().on_timer_overflow(&mut adc, &mut dac);
            }
            dac.codes.clear();
        })
    });
}

fn passthrough_bench(c: &mut Criterion) {
    bench_one_config(
        c,
        "pipeline/passthrough block",
        PipelineConfig::new().with_dsp(DspConfig::Passthrough),
    );
}

fn fir_bench(c: &mut Criterion) {
    bench_one_config(c, "pipeline/fir block", PipelineConfig::fir_lowpass());
}

fn schroeder_bench(c: &mut Criterion) {
    bench_one_config(c, "pipeline/schroeder block", PipelineConfig::schroeder());
}

criterion_group!(benches, passthrough_bench, fir_bench, schroeder_bench);
criterion_main!(benches);
