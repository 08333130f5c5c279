use criterion::{criterion_group, criterion_main, Criterion};

use roboeyes_core::{Config, EyeSelect, Eyes, NullRenderer};

fn bench_engine_tick(c: &mut Criterion) {
    c.bench_function("engine_tick", |b| {
        let mut eyes = Eyes::with_seed(Config::default(), 1);
        eyes.open(EyeSelect::Both);
        eyes.set_auto_blinker(true, Some(1), Some(2));
        eyes.set_idle_mode(true, Some(1), Some(2));
        let mut renderer = NullRenderer;
        let mut now = 0u64;
        b.iter(|| {
            now += 50;
            eyes.tick(now, &mut renderer);
        });
    });
}

criterion_group!(benches, bench_engine_tick);
criterion_main!(benches);
