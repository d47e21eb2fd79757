use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use ferm_core::{Programme, Step};

// A long lager schedule: many short hold/ramp pairs
fn long_programme(steps: usize) -> Programme {
    let mut v = Vec::with_capacity(steps);
    let mut t = 10.0f32;
    for i in 0..steps {
        let next = if i % 2 == 0 { t + 0.5 } else { t };
        v.push(Step::new(t, next, 6.0));
        t = next;
    }
    let mut p = match Programme::from_steps(v, 3600) {
        Ok(p) => p,
        Err(e) => panic!("bench programme: {e}"),
    };
    p.assign_start_times(0);
    p
}

pub fn bench_ramp(c: &mut Criterion) {
    let mut g = c.benchmark_group("ramp");
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p ferm_core --bench ramp
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    for &n in &[8usize, 64, 512] {
        let p = long_programme(n);
        let end = p.end_time().unwrap_or(0);
        g.bench_function(format!("desired_last_step_{n}"), |b| {
            b.iter(|| black_box(p.desired_temperature(black_box(end - 1))))
        });
        g.bench_function(format!("assign_start_times_{n}"), |b| {
            b.iter_batched(
                || p.clone(),
                |mut q| {
                    q.assign_start_times(black_box(1_700_000_000));
                    black_box(q);
                },
                BatchSize::SmallInput,
            )
        });
    }

    let text: String = (0..256).map(|i| format!("{} {} 12\n", 10 + i % 5, 11 + i % 5)).collect();
    g.bench_function("parse_256_steps", |b| {
        b.iter(|| black_box(Programme::parse("bench", black_box(&text), 3600)))
    });
    g.finish();
}

criterion_group!(ramp, bench_ramp);
criterion_main!(ramp);
