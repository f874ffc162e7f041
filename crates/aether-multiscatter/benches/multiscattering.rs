use aether_atmosphere::{Atmosphere, TransmittanceLut};
use aether_multiscatter::*;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{UVec2, Vec3};

fn bench_direction_sampling(c: &mut Criterion) {
    c.bench_function("direction_sampler_64", |bencher| {
        bencher.iter(|| black_box(DirectionSampler::new(64).sum::<Vec3>()))
    });
}

fn bench_single_direction(c: &mut Criterion) {
    let atmosphere = Atmosphere::EARTH;
    let transmittance = TransmittanceLut::bake(&atmosphere, UVec2::new(256, 64), 40).unwrap();
    let r = atmosphere.bottom_radius + 1_000.0;
    let ray_dir = sample_direction(7);
    let light_dir = light_direction(0.5);
    c.bench_function("sample_multiscattering_dir_20", |bencher| {
        bencher.iter(|| {
            black_box(sample_multiscattering_dir(
                &atmosphere,
                &transmittance,
                black_box(r),
                ray_dir,
                light_dir,
                20,
            ))
        })
    });
}

fn bench_full_lut(c: &mut Criterion) {
    let atmosphere = Atmosphere::EARTH;
    let transmittance = TransmittanceLut::bake(&atmosphere, UVec2::new(256, 64), 40).unwrap();
    let pass =
        MultiscatteringPass::new(&atmosphere, &transmittance, MultiscatteringSettings::default())
            .unwrap();
    let mut out = vec![[0.0; 4]; pass.settings().texel_count()];

    let mut group = c.benchmark_group("multiscattering_lut_32x32");
    group.sample_size(10);
    group.bench_function("sequential", |bencher| {
        bencher.iter(|| pass.populate(&mut out, &SequentialExecutor).unwrap())
    });
    group.bench_function("rayon", |bencher| {
        bencher.iter(|| pass.populate(&mut out, &RayonExecutor).unwrap())
    });
    group.bench_function("threads", |bencher| {
        bencher.iter(|| pass.populate(&mut out, &ThreadPoolExecutor::default()).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_direction_sampling,
    bench_single_direction,
    bench_full_lut
);
criterion_main!(benches);
