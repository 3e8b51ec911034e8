//! Geometry and solver benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glam::DVec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use gfrd_core::geometry::{Cylinder, Sphere};
use gfrd_core::world::{SpeciesId, SpeciesInfo, World};
use gfrd_core::GreensFunction1DAbsSinkAbs;

fn bench_cylinder_distance(c: &mut Criterion) {
    let cylinder = Cylinder::new(DVec3::ZERO, 1.0, DVec3::Z, 2.0);
    let points: Vec<DVec3> = (0..256)
        .map(|i| {
            let f = i as f64 / 256.0;
            DVec3::new(3.0 * f, 2.0 - f, 4.0 * f - 2.0)
        })
        .collect();

    c.bench_function("cylinder_distance", |b| {
        b.iter(|| {
            points
                .iter()
                .map(|p| cylinder.distance(black_box(*p)))
                .sum::<f64>()
        })
    });
}

fn bench_check_overlap(c: &mut Criterion) {
    let mut world = World::new(10.0, 10);
    world.add_species(SpeciesInfo::new(
        SpeciesId(1),
        "A",
        0.05,
        1.0,
        gfrd_core::structure::DEFAULT_STRUCTURE_TYPE,
    ));

    let mut rng = StdRng::seed_from_u64(42);
    use rand::Rng;
    for _ in 0..1000 {
        let pos = DVec3::new(
            rng.gen::<f64>() * 10.0,
            rng.gen::<f64>() * 10.0,
            rng.gen::<f64>() * 10.0,
        );
        world.new_particle(SpeciesId(1), pos).unwrap();
    }

    let query = Sphere::new(DVec3::splat(5.0), 0.4);
    c.bench_function("check_overlap", |b| {
        b.iter(|| world.check_overlap(black_box(&query), &[]))
    });
}

fn bench_root_enumeration(c: &mut Criterion) {
    c.bench_function("greens_survival", |b| {
        b.iter(|| {
            let mut gf =
                GreensFunction1DAbsSinkAbs::new(1.0, 25.0, 0.6, 0.4, 0.0, 1.5).unwrap();
            black_box(gf.p_survival(black_box(0.01)).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_cylinder_distance,
    bench_check_overlap,
    bench_root_enumeration
);
criterion_main!(benches);
