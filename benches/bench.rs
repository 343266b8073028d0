use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geobootstrap::{examples::population_density::*, *};
use rand_pcg::Pcg64;
use rand::SeedableRng;

pub fn benchmark(c: &mut Criterion){
    let map = TractMap::new(Pcg64::seed_from_u64(23), 40, 250.0, 1.0);
    let mut rng = Pcg64::seed_from_u64(23);
    let source = extract_coordinates(&mut rng, &map.outlines, PolygonStrategy::Midpoint).unwrap();
    let query: Vec<Coord2> = source.iter().step_by(16).copied().collect();
    let config = GeoBootstrapConfig::default()
        .with_bandwidth(500.0)
        .with_resample_count(100);
    c.bench_function(
        "geobootstrap",
        |b| b.iter(|| {
            geobootstrap_attribute(
                &mut rng,
                &map.tracts,
                Locations::Coordinates(&source),
                Locations::Coordinates(&query),
                black_box(&config),
                |tract| tract.pop_density
            ).unwrap()
        })
    );
}

pub fn benchmark2(c: &mut Criterion){
    let map = TractMap::new(Pcg64::seed_from_u64(23), 100, 100.0, 0.0);
    let mut rng = Pcg64::seed_from_u64(23);
    let source = extract_coordinates(&mut rng, &map.outlines, PolygonStrategy::Midpoint).unwrap();
    c.bench_function(
        "validate_bandwidth",
        |b| b.iter(|| {
            validate_bandwidth(
                &source,
                &source,
                black_box(50.0),
                BandwidthPolicy::AutoFix
            ).unwrap()
        })
    );
}

criterion_group!(benches, benchmark, benchmark2);
criterion_main!(benches);
