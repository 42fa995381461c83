use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geodiag_core::{Coord, Geometry, GeometryCollection, Polygon};
use geodiag_pipeline::DiagnosticRunner;

fn grid_of_parcels(n: usize) -> GeometryCollection {
    let parcel = |i: usize| {
        let x0 = 1_000_000.0 + 25.0 * (i % 40) as f64;
        let y0 = 1_000_000.0 + 35.0 * (i / 40) as f64;
        Geometry::Polygon(Polygon::new(vec![
            Coord::new(x0, y0),
            Coord::new(x0 + 20.0, y0),
            Coord::new(x0 + 20.0, y0 + 30.0),
            Coord::new(x0, y0 + 30.0),
            Coord::new(x0, y0),
        ]))
    };
    GeometryCollection::from_geometries((0..n).map(parcel)).with_crs("EPSG:3116")
}

fn geographic_points(n: usize) -> GeometryCollection {
    GeometryCollection::from_geometries((0..n).map(|i| {
        let t = i as f64 / n as f64;
        Geometry::Point(Coord::new(-76.0 + 2.0 * t, 5.0 + 2.0 * (t * 7.0).fract()))
    }))
}

fn bench_diagnose(c: &mut Criterion) {
    let runner = DiagnosticRunner::default();
    let parcels = grid_of_parcels(400);
    let points = geographic_points(1000);

    c.bench_function("diagnose_parcels_400", |b| b.iter(|| runner.diagnose(black_box(&parcels))));
    c.bench_function("diagnose_points_1000", |b| b.iter(|| runner.diagnose(black_box(&points))));
}

criterion_group!(benches, bench_diagnose);
criterion_main!(benches);
