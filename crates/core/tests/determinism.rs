//! Repeated and parallel runs give identical results
mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use repoh_core::clump::ConnectedRegions;
use repoh_core::{Grid, RepohParams, Sweep, SweepGeometry, SweepResult, Volume};

fn noisy_sweep(seed: u64) -> common::Fields {
    let mut fields = common::clump_sweep(120, 10, &[(15, 40, 1.0), (55, 80, 2.5), (95, 115, 4.0)]);
    let mut rng = StdRng::seed_from_u64(seed);
    let s = fields.s_dbz.clone();
    let k = fields.k_dbz.clone();
    for y in 0..10 {
        for x in 0..120 {
            if let (Some(sv), Some(kv)) = (s.value(x, y), k.value(x, y)) {
                let jitter: f64 = rng.random_range(-1.5..1.5);
                fields.s_dbz.set(x, y, sv + jitter);
                fields.k_dbz.set(x, y, kv + jitter * 0.9);
            }
        }
    }
    fields
}

fn fingerprint(result: &SweepResult) -> Vec<(Option<usize>, bool, Vec<(i32, i32)>)> {
    result
        .all_kernels
        .iter()
        .flat_map(|p| [p.near(), p.far()])
        .map(|k| {
            (
                k.id(),
                k.is_good(),
                k.points().cloud().iter().map(|p| (p.x, p.y)).collect(),
            )
        })
        .collect()
}

#[test]
fn test_repeated_runs_are_identical() {
    let fields = noisy_sweep(42);
    let params = RepohParams::default();
    let geometry = SweepGeometry::default();

    let a = Sweep::process(&fields.inputs(0.5), &params, &geometry, &ConnectedRegions).unwrap();
    let b = Sweep::process(&fields.inputs(0.5), &params, &geometry, &ConnectedRegions).unwrap();

    assert!(!a.all_kernels.is_empty());
    assert_eq!(fingerprint(&a), fingerprint(&b));
    assert_eq!(a.records, b.records);
    assert_eq!(a.polygons, b.polygons);
    assert_eq!(a.humidity, b.humidity);
}

#[test]
fn test_volume_matches_sequential_sweeps() {
    let sweeps: Vec<common::Fields> = (0..4).map(noisy_sweep).collect();
    let params = RepohParams::default();
    let geometry = SweepGeometry::default();

    let mut volume = Volume::new();
    for (i, f) in sweeps.iter().enumerate() {
        volume.push(f.inputs(0.5 + i as f64), geometry);
    }
    let parallel = volume.process(&params, &ConnectedRegions);
    assert_eq!(parallel.len(), sweeps.len());

    for (i, (f, par)) in sweeps.iter().zip(parallel.iter()).enumerate() {
        let seq = Sweep::process(&f.inputs(0.5 + i as f64), &params, &geometry, &ConnectedRegions)
            .unwrap();
        let par = par.as_ref().unwrap();
        assert_eq!(par.vlevel, seq.vlevel);
        assert_eq!(fingerprint(par), fingerprint(&seq));
        assert_eq!(par.records, seq.records);
    }
}

#[test]
fn test_volume_reports_failed_sweep_in_place() {
    let good = noisy_sweep(1);
    let short = Grid::new(10, 10, -1.0);
    let mut bad_inputs = good.inputs(1.0);
    bad_inputs.s_zdr = &short;

    let mut volume = Volume::new();
    volume.push(good.inputs(0.5), SweepGeometry::default());
    volume.push(bad_inputs, SweepGeometry::default());
    let results = volume.process(&RepohParams::default(), &ConnectedRegions);

    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}
