use glam::DVec3;
use ionmd_core::diagnostics::{kinetic_energy, rms_speed, total_momentum, SpeedWindow};
use ionmd_core::ion::{IonSet, IonSpecies};
use ionmd_core::snapshot::{IonRecord, Snapshot};

fn two_ions() -> IonSet {
    let species = [
        IonSpecies::new(2.0, 1.0, true),
        IonSpecies::new(3.0, 1.0, false),
    ];
    let mut ions = IonSet::from_flat(
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        &[1.0, 0.0, 0.0, 0.0, -2.0, 0.0],
        &species,
    )
    .unwrap();
    ions.acceleration[1] = DVec3::new(0.5, 0.5, 0.5);
    ions
}

#[test]
fn test_snapshot_copies_state() {
    let ions = two_ions();
    let snap = Snapshot::capture(&ions, 3.0e-9, 3);

    assert_eq!(snap.len(), 2);
    assert_eq!(snap.step, 3);
    assert_eq!(snap.time, 3.0e-9);
    assert_eq!(snap.ions[0].position(), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(snap.ions[1].velocity(), DVec3::new(0.0, -2.0, 0.0));
    assert_eq!(snap.ions[1].acceleration(), DVec3::splat(0.5));
    assert_eq!(snap.flat_positions(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_snapshot_bytes_layout() {
    let snap = Snapshot::capture(&two_ions(), 0.0, 0);
    let bytes = snap.as_bytes();

    assert_eq!(std::mem::size_of::<IonRecord>(), 72);
    assert_eq!(bytes.len(), 2 * 72);

    let values: &[f64] = bytemuck::cast_slice(bytes);
    assert_eq!(&values[..3], &[1.0, 2.0, 3.0]);
    assert_eq!(&values[9..12], &[4.0, 5.0, 6.0]);
    assert_eq!(&values[15..18], &[0.5, 0.5, 0.5]);
}

#[test]
fn test_momentum_and_energy() {
    let ions = two_ions();

    assert_eq!(total_momentum(&ions), DVec3::new(2.0, -6.0, 0.0));
    assert_eq!(kinetic_energy(&ions), 0.5 * 2.0 * 1.0 + 0.5 * 3.0 * 4.0);
    assert!((rms_speed(&ions) - (5.0_f64 / 2.0).sqrt()).abs() < 1e-15);
    assert_eq!(rms_speed(&IonSet::new(0)), 0.0);
}

#[test]
fn test_speed_window_emits_once_per_window() {
    let ions = two_ions();
    let mut window = SpeedWindow::new(3);

    assert_eq!(window.record(&ions), None);
    assert_eq!(window.record(&ions), None);
    let value = window.record(&ions).expect("third sample closes the window");
    assert!((value - rms_speed(&ions)).abs() < 1e-15);
    assert_eq!(window.last(), Some(value));

    assert_eq!(window.record(&ions), None, "window restarts after emitting");
}
