use super::*;

fn catalog_1000_2000() -> SceneCatalog {
    SceneCatalog::new(vec![
        Scene::still("a.png", "first", 1000),
        Scene::still("b.png", "second", 2000),
    ])
    .unwrap()
}

#[test]
fn mid_second_scene_resolves_local_time_and_progress() {
    let r = resolve(&catalog_1000_2000(), 1500.0);
    assert_eq!(r.index, 1);
    assert_eq!(r.local_ms, 500.0);
    assert_eq!(r.progress, 0.25);
}

#[test]
fn boundaries_are_half_open() {
    let catalog = catalog_1000_2000();
    assert_eq!(resolve(&catalog, 0.0).index, 0);
    assert_eq!(resolve(&catalog, 999.999).index, 0);
    let at_boundary = resolve(&catalog, 1000.0);
    assert_eq!(at_boundary.index, 1);
    assert_eq!(at_boundary.local_ms, 0.0);
}

#[test]
fn end_of_sequence_is_a_closed_boundary() {
    let r = resolve(&catalog_1000_2000(), 3000.0);
    assert_eq!(r.index, 1);
    assert_eq!(r.local_ms, 2000.0);
    assert_eq!(r.progress, 1.0);

    let past = resolve(&catalog_1000_2000(), 1e9);
    assert_eq!(past, r);
}

#[test]
fn every_time_in_range_resolves_to_exactly_one_scene() {
    let catalog = SceneCatalog::new(vec![
        Scene::still("a.png", "a", 7),
        Scene::still("b.png", "b", 1),
        Scene::still("c.png", "c", 13),
    ])
    .unwrap();
    let offsets = scene_offsets_ms(catalog.scenes());
    assert_eq!(offsets, vec![0, 7, 8]);

    let mut t = 0.0;
    while t < catalog.total_duration_ms() as f64 {
        let r = resolve(&catalog, t);
        let scene = catalog.get(r.index).unwrap();
        let matches = offsets
            .iter()
            .zip(catalog.scenes())
            .filter(|(start, s)| {
                let start = **start as f64;
                t >= start && t < start + s.duration_ms as f64
            })
            .count();
        assert_eq!(matches, 1);
        assert!(r.local_ms >= 0.0 && r.local_ms < scene.duration_ms as f64);
        assert_eq!(offsets[r.index] as f64 + r.local_ms, t);
        t += 0.25;
    }
}

#[test]
fn negative_and_nan_times_resolve_to_start() {
    let catalog = catalog_1000_2000();
    assert_eq!(resolve(&catalog, -20.0).index, 0);
    assert_eq!(resolve(&catalog, -20.0).local_ms, 0.0);
    assert_eq!(resolve(&catalog, f64::NAN).local_ms, 0.0);
}

#[test]
fn zero_length_scenes_are_skipped_and_guarded() {
    let scenes = vec![
        Scene::still("a.png", "a", 0),
        Scene::still("b.png", "b", 10),
        Scene::still("c.png", "c", 0),
    ];
    assert_eq!(resolve_scenes(&scenes, 0.0).unwrap().index, 1);
    let end = resolve_scenes(&scenes, 10.0).unwrap();
    assert_eq!(end.index, 2);
    assert_eq!(end.local_ms, 0.0);
    assert_eq!(end.progress, 0.0);
    assert!(resolve_scenes(&[], 0.0).is_none());
}
