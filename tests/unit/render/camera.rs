use super::*;

fn moving_scene() -> Scene {
    Scene::still("x.png", "caption", 1000)
        .with_zoom(1.0, 1.2)
        .with_pan_x(-0.3, 0.7)
        .with_pan_y(0.1, -0.9)
}

#[test]
fn endpoints_are_exact() {
    let s = moving_scene();
    assert_eq!(
        interpolate(&s, 0.0),
        CameraParams {
            scale: 1.0,
            pan_x: -0.3,
            pan_y: 0.1
        }
    );
    assert_eq!(
        interpolate(&s, 1.0),
        CameraParams {
            scale: 1.2,
            pan_x: 0.7,
            pan_y: -0.9
        }
    );
}

#[test]
fn halfway_zoom_is_midpoint() {
    let s = Scene::still("x.png", "c", 10).with_zoom(1.0, 1.2);
    assert!((interpolate(&s, 0.5).scale - 1.1).abs() < 1e-12);
}

#[test]
fn progress_is_clamped() {
    let s = moving_scene();
    assert_eq!(interpolate(&s, -3.0), interpolate(&s, 0.0));
    assert_eq!(interpolate(&s, 7.0), interpolate(&s, 1.0));
    assert_eq!(interpolate(&s, f64::NAN), interpolate(&s, 0.0));
}

#[test]
fn monotonic_for_monotonic_pairs() {
    let s = moving_scene();
    let mut prev = interpolate(&s, 0.0);
    for i in 1..=100 {
        let cur = interpolate(&s, f64::from(i) / 100.0);
        assert!(cur.scale >= prev.scale);
        assert!(cur.pan_x >= prev.pan_x);
        assert!(cur.pan_y <= prev.pan_y);
        prev = cur;
    }
}

#[test]
fn wide_image_is_fitted_by_height() {
    let canvas = Canvas::HD_720;
    let r = cover_rect(CameraParams::IDENTITY, 2000, 500, canvas).unwrap();
    assert!((r.height() - 720.0).abs() < 1e-9);
    assert!((r.width() - 2880.0).abs() < 1e-9);
    assert!((r.center().x - 640.0).abs() < 1e-9);
    assert!((r.center().y - 360.0).abs() < 1e-9);
}

#[test]
fn tall_image_is_fitted_by_width_and_scaled() {
    let canvas = Canvas::HD_720;
    let cam = CameraParams {
        scale: 1.5,
        pan_x: 0.0,
        pan_y: 0.0,
    };
    let r = cover_rect(cam, 600, 800, canvas).unwrap();
    assert!((r.width() - 1920.0).abs() < 1e-9);
    assert!((r.height() - 2560.0).abs() < 1e-9);
}

#[test]
fn cover_always_fills_the_canvas_at_unit_scale() {
    let canvas = Canvas::HD_720;
    for (w, h) in [(1280, 720), (1, 1), (4000, 300), (300, 4000), (1919, 1080)] {
        let r = cover_rect(CameraParams::IDENTITY, w, h, canvas).unwrap();
        assert!(r.width() >= 1280.0 - 1e-9, "{w}x{h}");
        assert!(r.height() >= 720.0 - 1e-9, "{w}x{h}");
    }
}

#[test]
fn pan_offsets_center_by_damped_extent() {
    let canvas = Canvas::HD_720;
    let cam = CameraParams {
        scale: 1.0,
        pan_x: 1.0,
        pan_y: -1.0,
    };
    let r = cover_rect(cam, 1280, 720, canvas).unwrap();
    assert!((r.center().x - (640.0 + 1280.0 * PAN_DAMPING)).abs() < 1e-9);
    assert!((r.center().y - (360.0 - 720.0 * PAN_DAMPING)).abs() < 1e-9);
}

#[test]
fn zero_sized_image_has_no_rect() {
    assert!(cover_rect(CameraParams::IDENTITY, 0, 10, Canvas::HD_720).is_none());
    assert!(cover_rect(CameraParams::IDENTITY, 10, 0, Canvas::HD_720).is_none());
}
