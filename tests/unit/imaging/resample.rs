use super::*;

struct Broken;

impl Resampler for Broken {
    fn resize_to_fit(&self, _src: &Raster, _w: u32, _h: u32) -> PosterResult<Raster> {
        Err(PosterError::render("no resampler"))
    }
}

fn stripes(w: u32, h: u32) -> Raster {
    let img = image::RgbaImage::from_fn(w, h, |x, _| {
        if x % 2 == 0 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        }
    });
    Raster::new(img)
}

#[test]
fn wide_source_into_square_crops_centered_square() {
    let w = center_crop_window((2000, 1000), (1080, 1080)).unwrap();
    assert_eq!(
        w,
        CropWindow {
            x: 500,
            y: 0,
            width: 1000,
            height: 1000
        }
    );
}

#[test]
fn tall_source_into_landscape_crops_vertically() {
    let w = center_crop_window((1000, 2000), (1600, 800)).unwrap();
    assert_eq!((w.x, w.y, w.width, w.height), (0, 750, 1000, 500));
}

#[test]
fn equal_aspect_keeps_whole_source() {
    let w = center_crop_window((640, 360), (1280, 720)).unwrap();
    assert_eq!((w.x, w.y, w.width, w.height), (0, 0, 640, 360));
}

#[test]
fn window_always_inside_source() {
    for &src in &[(1, 1), (3, 1000), (1000, 3), (1999, 1001), (7, 7)] {
        for &tgt in &[(1080, 1080), (1080, 1920), (1600, 900), (1, 5000)] {
            let w = center_crop_window(src, tgt).unwrap();
            assert!(w.width >= 1 && w.height >= 1);
            assert!(w.x + w.width <= src.0, "{src:?} -> {tgt:?}: {w:?}");
            assert!(w.y + w.height <= src.1, "{src:?} -> {tgt:?}: {w:?}");
        }
    }
}

#[test]
fn zero_dimensions_are_rejected() {
    assert!(center_crop_window((0, 10), (10, 10)).is_err());
    assert!(center_crop_window((10, 10), (10, 0)).is_err());
}

#[test]
fn output_matches_target_exactly() {
    let r = LanczosResampler::new(Some(Sharpening::default()));
    for &(sw, sh, tw, th) in &[
        (200, 100, 108, 108),
        (90, 160, 160, 90),
        (33, 77, 40, 40),
        (10, 10, 25, 7),
    ] {
        let out = r.resize_to_fit(&stripes(sw, sh), tw, th).unwrap();
        assert_eq!(out.dimensions(), (tw, th));
    }
}

#[test]
fn resample_is_deterministic() {
    let r = LanczosResampler::default();
    let src = stripes(120, 80);
    let a = r.resize_to_fit(&src, 50, 50).unwrap();
    let b = r.resize_to_fit(&src, 50, 50).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn same_size_source_is_returned_untouched() {
    let src = stripes(64, 64);
    let out = LanczosResampler::default()
        .resize_to_fit(&src, 64, 64)
        .unwrap();
    assert!(out.ptr_eq(&src));
}

#[test]
fn failing_resampler_degrades_to_unscaled_source() {
    let src = stripes(30, 20);
    let fitted = fit_or_degrade(&Broken, &src, Canvas::new(100, 100));
    assert!(fitted.is_degraded());
    assert!(fitted.raster().ptr_eq(&src));
}

#[test]
fn cover_transform_fills_canvas() {
    let t = cover_transform((200, 100), Canvas::new(100, 100));
    let tl = t * kurbo::Point::new(0.0, 0.0);
    let br = t * kurbo::Point::new(200.0, 100.0);
    assert!((tl.y - 0.0).abs() < 1e-9 && (br.y - 100.0).abs() < 1e-9);
    assert!((tl.x + 50.0).abs() < 1e-9 && (br.x - 150.0).abs() < 1e-9);
}
