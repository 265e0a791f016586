use super::*;

fn image(w: u32, h: u32) -> Raster {
    Raster::new(image::RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 7, 255])
    }))
}

fn patch(x: Option<f64>, y: Option<f64>, w: Option<f64>, h: Option<f64>) -> CropRectPatch {
    CropRectPatch {
        x,
        y,
        width: w,
        height: h,
    }
}

#[test]
fn start_opens_centered_square_of_eighty_percent() {
    let mut tool = CropTool::default();
    let r = tool.start(1000, 600).unwrap();
    assert_eq!(
        r,
        CropRect {
            x: 260,
            y: 60,
            width: 480,
            height: 480
        }
    );
    assert!(tool.is_active());
    assert!(tool.start(1000, 600).is_err());
}

#[test]
fn operations_need_an_active_session() {
    let mut tool = CropTool::default();
    assert!(tool.update_rect(CropRectPatch::default()).is_err());
    assert!(tool.apply_preset(CropPreset::Square).is_err());
    assert!(tool.commit(&image(10, 10)).is_err());
    assert!(!tool.cancel());
}

#[test]
fn update_rect_keeps_omitted_fields() {
    let mut tool = CropTool::default();
    tool.start(1000, 600).unwrap();
    let r = tool.update_rect(patch(Some(10.0), None, None, None)).unwrap();
    assert_eq!((r.x, r.y, r.width, r.height), (10, 60, 480, 480));
}

#[test]
fn update_rect_clamps_any_input() {
    let mut tool = CropTool::default();
    tool.start(400, 300).unwrap();

    let inputs = [
        patch(Some(-50.0), Some(-1e9), Some(1.0), Some(0.0)),
        patch(Some(390.0), Some(290.0), Some(200.0), Some(200.0)),
        patch(None, None, Some(1e12), Some(-3.0)),
        patch(Some(f64::NAN), Some(f64::INFINITY), Some(f64::NEG_INFINITY), None),
        patch(Some(123.4), Some(10.6), Some(49.0), Some(51.0)),
    ];
    for p in inputs {
        let r = tool.update_rect(p).unwrap();
        assert!(r.width >= 50 && r.height >= 50, "{p:?} -> {r:?}");
        assert!(r.fits_within(400, 300), "{p:?} -> {r:?}");
    }
}

#[test]
fn minimum_is_capped_by_tiny_images() {
    let mut tool = CropTool::default();
    tool.start(30, 80).unwrap();
    let r = tool.update_rect(patch(None, None, Some(1.0), Some(1.0))).unwrap();
    assert_eq!((r.width, r.height), (30, 50));
    assert!(r.fits_within(30, 80));
}

#[test]
fn landscape_preset_on_square_source() {
    let mut tool = CropTool::default();
    tool.start(1200, 1200).unwrap();
    let r = tool.apply_preset(CropPreset::Landscape).unwrap();
    assert_eq!(r.width, 1200);
    assert_eq!(r.height, 675);
    assert_eq!(r.x, 0);
    assert_eq!(r.y, 262);
    let ratio = f64::from(r.width) / f64::from(r.height);
    assert!((ratio - 16.0 / 9.0).abs() < 0.01);
}

#[test]
fn presets_maximize_within_bounds() {
    let mut tool = CropTool::default();
    tool.start(1920, 1080).unwrap();

    let r = tool.apply_preset(CropPreset::Portrait).unwrap();
    assert_eq!((r.width, r.height), (608, 1080));
    assert_eq!(r.x, (1920 - 608) / 2);

    let r = tool.apply_preset(CropPreset::Classic).unwrap();
    assert_eq!((r.width, r.height), (1440, 1080));

    let r = tool.apply_preset(CropPreset::Square).unwrap();
    assert_eq!((r.x, r.y, r.width, r.height), (420, 0, 1080, 1080));
}

#[test]
fn commit_produces_rect_sized_raster_and_closes_session() {
    let mut tool = CropTool::default();
    let src = image(300, 200);
    tool.start(300, 200).unwrap();
    let r = tool
        .update_rect(patch(Some(20.0), Some(30.0), Some(100.0), Some(60.0)))
        .unwrap();
    let out = tool.commit(&src).unwrap();
    assert_eq!(out.dimensions(), (r.width, r.height));
    assert_eq!(out.as_image().get_pixel(0, 0).0, [20, 30, 7, 255]);
    assert!(!tool.is_active());
    assert_eq!(src.dimensions(), (300, 200));
}

#[test]
fn commit_rejects_a_different_image() {
    let mut tool = CropTool::default();
    tool.start(300, 200).unwrap();
    assert!(tool.commit(&image(200, 300)).is_err());
    assert!(tool.is_active());
}

#[test]
fn cancel_discards_session() {
    let mut tool = CropTool::default();
    tool.start(300, 200).unwrap();
    assert!(tool.cancel());
    assert!(!tool.is_active());
    assert_eq!(tool.rect(), None);
}

#[test]
fn preview_is_debounced_and_bounded() {
    let mut tool = CropTool::new(CropOpts {
        preview_debounce: Duration::from_secs(3600),
        preview_max_edge: 64,
        ..CropOpts::default()
    });
    let src = image(400, 200);
    tool.start(400, 200).unwrap();
    tool.apply_preset(CropPreset::Landscape).unwrap();

    assert!(tool.poll_preview(&src, Instant::now()).is_none());

    let later = Instant::now() + Duration::from_secs(7200);
    let p = tool.poll_preview(&src, later).unwrap();
    assert_eq!(p.width().max(p.height()), 64);
    assert!(tool.preview().is_some());
    assert!(tool.poll_preview(&src, later).is_none());

    tool.update_rect(patch(Some(0.0), None, None, None)).unwrap();
    assert!(tool.poll_preview(&src, later + Duration::from_secs(7200)).is_some());
}

#[test]
fn preset_parses_from_names_and_ratios() {
    assert_eq!("16:9".parse::<CropPreset>().unwrap(), CropPreset::Landscape);
    assert_eq!("Portrait".parse::<CropPreset>().unwrap(), CropPreset::Portrait);
    assert!("3:2".parse::<CropPreset>().is_err());
}
