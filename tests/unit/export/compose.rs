use super::*;
use crate::assets::fonts::FontBook;
use crate::imaging::resample::LanczosResampler;
use crate::render::cpu::CpuRenderer;
use crate::scene::measure::{EstimateMeasure, TextMeasure};

struct Broken;

impl Resampler for Broken {
    fn resize_to_fit(&self, _src: &Raster, _w: u32, _h: u32) -> PosterResult<Raster> {
        Err(PosterError::resample_degraded("no filter available"))
    }
}

struct WrongSize;

impl TextMeasure for WrongSize {
    fn measure(&self, layer: &TextLayer) -> crate::foundation::core::Size {
        EstimateMeasure.measure(layer)
    }
}

impl RenderBackend for WrongSize {
    fn render_plan(&mut self, _plan: &RenderPlan) -> PosterResult<FrameRGBA> {
        Ok(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![0; 4],
            premultiplied: true,
        })
    }
}

fn halves(w: u32, h: u32) -> Raster {
    Raster::new(image::RgbaImage::from_fn(w, h, |x, _| {
        if x < w / 2 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        }
    }))
}

#[test]
fn derived_is_reused_only_when_canvas_sized() {
    let original = halves(40, 20);
    let derived = Raster::solid(10, 10, [9, 9, 9, 255]);
    let r = LanczosResampler::default();

    let op = background_op(&r, Some(&original), Some(&derived), Canvas::new(10, 10));
    assert!(matches!(op, BackgroundOp::Exact(ref d) if d.ptr_eq(&derived)));

    let op = background_op(&r, Some(&original), Some(&derived), Canvas::new(12, 12));
    assert!(matches!(op, BackgroundOp::Exact(ref d) if d.dimensions() == (12, 12)));
}

#[test]
fn missing_background_is_solid() {
    let op = background_op(&LanczosResampler::default(), None, None, Canvas::new(4, 4));
    assert!(matches!(op, BackgroundOp::Solid(c) if c == EMPTY_BACKGROUND));
}

#[test]
fn broken_resampler_degrades_to_cover() {
    let src = halves(40, 20);
    let op = background_op(&Broken, Some(&src), None, Canvas::new(10, 10));
    assert!(matches!(op, BackgroundOp::Cover(ref r) if r.ptr_eq(&src)));

    let mut backend = CpuRenderer::new(FontBook::new());
    let registry = {
        let mut r = PlatformRegistry::builtin();
        r.register("tiny", "Tiny", 10, 10).unwrap();
        r
    };
    let frame = compose(&mut backend, &Broken, &registry, "tiny", Some(&src), &[]).unwrap();
    assert_eq!((frame.width, frame.height), (10, 10));
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn compose_uses_platform_size() {
    let mut registry = PlatformRegistry::builtin();
    registry.register("thumb", "Thumb", 32, 18).unwrap();
    let mut backend = CpuRenderer::new(FontBook::new());
    let frame = compose(
        &mut backend,
        &LanczosResampler::default(),
        &registry,
        "thumb",
        Some(&halves(200, 100)),
        &[],
    )
    .unwrap();
    assert_eq!((frame.width, frame.height), (32, 18));
    let left = frame.pixel(2, 9).unwrap();
    let right = frame.pixel(29, 9).unwrap();
    assert!(left[0] > 200 && left[2] < 50, "{left:?}");
    assert!(right[2] > 200 && right[0] < 50, "{right:?}");
}

#[test]
fn compose_rejects_unknown_platform() {
    let mut backend = CpuRenderer::new(FontBook::new());
    let err = compose(
        &mut backend,
        &LanczosResampler::default(),
        &PlatformRegistry::builtin(),
        "myspace",
        None,
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, PosterError::UnknownPlatform(_)));
}

#[test]
fn render_checks_frame_size() {
    let plan = RenderPlan {
        canvas: Canvas::new(4, 4),
        background: BackgroundOp::Solid(Color::BLACK),
        layers: vec![],
        overlay: None,
    };
    assert!(matches!(
        render(&mut WrongSize, &plan),
        Err(PosterError::Render(_))
    ));
}

#[test]
fn display_scaling() {
    let frame = FrameRGBA {
        width: 100,
        height: 50,
        data: [7u8, 7, 7, 255].repeat(5000),
        premultiplied: true,
    };
    let same = scale_for_display(frame.clone(), 1.5).unwrap();
    assert_eq!(same, frame);

    let half = scale_for_display(frame.clone(), 0.5).unwrap();
    assert_eq!((half.width, half.height), (50, 25));
    assert!(half.data.chunks_exact(4).all(|px| px == [7, 7, 7, 255]));

    assert!(scale_for_display(frame.clone(), 0.0).is_err());
    assert!(scale_for_display(frame, f64::NAN).is_err());
}
