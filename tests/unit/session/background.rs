use super::*;
use crate::foundation::error::{PosterError, PosterResult};
use crate::imaging::resample::LanczosResampler;

struct Broken;

impl Resampler for Broken {
    fn resize_to_fit(&self, _src: &Raster, _w: u32, _h: u32) -> PosterResult<Raster> {
        Err(PosterError::resample_degraded("offline"))
    }
}

fn lanczos() -> Arc<dyn Resampler> {
    Arc::new(LanczosResampler::default())
}

fn loaded() -> BackgroundSource {
    let mut bg = BackgroundSource::default();
    bg.replace(Raster::solid(40, 20, [5, 5, 5, 255]), None, None);
    bg
}

#[test]
fn empty_source_has_nothing_to_resize() {
    let bg = BackgroundSource::default();
    assert_eq!(bg.version(), 0);
    assert!(bg.request("p", Canvas::new(4, 4), lanczos()).is_none());
}

#[test]
fn accepted_resize_is_cached_per_platform() {
    let mut bg = loaded();
    let req = bg.request("square", Canvas::new(10, 10), lanczos()).unwrap();
    assert_eq!(req.version(), 1);
    assert!(bg.accept(req.run(), "square"));
    assert_eq!(bg.derived_for("square").unwrap().dimensions(), (10, 10));
    assert!(bg.derived_for("story").is_none());
}

#[test]
fn stale_version_is_discarded() {
    let mut bg = loaded();
    let req = bg.request("square", Canvas::new(10, 10), lanczos()).unwrap();
    bg.replace(Raster::solid(8, 8, [0, 0, 0, 255]), None, None);
    assert!(!bg.accept(req.run(), "square"));
    assert!(bg.derived_for("square").is_none());
}

#[test]
fn stale_platform_is_discarded() {
    let mut bg = loaded();
    let req = bg.request("square", Canvas::new(10, 10), lanczos()).unwrap();
    assert!(!bg.accept(req.run(), "story"));
}

#[test]
fn degraded_resize_is_not_cached() {
    let mut bg = loaded();
    let req = bg
        .request("square", Canvas::new(10, 10), Arc::new(Broken))
        .unwrap();
    let result = req.run();
    assert!(result.fitted.is_degraded());
    assert!(!bg.accept(result, "square"));
}

#[test]
fn replacing_drops_derived() {
    let mut bg = loaded();
    let req = bg.request("square", Canvas::new(10, 10), lanczos()).unwrap();
    bg.accept(req.run(), "square");
    bg.replace(
        Raster::solid(8, 8, [0, 0, 0, 255]),
        Some("file:///x.png".into()),
        Some("boom".into()),
    );
    assert_eq!(bg.version(), 2);
    assert!(bg.derived_for("square").is_none());
    assert_eq!(bg.url(), Some("file:///x.png"));
    assert_eq!(bg.load_error(), Some("boom"));
}
