use std::sync::Mutex;

use super::*;
use crate::assets::fonts::FontBook;
use crate::export::store::InMemoryStore;
use crate::imaging::resample::LanczosResampler;
use crate::render::cpu::CpuRenderer;

fn job(canvas: Canvas) -> ExportJob {
    ExportJob::new(
        "instagram_square",
        canvas,
        Vec::new(),
        Arc::new(LanczosResampler::default()),
    )
    .with_campaign("Fall Promo")
}

#[test]
fn file_name_uses_campaign_and_platform() {
    assert_eq!(
        job(Canvas::new(4, 4)).file_name(),
        "fall-promo-instagram-square.png"
    );
}

#[test]
fn derived_background_is_drawn_as_is() {
    let original = Raster::solid(40, 40, [255, 0, 0, 255]);
    let derived = Raster::solid(8, 8, [0, 255, 0, 255]);
    let art = job(Canvas::new(8, 8))
        .with_background(original, Some(derived))
        .compose(&mut CpuRenderer::new(FontBook::new()))
        .unwrap();
    let px = art.decode().unwrap().as_image().get_pixel(3, 3).0;
    assert_eq!(px, [0, 255, 0, 255]);
}

#[test]
fn stale_derived_is_ignored() {
    let original = Raster::solid(40, 40, [255, 0, 0, 255]);
    let derived = Raster::solid(4, 4, [0, 255, 0, 255]);
    let art = job(Canvas::new(8, 8))
        .with_background(original, Some(derived))
        .compose(&mut CpuRenderer::new(FontBook::new()))
        .unwrap();
    let px = art.decode().unwrap().as_image().get_pixel(3, 3).0;
    assert_eq!(px, [255, 0, 0, 255]);
}

#[test]
fn run_persists_and_notifies() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = seen.clone();
    let store = InMemoryStore::new();
    let out = job(Canvas::new(6, 6))
        .with_listener(Some(Arc::new(move |url: &str| {
            sink.lock().unwrap().push(url.to_owned());
        })))
        .run(&mut CpuRenderer::new(FontBook::new()), &store)
        .unwrap();

    assert_eq!(out.url, "mem://1/fall-promo-instagram-square.png");
    assert_eq!(*seen.lock().unwrap(), vec![out.url.clone()]);
    assert_eq!(store.saved()[0].1, out.artifact.png);
}

#[test]
fn persistence_failure_keeps_artifact() {
    let called = Arc::new(Mutex::new(false));
    let flag = called.clone();
    let err = job(Canvas::new(6, 6))
        .with_listener(Some(Arc::new(move |_: &str| {
            *flag.lock().unwrap() = true;
        })))
        .run(
            &mut CpuRenderer::new(FontBook::new()),
            &InMemoryStore::failing("503"),
        )
        .unwrap_err();

    assert!(err.to_string().contains("503"));
    let art = err.into_artifact().expect("artifact retained");
    assert_eq!((art.width, art.height), (6, 6));
    assert!(!*called.lock().unwrap());
}

#[test]
fn jobs_are_send() {
    fn assert_send<T: Send + 'static>(_: &T) {}
    assert_send(&job(Canvas::new(1, 1)));
}

#[test]
fn compose_twice_is_byte_identical() {
    let j = job(Canvas::new(16, 9)).with_background(Raster::solid(30, 30, [1, 99, 200, 255]), None);
    let mut r = CpuRenderer::new(FontBook::new());
    assert_eq!(j.compose(&mut r).unwrap(), j.compose(&mut r).unwrap());
}
