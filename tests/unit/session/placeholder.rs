use super::*;
use crate::assets::fonts::FontBook;
use crate::render::cpu::CpuRenderer;

#[test]
fn fontless_placeholder_is_plain_fill() {
    let mut r = CpuRenderer::new(FontBook::new());
    let p = placeholder_raster(&mut r, Canvas::new(20, 10), "404 not found");
    assert_eq!(p.dimensions(), (20, 10));
    assert!(p.as_bytes().chunks_exact(4).all(|px| px == PLACEHOLDER_FILL.to_array()));
}

#[test]
fn placeholder_bakes_in_text_when_fonts_exist() {
    let book = FontBook::discover(&[]);
    if book.is_empty() {
        return;
    }
    let mut r = CpuRenderer::new(book);
    let p = placeholder_raster(&mut r, Canvas::new(400, 200), "decode failed");
    assert_eq!(p.dimensions(), (400, 200));
    let fill = PLACEHOLDER_FILL.to_array();
    assert!(p.as_bytes().chunks_exact(4).any(|px| px != fill));
}
