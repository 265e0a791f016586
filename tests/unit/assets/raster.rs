use super::*;

fn gradient(w: u32, h: u32) -> Raster {
    let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
    Raster::new(img)
}

#[test]
fn crop_copies_requested_region() {
    let r = gradient(10, 8);
    let c = r.crop(3, 2, 4, 5).unwrap();
    assert_eq!(c.dimensions(), (4, 5));
    assert_eq!(c.as_image().get_pixel(0, 0).0, [3, 2, 0, 255]);
    assert_eq!(c.as_image().get_pixel(3, 4).0, [6, 6, 0, 255]);
    assert!(!c.ptr_eq(&r));
}

#[test]
fn crop_rejects_out_of_bounds_and_empty() {
    let r = gradient(10, 8);
    assert!(r.crop(8, 0, 3, 1).is_err());
    assert!(r.crop(0, 7, 1, 2).is_err());
    assert!(r.crop(0, 0, 0, 1).is_err());
    assert!(r.crop(u32::MAX, 0, 2, 1).is_err());
}

#[test]
fn from_rgba8_validates_length() {
    assert!(Raster::from_rgba8(2, 2, vec![0; 16]).is_ok());
    assert!(Raster::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(Raster::from_rgba8(0, 2, vec![]).is_err());
}

#[test]
fn premultiply_and_back_is_close() {
    let mut px = vec![200u8, 100, 50, 128, 10, 20, 30, 0, 1, 2, 3, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[1, 2, 3, 255]);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px[..3].iter().zip([200u8, 100, 50]) {
        assert!((i16::from(*got) - i16::from(want)).abs() <= 2);
    }
}

#[test]
fn clones_share_pixels() {
    let r = Raster::solid(3, 3, [9, 9, 9, 255]);
    let c = r.clone();
    assert!(r.ptr_eq(&c));
    assert_eq!(r.canvas(), crate::foundation::core::Canvas::new(3, 3));
}
