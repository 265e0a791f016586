use super::*;

#[test]
fn split_writes_hash_like_one_write() {
    let mut a = Fnv1a64::default();
    a.write_bytes(b"poster");
    let mut b = Fnv1a64::default();
    b.write_tag(b'p');
    b.write_bytes(b"oster");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn signed_zero_zoom_keys_differ() {
    let mut a = Fnv1a64::default();
    a.write_f64(0.0);
    let mut b = Fnv1a64::default();
    b.write_f64(-0.0);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn mul_255_matches_rounded_division() {
    for x in 0..=255u8 {
        for y in [0u8, 1, 64, 127, 128, 200, 255] {
            let want = ((f64::from(x) * f64::from(y)) / 255.0).round() as u8;
            assert_eq!(mul_255(x, y), want, "{x}*{y}");
        }
    }
}
