use super::*;

#[test]
fn builtin_sizes_resolve() {
    let reg = PlatformRegistry::builtin();
    assert_eq!(reg.size_of("instagram_square").unwrap(), Canvas::new(1080, 1080));
    assert_eq!(reg.size_of("instagram_story").unwrap(), Canvas::new(1080, 1920));
    assert_eq!(reg.size_of("facebook_post").unwrap(), Canvas::new(1200, 630));
    assert!(reg.contains(DEFAULT_PLATFORM));
}

#[test]
fn unknown_key_is_reported() {
    let reg = PlatformRegistry::builtin();
    let err = reg.size_of("myspace_banner").unwrap_err();
    assert!(matches!(err, PosterError::UnknownPlatform(ref k) if k == "myspace_banner"));
}

#[test]
fn register_adds_and_replaces() {
    let mut reg = PlatformRegistry::builtin();
    let before = reg.iter().count();

    reg.register("billboard", "Billboard", 4000, 1000).unwrap();
    assert_eq!(reg.size_of("billboard").unwrap(), Canvas::new(4000, 1000));
    assert_eq!(reg.iter().count(), before + 1);

    reg.register("billboard", "Billboard", 3000, 1000).unwrap();
    assert_eq!(reg.size_of("billboard").unwrap(), Canvas::new(3000, 1000));
    assert_eq!(reg.iter().count(), before + 1);
    assert_eq!(reg.iter().last().unwrap().key, "billboard");
}

#[test]
fn register_rejects_degenerate_entries() {
    let mut reg = PlatformRegistry::builtin();
    assert!(reg.register("", "Nothing", 10, 10).is_err());
    assert!(reg.register("flat", "Flat", 100, 0).is_err());
    assert!(!reg.contains("flat"));
}
