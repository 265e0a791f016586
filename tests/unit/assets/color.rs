use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 0));

    let c: Color = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 255, 128));

    let c: Color = serde_json::from_value(json!("#FA0")).unwrap();
    assert_eq!(c, Color::rgb(0xff, 0xaa, 0x00));

    assert!(serde_json::from_value::<Color>(json!("#12345")).is_err());
    assert!(serde_json::from_value::<Color>(json!("#gg0000")).is_err());
}

#[test]
fn parses_object_and_array() {
    let c: Color = serde_json::from_value(json!({"r": 1.0, "g": 0.5, "b": 0.0})).unwrap();
    assert_eq!(c, Color::rgba(255, 128, 0, 255));

    let c: Color = serde_json::from_value(json!([0.0, 0.0, 0.0, 0.5])).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 0, 128));

    assert!(serde_json::from_value::<Color>(json!([1.0, 1.0])).is_err());
}

#[test]
fn serializes_as_hex() {
    assert_eq!(
        serde_json::to_value(Color::rgb(17, 34, 51)).unwrap(),
        json!("#112233")
    );
    assert_eq!(
        serde_json::to_value(Color::rgba(17, 34, 51, 0)).unwrap(),
        json!("#11223300")
    );
}

#[test]
fn transparency_and_premul() {
    assert!(Color::TRANSPARENT.is_transparent());
    assert_eq!(Color::WHITE.to_premul().to_array(), [255, 255, 255, 255]);
}
