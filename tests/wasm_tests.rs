//! JavaScript facade tests, run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use epgview::EpgView;
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

fn guide() -> EpgView {
    let options = json!({"startDate": "2024-01-01T00:00:00", "dayWidth": 2400, "width": 700});
    let channels = json!([{"uuid": "ch0"}, {"uuid": "ch1"}]);
    let programs = json!([
        {"channelUuid": "ch0", "since": "2024-01-01T00:00:00", "till": "2024-01-01T01:00:00"},
        {"channelUuid": "ch1", "since": "2024-01-01T00:30:00", "till": "2024-01-01T02:00:00"}
    ]);
    EpgView::new(js(&options), js(&channels), js(&programs)).unwrap()
}

#[wasm_bindgen_test]
fn test_view_from_js_values() {
    let view = guide();
    assert_eq!(view.content_width(), 2400.0);
    assert_eq!(view.content_height(), 160.0);
    assert!(view.frame().unwrap().is_object());
}

#[wasm_bindgen_test]
fn test_invalid_options_are_rejected() {
    let options = json!({"itemHeight": -1});
    let result = EpgView::new(js(&options), js(&json!([])), js(&json!([])));
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn test_scroll_commands_return_requests() {
    let mut view = guide();
    let request = view.scroll_top(Some(50.0)).unwrap();
    let request: serde_json::Value = serde_wasm_bindgen::from_value(request).unwrap();
    assert_eq!(request["top"], json!(50.0));
    assert!(view.scroll_left(Some("missing".into()), None).unwrap().is_undefined());
}
