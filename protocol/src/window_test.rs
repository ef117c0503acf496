use super::*;

#[test]
fn request_deco_list_serializes_as_bare_type_tag() {
    let json = serde_json::to_value(WindowMessage::RequestDecoList).expect("serialize");
    assert_eq!(json, serde_json::json!({"type": "REQUEST_DECO_LIST"}));
}

#[test]
fn deco_list_update_wire_shape() {
    let msg = WindowMessage::DecoListUpdate {
        data: vec![DecoRef { id: DecoId::from("deco-1"), x_mobile: 0.1, y_mobile: 0.2 }],
        scene: 3,
        selected_id: Some(DecoId::from("deco-1")),
    };
    let json = serde_json::to_value(&msg).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({
            "type": "DECO_LIST_UPDATE",
            "data": [{"id": "deco-1", "x_mobile": 0.1, "y_mobile": 0.2}],
            "scene": 3,
            "selectedId": "deco-1"
        })
    );
}

#[test]
fn deco_control_round_trips() {
    let msg = WindowMessage::DecoControl {
        id: DecoId::from("deco-7"),
        action: MultiAction::Scale,
        direction: Direction::Up,
    };
    let json = serde_json::to_string(&msg).expect("serialize");
    assert!(json.contains("DECO_CONTROL"));
    let restored: WindowMessage = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, msg);
}

#[test]
fn deco_select_parses_from_wire_json() {
    let msg: WindowMessage =
        serde_json::from_str(r#"{"type": "DECO_SELECT", "id": "deco-4"}"#).expect("deserialize");
    assert_eq!(msg, WindowMessage::DecoSelect { id: DecoId::from("deco-4") });
}
