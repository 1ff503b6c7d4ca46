use super::*;

// =============================================================================
// ApiError::user_message
// =============================================================================

#[test]
fn user_message_prefers_server_text() {
    let err = ApiError::Status { status: 400, message: Some("Message too long".into()) };
    assert_eq!(err.user_message("fallback", "offline"), "Message too long");
    assert_eq!(err.server_message(), Some("Message too long"));
}

#[test]
fn user_message_status_without_text_uses_fallback() {
    let err = ApiError::Status { status: 500, message: None };
    assert_eq!(err.user_message("Ошибка отправки", "Ошибка подключения"), "Ошибка отправки");
}

#[test]
fn user_message_transport_uses_offline_text() {
    let err = ApiError::Transport("connection refused".into());
    assert_eq!(err.user_message("Ошибка отправки", "Ошибка подключения"), "Ошибка подключения");
    assert!(err.server_message().is_none());
}

#[test]
fn user_message_parse_failure_uses_fallback() {
    let err = ApiError::Parse("expected value".into());
    assert_eq!(err.user_message("fallback", "offline"), "fallback");
}

// =============================================================================
// Message
// =============================================================================

#[test]
fn message_deserializes_camel_case() {
    let json = serde_json::json!({
        "id": 7,
        "userId": 3,
        "username": "Катя",
        "message": "привет",
        "createdAt": "2025-10-28T12:00:00",
        "isAdmin": true
    });
    let msg: Message = serde_json::from_value(json).unwrap();
    assert_eq!(msg.id, 7);
    assert_eq!(msg.user_id, 3);
    assert!(msg.is_admin);
}

#[test]
fn message_missing_optional_fields_default() {
    let json = serde_json::json!({
        "id": 1,
        "username": "a",
        "message": "b",
        "createdAt": "2025-10-28T12:00:00"
    });
    let msg: Message = serde_json::from_value(json).unwrap();
    assert_eq!(msg.user_id, 0);
    assert!(!msg.is_admin);
}

#[test]
fn message_list_without_messages_field_is_none() {
    let list: MessageList = serde_json::from_str("{}").unwrap();
    assert!(list.messages.is_none());
}

// =============================================================================
// Outgoing bodies
// =============================================================================

#[test]
fn send_message_omits_admin_flag_when_false() {
    let body = SendMessage { user_id: 1, username: "u".into(), message: "m".into(), is_admin: false };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "userId": 1, "username": "u", "message": "m" }));
}

#[test]
fn send_message_includes_admin_flag_when_true() {
    let body = SendMessage { user_id: 1, username: "u".into(), message: "m".into(), is_admin: true };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["isAdmin"], serde_json::json!(true));
}

#[test]
fn auth_request_uses_lowercase_action() {
    let body = AuthRequest { action: AuthAction::Register, username: "vanya", password: "secret1" };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["action"], "register");
}

#[test]
fn like_toggle_serializes_action() {
    let body = LikeToggle { user_id: 2, subject: "Музыка", action: LikeAction::Unlike };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "userId": 2, "subject": "Музыка", "action": "unlike" }));
}

// =============================================================================
// ContactRole
// =============================================================================

#[test]
fn contact_role_serializes_russian_names() {
    assert_eq!(serde_json::to_value(ContactRole::Teacher).unwrap(), "учитель");
    assert_eq!(ContactRole::Student.as_str(), "ученик");
}

#[test]
fn contact_role_parses_both_languages() {
    assert_eq!("админ".parse::<ContactRole>(), Ok(ContactRole::Admin));
    assert_eq!("teacher".parse::<ContactRole>(), Ok(ContactRole::Teacher));
    assert!("директор".parse::<ContactRole>().is_err());
}
