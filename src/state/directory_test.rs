use super::*;

fn names(people: &[&Person]) -> Vec<&'static str> {
    people.iter().map(|p| p.name).collect()
}

#[test]
fn empty_query_lists_everyone() {
    assert_eq!(search_students("").len(), STUDENTS.len());
}

#[test]
fn search_matches_name_case_insensitively() {
    assert_eq!(names(&search_students("матвей")), vec!["РАДИОНОВ Матвей", "Терехов Матвей"]);
    assert_eq!(names(&search_students("радионов")), vec!["РАДИОНОВ Матвей"]);
}

#[test]
fn search_matches_phone_substring() {
    assert_eq!(names(&search_students("088-06")), vec!["Алексей Гусев"]);
    assert_eq!(search_students("+7 9").len(), STUDENTS.len());
}

#[test]
fn search_without_match_is_empty() {
    assert!(search_students("Петя").is_empty());
}

#[test]
fn teachers_are_listed() {
    assert_eq!(TEACHERS[0].name, "Лариса Николаевна");
    assert_eq!(TEACHERS[1].phone, "+7 903 506-52-18");
}

#[test]
fn draft_trims_and_parses_role() {
    let draft = contact_draft(None, "  Катя ", " +7 985 168-66-26 ", "ученик").unwrap();
    assert_eq!(
        draft,
        ContactDraft {
            id: None,
            name: "Катя".to_owned(),
            phone: "+7 985 168-66-26".to_owned(),
            role: ContactRole::Student,
        }
    );
}

#[test]
fn draft_requires_all_fields() {
    assert_eq!(contact_draft(None, "Катя", "  ", "ученик"), Err(ContactError::MissingField));
    assert_eq!(
        ContactError::MissingField.to_string(),
        "Name, phone and role required"
    );
}

#[test]
fn draft_rejects_unknown_role() {
    let err = contact_draft(Some(3), "Катя", "+7", "директор").unwrap_err();
    assert!(matches!(err, ContactError::BadRole(ref m) if m.starts_with("Role must be")));
}

#[test]
fn draft_serializes_role_in_russian() {
    let draft = contact_draft(Some(3), "Катя", "+7", "teacher").unwrap();
    let json = serde_json::to_value(&draft).unwrap();
    assert_eq!(json["role"], "учитель");
    assert_eq!(json["id"], 3);
}
