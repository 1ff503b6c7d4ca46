//! Class contact directory: built-in people, search, and contact drafts.

#[cfg(test)]
#[path = "directory_test.rs"]
mod directory_test;

use serde::Serialize;

use crate::net::types::{ContactDraft, ContactRole};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: u32,
    pub name: &'static str,
    pub phone: &'static str,
}

const fn person(id: u32, name: &'static str, phone: &'static str) -> Person {
    Person { id, name, phone }
}

pub static TEACHERS: [Person; 2] = [
    person(1, "Лариса Николаевна", "+7 917 528-32-06"),
    person(2, "Оксана Владимировна", "+7 903 506-52-18"),
];

pub static STUDENTS: [Person; 10] = [
    person(1, "Жанер", "+7 926 288-38-77"),
    person(2, "Алексей Гусев", "+7 969 088-06-74"),
    person(3, "Ваня Левашов", "+7 967 207-03-00"),
    person(4, "Акопян Артем", "+7 917 565-09-85"),
    person(5, "Арина Автономова", "+7 926 893-02-05"),
    person(6, "Дима Селезнев", "+7 977 899-79-37"),
    person(7, "Катя Зубова", "+7 985 168-66-26"),
    person(8, "РАДИОНОВ Матвей", "+7 985 192-79-50"),
    person(9, "Терехов Матвей", "+7 915 325-57-67"),
    person(10, "Оля Кормилицина", "+7 985 577-70-04"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GeneralInfo {
    pub email: &'static str,
    pub phone: &'static str,
    pub group_chat: &'static str,
}

pub const GENERAL_INFO: GeneralInfo = GeneralInfo {
    email: "skorovarovd2014@gmail.com",
    phone: "7 991 653 23 46",
    group_chat: "https://chat.whatsapp.com/HfGjH0oP5BTDfsfD1vzElG?mode=wwt",
};

/// Students whose lowercased name contains the lowercased query, or whose
/// phone contains the query as typed. An empty query matches everyone.
#[must_use]
pub fn search_students(query: &str) -> Vec<&'static Person> {
    let needle = query.to_lowercase();
    STUDENTS
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle) || p.phone.contains(query))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("Name, phone and role required")]
    MissingField,
    #[error("{0}")]
    BadRole(String),
}

/// Build a contact draft from form input, trimming every field.
///
/// # Errors
///
/// [`ContactError::MissingField`] when any field is blank,
/// [`ContactError::BadRole`] for a role outside the three accepted ones.
pub fn contact_draft(id: Option<i64>, name: &str, phone: &str, role: &str) -> Result<ContactDraft, ContactError> {
    let (name, phone, role) = (name.trim(), phone.trim(), role.trim());
    if name.is_empty() || phone.is_empty() || role.is_empty() {
        return Err(ContactError::MissingField);
    }
    let role: ContactRole = role.parse().map_err(ContactError::BadRole)?;
    Ok(ContactDraft { id, name: name.to_owned(), phone: phone.to_owned(), role })
}
