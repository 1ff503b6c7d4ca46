#[cfg(test)]
#[path = "news_test.rs"]
mod news_test;

use serde::Serialize;

use crate::net::types::NewsDraft;

/// A news item compiled into the client, shown alongside the remote feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StaticNews {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub date: &'static str,
}

pub const STATIC_NEWS: [StaticNews; 3] = [
    StaticNews {
        id: 1,
        title: "Обновление платформы",
        description: "Запущена новая версия с улучшенным интерфейсом и быстродействием",
        date: "28 октября 2025",
    },
    StaticNews {
        id: 2,
        title: "Новые контакты",
        description: "Добавлены контакты всех учеников для удобной связи",
        date: "30 октября 2025",
    },
    StaticNews {
        id: 3,
        title: "Техническое обслуживание",
        description: "Плановые работы завершены успешно, все системы работают стабильно",
        date: "20 октября 2025",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Title and content required")]
pub struct NewsError;

/// Build a news draft from form input.
///
/// # Errors
///
/// [`NewsError`] when the title or content is blank after trimming.
pub fn news_draft(id: Option<i64>, title: &str, content: &str) -> Result<NewsDraft, NewsError> {
    let (title, content) = (title.trim(), content.trim());
    if title.is_empty() || content.is_empty() {
        return Err(NewsError);
    }
    Ok(NewsDraft { id, title: title.to_owned(), content: content.to_owned() })
}
