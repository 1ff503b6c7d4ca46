//! Weekly lesson table, lesson status, and classroom lookup.
//!
//! DESIGN
//! ======
//! The table is compiled in and only changes through admin lesson edits,
//! which live for the lifetime of the `Schedule` value. Times stay as the
//! `HH:MM` strings they are edited as; status derivation parses them on
//! demand and degrades to [`LessonStatus::Unknown`] instead of failing.

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, Weekday};

pub const LESSONS_PER_DAY: u8 = 6;
pub const NO_CLASSROOM: &str = "—";

/// `(start, end)` for lessons 1..=6.
const BELLS: [(&str, &str); LESSONS_PER_DAY as usize] = [
    ("08:30", "09:15"),
    ("09:25", "10:10"),
    ("10:30", "11:15"),
    ("11:35", "12:20"),
    ("12:30", "13:15"),
    ("13:25", "14:10"),
];

const WEEK: [[&str; LESSONS_PER_DAY as usize]; 5] = [
    ["РОВ", "Русский язык", "Математика", "Литература", "Английский язык", "История"],
    ["Математика", "Русский язык", "Биология", "Изо", "Литература", "Труд"],
    ["Русский язык", "Математика", "Информатика", "Английский язык", "Музыка", "География"],
    ["Математика", "Литература", "История", "Русский язык", "Английский язык", "Труд"],
    ["Русский язык", "Математика", "Биология", "География", "Литература", "Изо"],
];

const CLASSROOMS: [(&str, &str); 12] = [
    ("РОВ", "310"),
    ("Русский язык", "303"),
    ("Математика", "204"),
    ("Литература", "303"),
    ("Английский язык", "312"),
    ("История", "209"),
    ("Изо", "210"),
    ("Труд", "125"),
    ("Информатика", "201"),
    ("Музыка", "205"),
    ("География", "310"),
    ("Биология", "109"),
];

/// Room for a subject, or `"—"` when the subject has none.
#[must_use]
pub fn classroom(subject: &str) -> &'static str {
    CLASSROOMS
        .iter()
        .find(|(name, _)| *name == subject)
        .map_or(NO_CLASSROOM, |&(_, room)| room)
}

// =============================================================================
// DAYS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl SchoolDay {
    pub const ALL: [Self; 5] = [Self::Monday, Self::Tuesday, Self::Wednesday, Self::Thursday, Self::Friday];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "Понедельник",
            Self::Tuesday => "Вторник",
            Self::Wednesday => "Среда",
            Self::Thursday => "Четверг",
            Self::Friday => "Пятница",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
        }
    }

    /// Weekends have no lessons.
    #[must_use]
    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Monday => Some(Self::Monday),
            Weekday::Tuesday => Some(Self::Tuesday),
            Weekday::Wednesday => Some(Self::Wednesday),
            Weekday::Thursday => Some(Self::Thursday),
            Weekday::Friday => Some(Self::Friday),
            Weekday::Saturday | Weekday::Sunday => None,
        }
    }

    #[must_use]
    pub fn today() -> Option<Self> {
        Self::from_weekday(local_now().weekday())
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchoolDay {
    type Err = String;

    /// Accepts English or Russian names and abbreviations, or `1`..`5`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let day = match raw.trim().to_lowercase().as_str() {
            "1" | "mon" | "monday" | "пн" | "понедельник" => Self::Monday,
            "2" | "tue" | "tuesday" | "вт" | "вторник" => Self::Tuesday,
            "3" | "wed" | "wednesday" | "ср" | "среда" => Self::Wednesday,
            "4" | "thu" | "thursday" | "чт" | "четверг" => Self::Thursday,
            "5" | "fri" | "friday" | "пт" | "пятница" => Self::Friday,
            _ => return Err(format!("unknown school day '{raw}' (expected mon..fri or 1..5)")),
        };
        Ok(day)
    }
}

// =============================================================================
// LESSONS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub number: u8,
    pub subject: String,
    pub start_time: String,
    pub end_time: String,
}

impl Lesson {
    #[must_use]
    pub fn classroom(&self) -> &'static str {
        classroom(&self.subject)
    }

    #[must_use]
    pub fn status_at(&self, minute_of_day: u16) -> LessonStatus {
        LessonStatus::at(self, minute_of_day)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonStatus {
    Active,
    Upcoming { minutes_until: u16 },
    Finished,
    /// Start or end is not a valid `HH:MM`.
    Unknown,
}

impl LessonStatus {
    /// Active on `start <= now < end`.
    #[must_use]
    pub fn at(lesson: &Lesson, minute_of_day: u16) -> Self {
        let (Some(start), Some(end)) = (parse_hhmm(&lesson.start_time), parse_hhmm(&lesson.end_time)) else {
            return Self::Unknown;
        };
        if minute_of_day < start {
            Self::Upcoming { minutes_until: start - minute_of_day }
        } else if minute_of_day < end {
            Self::Active
        } else {
            Self::Finished
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Active => "Урок идёт".to_owned(),
            Self::Upcoming { minutes_until } => {
                let (hours, minutes) = (minutes_until / 60, minutes_until % 60);
                if hours > 0 {
                    format!("До начала урока: {hours} ч {minutes} мин")
                } else {
                    format!("До начала урока: {minutes} мин")
                }
            }
            Self::Finished => "Урок закончился".to_owned(),
            Self::Unknown => "Время урока не указано".to_owned(),
        }
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Minutes since midnight for `HH:MM`; anything else is `None`.
#[must_use]
pub fn parse_hhmm(raw: &str) -> Option<u16> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    let number = |s: &str| {
        if s.is_empty() || s.len() > 2 {
            return None;
        }
        s.bytes()
            .try_fold(0_u16, |acc, b| b.is_ascii_digit().then(|| acc * 10 + u16::from(b - b'0')))
    };
    let (hours, minutes) = (number(hours)?, number(minutes)?);
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

fn local_now() -> OffsetDateTime {
    // Local offset is unavailable on some platforms once threads exist.
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Current local time as minutes since midnight.
#[must_use]
pub fn minute_of_day_now() -> u16 {
    let now = local_now();
    u16::from(now.hour()) * 60 + u16::from(now.minute())
}

// =============================================================================
// SCHEDULE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("{day} has no lesson #{number}")]
    UnknownLesson { day: SchoolDay, number: u8 },
    #[error("subject is required")]
    BlankSubject,
    #[error("invalid time '{0}' (expected HH:MM)")]
    BadTime(String),
    #[error("lesson must end after it starts")]
    EndsBeforeStart,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    days: [Vec<Lesson>; 5],
}

impl Default for Schedule {
    fn default() -> Self {
        Self::weekly()
    }
}

impl Schedule {
    /// The built-in Monday–Friday table.
    #[must_use]
    pub fn weekly() -> Self {
        let days = WEEK.map(|subjects| {
            subjects
                .iter()
                .zip(BELLS)
                .zip(1..)
                .map(|((subject, (start, end)), number)| Lesson {
                    number,
                    subject: (*subject).to_owned(),
                    start_time: start.to_owned(),
                    end_time: end.to_owned(),
                })
                .collect()
        });
        Self { days }
    }

    #[must_use]
    pub fn lessons(&self, day: SchoolDay) -> &[Lesson] {
        &self.days[day.index()]
    }

    #[must_use]
    pub fn lesson(&self, day: SchoolDay, number: u8) -> Option<&Lesson> {
        self.lessons(day).iter().find(|l| l.number == number)
    }

    /// Replace subject and times of one lesson.
    ///
    /// # Errors
    ///
    /// See [`ScheduleError`]; the schedule is unchanged on error.
    pub fn update_lesson(
        &mut self,
        day: SchoolDay,
        number: u8,
        subject: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<&Lesson, ScheduleError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ScheduleError::BlankSubject);
        }
        let start = parse_hhmm(start_time).ok_or_else(|| ScheduleError::BadTime(start_time.to_owned()))?;
        let end = parse_hhmm(end_time).ok_or_else(|| ScheduleError::BadTime(end_time.to_owned()))?;
        if end <= start {
            return Err(ScheduleError::EndsBeforeStart);
        }

        let lesson = self.days[day.index()]
            .iter_mut()
            .find(|l| l.number == number)
            .ok_or(ScheduleError::UnknownLesson { day, number })?;
        lesson.subject = subject.to_owned();
        lesson.start_time = start_time.trim().to_owned();
        lesson.end_time = end_time.trim().to_owned();
        Ok(lesson)
    }
}
