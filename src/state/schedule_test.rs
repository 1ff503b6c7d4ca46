use super::*;

fn lesson(start: &str, end: &str) -> Lesson {
    Lesson { number: 1, subject: "Математика".to_owned(), start_time: start.to_owned(), end_time: end.to_owned() }
}

const AT_8_00: u16 = 8 * 60;
const AT_8_30: u16 = 8 * 60 + 30;
const AT_9_15: u16 = 9 * 60 + 15;

// =============================================================
// parse_hhmm
// =============================================================

#[test]
fn parse_hhmm_accepts_clock_times() {
    assert_eq!(parse_hhmm("08:30"), Some(AT_8_30));
    assert_eq!(parse_hhmm("8:05"), Some(8 * 60 + 5));
    assert_eq!(parse_hhmm("23:59"), Some(23 * 60 + 59));
}

#[test]
fn parse_hhmm_rejects_garbage() {
    assert_eq!(parse_hhmm("08:30складно"), None);
    assert_eq!(parse_hhmm("24:00"), None);
    assert_eq!(parse_hhmm("12:60"), None);
    assert_eq!(parse_hhmm("0830"), None);
    assert_eq!(parse_hhmm(":30"), None);
    assert_eq!(parse_hhmm("-1:30"), None);
    assert_eq!(parse_hhmm(""), None);
}

// =============================================================
// LessonStatus
// =============================================================

#[test]
fn status_active_includes_start_excludes_end() {
    let l = lesson("08:30", "09:15");
    assert_eq!(LessonStatus::at(&l, AT_8_30), LessonStatus::Active);
    assert_eq!(LessonStatus::at(&l, AT_9_15 - 1), LessonStatus::Active);
    assert_eq!(LessonStatus::at(&l, AT_9_15), LessonStatus::Finished);
}

#[test]
fn status_upcoming_counts_minutes() {
    let l = lesson("08:30", "09:15");
    assert_eq!(LessonStatus::at(&l, AT_8_00), LessonStatus::Upcoming { minutes_until: 30 });
}

#[test]
fn malformed_times_never_panic() {
    let l = lesson("08:30складно", "09:15");
    for minute in [0, AT_8_30, AT_9_15, 24 * 60 - 1] {
        assert_eq!(l.status_at(minute), LessonStatus::Unknown);
    }
    assert_eq!(lesson("08:30", "").status_at(AT_8_30), LessonStatus::Unknown);
}

#[test]
fn labels_match_display_text() {
    assert_eq!(LessonStatus::Active.label(), "Урок идёт");
    assert_eq!(LessonStatus::Finished.label(), "Урок закончился");
    assert_eq!(LessonStatus::Upcoming { minutes_until: 45 }.label(), "До начала урока: 45 мин");
    assert_eq!(LessonStatus::Upcoming { minutes_until: 125 }.label(), "До начала урока: 2 ч 5 мин");
    assert_eq!(LessonStatus::Upcoming { minutes_until: 60 }.to_string(), "До начала урока: 1 ч 0 мин");
}

#[test]
fn only_active_is_active() {
    assert!(LessonStatus::Active.is_active());
    assert!(!LessonStatus::Finished.is_active());
    assert!(!LessonStatus::Unknown.is_active());
}

// =============================================================
// Classrooms
// =============================================================

#[test]
fn classroom_lookup() {
    assert_eq!(classroom("Математика"), "204");
    assert_eq!(classroom("Биология"), "109");
    assert_eq!(classroom("Физкультура"), NO_CLASSROOM);
}

// =============================================================
// SchoolDay
// =============================================================

#[test]
fn day_parses_many_spellings() {
    assert_eq!("mon".parse::<SchoolDay>(), Ok(SchoolDay::Monday));
    assert_eq!("Среда".parse::<SchoolDay>(), Ok(SchoolDay::Wednesday));
    assert_eq!("ПТ".parse::<SchoolDay>(), Ok(SchoolDay::Friday));
    assert_eq!("4".parse::<SchoolDay>(), Ok(SchoolDay::Thursday));
    assert!("sat".parse::<SchoolDay>().is_err());
}

#[test]
fn weekends_have_no_school_day() {
    assert_eq!(SchoolDay::from_weekday(Weekday::Saturday), None);
    assert_eq!(SchoolDay::from_weekday(Weekday::Sunday), None);
    assert_eq!(SchoolDay::from_weekday(Weekday::Tuesday), Some(SchoolDay::Tuesday));
}

// =============================================================
// Schedule
// =============================================================

#[test]
fn weekly_table_numbers_lessons_one_to_six() {
    let schedule = Schedule::weekly();
    for day in SchoolDay::ALL {
        let numbers: Vec<u8> = schedule.lessons(day).iter().map(|l| l.number).collect();
        assert_eq!(numbers, (1..=LESSONS_PER_DAY).collect::<Vec<_>>());
    }
}

#[test]
fn weekly_table_times_all_parse() {
    let schedule = Schedule::weekly();
    for day in SchoolDay::ALL {
        for l in schedule.lessons(day) {
            assert_ne!(l.status_at(0), LessonStatus::Unknown, "{day} #{}", l.number);
        }
    }
}

#[test]
fn lesson_lookup_by_number() {
    let schedule = Schedule::weekly();
    let first = schedule.lesson(SchoolDay::Monday, 1).unwrap();
    assert_eq!(first.subject, "РОВ");
    assert_eq!(first.start_time, "08:30");
    assert!(schedule.lesson(SchoolDay::Monday, 7).is_none());
}

#[test]
fn update_lesson_replaces_fields() {
    let mut schedule = Schedule::weekly();
    let updated = schedule.update_lesson(SchoolDay::Tuesday, 2, " Музыка ", "09:30", "10:15").unwrap().clone();
    assert_eq!(updated.subject, "Музыка");
    assert_eq!(schedule.lesson(SchoolDay::Tuesday, 2), Some(&updated));
    assert_eq!(updated.classroom(), "205");
}

#[test]
fn update_lesson_rejects_bad_input() {
    let mut schedule = Schedule::weekly();
    let before = schedule.clone();
    assert_eq!(
        schedule.update_lesson(SchoolDay::Monday, 1, "  ", "08:30", "09:15"),
        Err(ScheduleError::BlankSubject)
    );
    assert_eq!(
        schedule.update_lesson(SchoolDay::Monday, 1, "Труд", "08:30складно", "09:15"),
        Err(ScheduleError::BadTime("08:30складно".to_owned()))
    );
    assert_eq!(
        schedule.update_lesson(SchoolDay::Monday, 1, "Труд", "09:15", "08:30"),
        Err(ScheduleError::EndsBeforeStart)
    );
    assert_eq!(
        schedule.update_lesson(SchoolDay::Monday, 9, "Труд", "08:30", "09:15"),
        Err(ScheduleError::UnknownLesson { day: SchoolDay::Monday, number: 9 })
    );
    assert_eq!(schedule, before);
}

#[test]
fn lesson_serializes_camel_case() {
    let json = serde_json::to_value(lesson("08:30", "09:15")).unwrap();
    assert_eq!(json["startTime"], "08:30");
    assert_eq!(json["endTime"], "09:15");
}
