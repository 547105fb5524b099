use chrono::{NaiveTime, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub code: String,
}

/// One weekly lesson slot.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectSchedule {
    pub id: i64,
    pub subject_id: i64,
    pub class_id: i64,
    pub teacher_id: i64,
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

fn serialize_weekday<S: serde::Serializer>(w: &Weekday, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&w.to_string())
}

/// Weekday ⇔ DB integer (Monday = 1 … Sunday = 7)
pub fn weekday_to_db(w: Weekday) -> i64 {
    i64::from(w.number_from_monday())
}

pub fn weekday_from_db(n: i64) -> Option<Weekday> {
    match n {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}
