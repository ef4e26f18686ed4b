use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Opening hours for one weekday. Seven fixed rows, weekday 0 = Monday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_working_day: bool,
}

impl WorkingHours {
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday {
            0 => "Monday",
            1 => "Tuesday",
            2 => "Wednesday",
            3 => "Thursday",
            4 => "Friday",
            5 => "Saturday",
            _ => "Sunday",
        }
    }

    pub fn matches(&self, day: Weekday) -> bool {
        u32::from(self.weekday) == day.num_days_from_monday()
    }
}
