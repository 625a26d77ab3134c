use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl DatePart {
    fn width(self) -> usize {
        match self {
            DatePart::Year => 4,
            _ => 2,
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            DatePart::Year => "[YYYY]",
            DatePart::Month => "[MM]",
            DatePart::Day => "[DD]",
            DatePart::Hour => "[hh]",
            DatePart::Minute => "[mm]",
        }
    }
}

/// Digit-by-digit editor for a date, optionally with a time of day. A part
/// is committed once all its digits are typed and only if the result is a
/// real calendar value.
#[derive(Debug, Clone, PartialEq)]
pub struct DateInputState {
    pub value: NaiveDateTime,
    pub with_time: bool,
    pub editing: bool,
    pub part: DatePart,
    pub buffer: String,
}

impl DateInputState {
    pub fn date(date: NaiveDate) -> Self {
        Self::build(date.and_time(NaiveTime::MIN), false)
    }

    pub fn date_time(at: DateTime<Utc>) -> Self {
        let at = at.naive_utc();
        let minute = at.date().and_hms_opt(at.hour(), at.minute(), 0).unwrap_or(at);
        Self::build(minute, true)
    }

    fn build(value: NaiveDateTime, with_time: bool) -> Self {
        Self {
            value,
            with_time,
            editing: false,
            part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn as_date(&self) -> NaiveDate {
        self.value.date()
    }

    pub fn as_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.value)
    }

    fn parts(&self) -> &'static [DatePart] {
        if self.with_time {
            &[DatePart::Year, DatePart::Month, DatePart::Day, DatePart::Hour, DatePart::Minute]
        } else {
            &[DatePart::Year, DatePart::Month, DatePart::Day]
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.part = DatePart::Year;
        self.buffer.clear();
    }

    fn step(&mut self, forward: bool) {
        let parts = self.parts();
        let index = parts.iter().position(|p| *p == self.part).unwrap_or(0);
        let next = if forward { (index + 1) % parts.len() } else { (index + parts.len() - 1) % parts.len() };
        self.part = parts[next];
        self.buffer.clear();
    }

    fn commit(&mut self, n: u32) {
        let (date, time) = (self.value.date(), self.value.time());
        let updated = match self.part {
            DatePart::Year => i32::try_from(n)
                .ok()
                .filter(|y| (1900..=2100).contains(y))
                .and_then(|y| date.with_year(y))
                .map(|d| d.and_time(time)),
            DatePart::Month => date.with_month(n).map(|d| d.and_time(time)),
            DatePart::Day => date.with_day(n).map(|d| d.and_time(time)),
            DatePart::Hour => self.value.with_hour(n),
            DatePart::Minute => self.value.with_minute(n),
        };
        if let Some(value) = updated {
            self.value = value;
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                if self.buffer.len() >= self.part.width() {
                    if let Ok(n) = self.buffer.parse::<u32>() {
                        self.commit(n);
                    }
                    self.buffer.clear();
                    self.step(true);
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Right | KeyCode::Tab => self.step(true),
            KeyCode::Left => self.step(false),
            _ => {}
        }
    }

    pub fn display(&self) -> String {
        let pieces = [
            (DatePart::Year, format!("{:04}", self.value.year())),
            (DatePart::Month, format!("{:02}", self.value.month())),
            (DatePart::Day, format!("{:02}", self.value.day())),
            (DatePart::Hour, format!("{:02}", self.value.hour())),
            (DatePart::Minute, format!("{:02}", self.value.minute())),
        ];
        let shown = |part: DatePart, text: &str| {
            if !self.editing || part != self.part {
                text.to_string()
            } else if self.buffer.is_empty() {
                part.placeholder().to_string()
            } else {
                format!("[{}]", self.buffer)
            }
        };

        let date = format!(
            "{}-{}-{}",
            shown(pieces[0].0, &pieces[0].1),
            shown(pieces[1].0, &pieces[1].1),
            shown(pieces[2].0, &pieces[2].1)
        );
        if self.with_time {
            format!(
                "{date} {}:{}",
                shown(pieces[3].0, &pieces[3].1),
                shown(pieces[4].0, &pieces[4].1)
            )
        } else {
            date
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_digits_walks_through_parts() {
        let mut state = DateInputState::date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        state.toggle_editing();
        typed(&mut state, "20250302");
        assert_eq!(state.as_date(), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }

    #[test]
    fn impossible_day_is_ignored() {
        let mut state = DateInputState::date(NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
        state.toggle_editing();
        state.handle_key(KeyCode::Right);
        state.handle_key(KeyCode::Right);
        typed(&mut state, "30");
        assert_eq!(state.as_date(), NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
    }

    #[test]
    fn time_parts_only_with_time() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let mut state = DateInputState::date_time(at);
        state.toggle_editing();
        typed(&mut state, "202405011415");
        assert_eq!(state.as_utc(), Utc.with_ymd_and_hms(2024, 5, 1, 14, 15, 0).unwrap());
        assert_eq!(state.display(), "[YYYY]-05-01 14:15");
    }
}
