use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const DATE_LEN: usize = 10;
const TIME_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Save,
    Close,
}

#[derive(Debug)]
pub struct SettingsForm {
    open: bool,
    date: String,
    time: String,
    focus: Field,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            open: false,
            date: String::new(),
            time: String::new(),
            focus: Field::Date,
        }
    }
}

impl SettingsForm {
    pub fn open_with(&mut self, target: DateTime<Local>) {
        self.date = target.format(DATE_FORMAT).to_string();
        self.time = target.format(TIME_FORMAT).to_string();
        self.focus = Field::Date;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if !self.open || key.kind == KeyEventKind::Release {
            return FormAction::None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    Field::Date => Field::Time,
                    Field::Time => Field::Date,
                };
            }
            KeyCode::Backspace => {
                self.focused_mut().0.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' || c == ':' => {
                let (field, max_len) = self.focused_mut();
                if field.len() < max_len {
                    field.push(c);
                }
            }
            KeyCode::Enter => return FormAction::Save,
            KeyCode::Esc => return FormAction::Close,
            _ => {}
        }
        FormAction::None
    }

    fn focused_mut(&mut self) -> (&mut String, usize) {
        match self.focus {
            Field::Date => (&mut self.date, DATE_LEN),
            Field::Time => (&mut self.time, TIME_LEN),
        }
    }

    pub fn target(&self) -> Option<DateTime<Local>> {
        combine(&self.date, &self.time)
    }
}

/// Combines a `YYYY-MM-DD` date and an `HH:MM` time into a local instant
/// with zero seconds.
pub fn combine(date: &str, time: &str) -> Option<DateTime<Local>> {
    let (date, time) = (date.trim(), time.trim());
    if date.is_empty() || time.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let time = NaiveTime::parse_from_str(time, TIME_FORMAT).ok()?;
    NaiveDateTime::new(date, time).and_local_timezone(Local).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut SettingsForm, text: &str) {
        for c in text.chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn combines_date_and_time() {
        let t = combine("2031-02-03", "04:05").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2031, 2, 3));
        assert_eq!((t.hour(), t.minute(), t.second()), (4, 5, 0));
    }

    #[test]
    fn empty_or_invalid_fields_give_nothing() {
        assert!(combine("", "04:05").is_none());
        assert!(combine("2031-02-03", "").is_none());
        assert!(combine("2031-13-03", "04:05").is_none());
        assert!(combine("2031-02-03", "25:00").is_none());
    }

    #[test]
    fn open_prefills_from_target() {
        let mut form = SettingsForm::default();
        let target = Local.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).earliest().unwrap();
        form.open_with(target);

        assert!(form.is_open());
        assert_eq!(form.date(), "2031-01-01");
        assert_eq!(form.time(), "00:00");
        assert_eq!(form.target(), Some(target));
    }

    #[test]
    fn editing_switches_fields_and_clamps_length() {
        let mut form = SettingsForm::default();
        form.open_with(Local.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).earliest().unwrap());

        for _ in 0..10 {
            form.handle_key(key(KeyCode::Backspace));
        }
        assert_eq!(form.date(), "");
        type_text(&mut form, "2032-07-04xyz99");
        assert_eq!(form.date(), "2032-07-04");

        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focus(), Field::Time);
        for _ in 0..5 {
            form.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut form, "18:30");

        let t = form.target().unwrap();
        assert_eq!((t.year(), t.month(), t.day(), t.hour(), t.minute()), (2032, 7, 4, 18, 30));
    }

    #[test]
    fn enter_saves_escape_closes() {
        let mut form = SettingsForm::default();
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::None);

        form.open_with(Local::now());
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::Save);
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormAction::Close);
    }
}
