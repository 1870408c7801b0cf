use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Pomodoro, Category::ShortBreak, Category::LongBreak];

    /// Persisted text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pomodoro => "Pomodoro",
            Category::ShortBreak => "ShortBreak",
            Category::LongBreak => "LongBreak",
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Category::ShortBreak | Category::LongBreak)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pomodoro" => Ok(Category::Pomodoro),
            "ShortBreak" => Ok(Category::ShortBreak),
            "LongBreak" => Ok(Category::LongBreak),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Lifecycle of a single interval.
///
/// ```text
/// NotStarted -> Running <-> Paused
/// Running -> Done
/// NotStarted | Running | Paused -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum IntervalState {
    NotStarted = 0,
    Running = 1,
    Paused = 2,
    Done = 3,
    Cancelled = 4,
}

impl IntervalState {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(IntervalState::NotStarted),
            1 => Some(IntervalState::Running),
            2 => Some(IntervalState::Paused),
            3 => Some(IntervalState::Done),
            4 => Some(IntervalState::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, IntervalState::Done | IntervalState::Cancelled)
    }
}

/// Category selector for summary queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    Only(Category),
    /// ShortBreak or LongBreak.
    AnyBreak,
    Any,
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::Only(c) => *c == category,
            CategoryFilter::AnyBreak => category.is_break(),
            CategoryFilter::Any => true,
        }
    }

    /// SQL `LIKE` pattern over the persisted category text.
    pub fn like_pattern(&self) -> &'static str {
        match self {
            CategoryFilter::Only(c) => c.as_str(),
            CategoryFilter::AnyBreak => "%Break",
            CategoryFilter::Any => "%",
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Only(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_text_parses_back() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert!("Nap".parse::<Category>().is_err());
    }

    #[test]
    fn state_codes() {
        assert_eq!(IntervalState::Running.as_u8(), 1);
        assert_eq!(IntervalState::from_u8(3), Some(IntervalState::Done));
        assert_eq!(IntervalState::from_u8(9), None);
        assert!(IntervalState::Cancelled.is_terminal());
        assert!(!IntervalState::Paused.is_terminal());
    }

    #[test]
    fn break_filter_matches_both_breaks() {
        let f = CategoryFilter::AnyBreak;
        assert!(f.matches(Category::ShortBreak));
        assert!(f.matches(Category::LongBreak));
        assert!(!f.matches(Category::Pomodoro));
        assert_eq!(f.like_pattern(), "%Break");
    }
}
