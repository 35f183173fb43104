//! Schedule output types: blocks proposed by the reasoning service and their
//! per-day / per-week aggregates.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Weekday};

use crate::error::StudyError;
use crate::time::weekday_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Study,
    Break,
    Review,
    /// Any other label, kept verbatim.
    Other(String),
}

impl BlockKind {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "study" => BlockKind::Study,
            "break" => BlockKind::Break,
            "review" => BlockKind::Review,
            _ => BlockKind::Other(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BlockKind::Study => "study",
            BlockKind::Break => "break",
            BlockKind::Review => "review",
            BlockKind::Other(s) => s,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One contiguous interval of a proposed timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyBlock {
    start: NaiveDateTime,
    end: NaiveDateTime,
    pub subject: String,
    pub kind: BlockKind,
    pub description: Option<String>,
}

impl StudyBlock {
    /// `end` must be strictly after `start`.
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        subject: impl Into<String>,
        kind: BlockKind,
    ) -> Result<Self, StudyError> {
        if end <= start {
            return Err(StudyError::validation(format!(
                "block ends at {} which is not after its start {}",
                end.format("%H:%M"),
                start.format("%H:%M")
            )));
        }
        Ok(Self {
            start,
            end,
            subject: subject.into(),
            kind,
            description: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let d = description.into();
        self.description = if d.trim().is_empty() { None } else { Some(d) };
        self
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_seconds().div_euclid(60)
    }
}

/// Blocks for one calendar date, kept sorted by start time.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySchedule {
    pub date: NaiveDate,
    blocks: Vec<StudyBlock>,
}

impl DailySchedule {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            blocks: Vec::new(),
        }
    }

    pub fn from_blocks(date: NaiveDate, blocks: impl IntoIterator<Item = StudyBlock>) -> Self {
        let mut out = Self::new(date);
        for b in blocks {
            out.add_block(b);
        }
        out
    }

    pub fn add_block(&mut self, block: StudyBlock) {
        let at = self.blocks.partition_point(|b| b.start <= block.start);
        self.blocks.insert(at, block);
    }

    pub fn blocks(&self) -> &[StudyBlock] {
        &self.blocks
    }

    pub fn study_minutes(&self) -> i64 {
        self.minutes_of(&BlockKind::Study)
    }

    pub fn break_minutes(&self) -> i64 {
        self.minutes_of(&BlockKind::Break)
    }

    fn minutes_of(&self, kind: &BlockKind) -> i64 {
        self.blocks
            .iter()
            .filter(|b| &b.kind == kind)
            .map(StudyBlock::duration_minutes)
            .sum()
    }
}

/// Blocks proposed for one weekday of a weekly plan.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub weekday: Weekday,
    pub date: NaiveDate,
    pub blocks: Vec<StudyBlock>,
}

impl DayPlan {
    pub fn label(&self) -> &'static str {
        weekday_name(self.weekday)
    }
}

/// Weekly plan, Monday first. Only days present in the response appear.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeeklySchedule {
    days: Vec<DayPlan>,
}

impl WeeklySchedule {
    /// Insert or replace the plan for `day.weekday`.
    pub fn insert(&mut self, day: DayPlan) {
        let key = day.weekday.num_days_from_monday();
        match self
            .days
            .binary_search_by_key(&key, |d| d.weekday.num_days_from_monday())
        {
            Ok(i) => self.days[i] = day,
            Err(i) => self.days.insert(i, day),
        }
    }

    pub fn get(&self, weekday: Weekday) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.weekday == weekday)
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn weekdays(&self) -> Vec<Weekday> {
        self.days.iter().map(|d| d.weekday).collect()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn block(sh: u32, sm: u32, eh: u32, em: u32, kind: BlockKind) -> StudyBlock {
        StudyBlock::new(at(sh, sm), at(eh, em), "Physics", kind).unwrap()
    }

    #[test]
    fn test_block_rejects_non_positive_interval() {
        assert!(StudyBlock::new(at(10, 0), at(10, 0), "x", BlockKind::Study).is_err());
        assert!(StudyBlock::new(at(10, 0), at(9, 0), "x", BlockKind::Study).is_err());
    }

    #[test]
    fn test_duration_minutes_floors() {
        let start = at(9, 0);
        let end = start + chrono::Duration::seconds(90 * 60 + 59);
        let b = StudyBlock::new(start, end, "x", BlockKind::Study).unwrap();
        assert_eq!(b.duration_minutes(), 90);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(BlockKind::from_label("Study"), BlockKind::Study);
        assert_eq!(BlockKind::from_label("break"), BlockKind::Break);
        assert_eq!(BlockKind::from_label("review"), BlockKind::Review);
        assert_eq!(BlockKind::from_label("lunch"), BlockKind::Other("lunch".to_string()));
        assert_eq!(BlockKind::Other("lunch".to_string()).to_string(), "lunch");
    }

    #[test]
    fn test_empty_description_is_none() {
        let b = block(9, 0, 10, 0, BlockKind::Study).with_description("  ");
        assert_eq!(b.description, None);
    }

    #[test]
    fn test_daily_schedule_sorted_and_totals() {
        let mut day = DailySchedule::new(at(0, 0).date());
        day.add_block(block(14, 0, 15, 30, BlockKind::Study));
        day.add_block(block(9, 0, 11, 0, BlockKind::Study));
        day.add_block(block(11, 0, 11, 15, BlockKind::Break));
        day.add_block(block(15, 30, 16, 0, BlockKind::Review));

        let starts: Vec<_> = day.blocks().iter().map(|b| b.start()).collect();
        assert_eq!(starts, vec![at(9, 0), at(11, 0), at(14, 0), at(15, 30)]);
        assert_eq!(day.study_minutes(), 210);
        assert_eq!(day.break_minutes(), 15);
    }

    #[test]
    fn test_weekly_schedule_orders_monday_first() {
        let date = at(0, 0).date();
        let mut week = WeeklySchedule::default();
        week.insert(DayPlan {
            weekday: Weekday::Fri,
            date,
            blocks: vec![],
        });
        week.insert(DayPlan {
            weekday: Weekday::Mon,
            date,
            blocks: vec![],
        });
        assert_eq!(week.weekdays(), vec![Weekday::Mon, Weekday::Fri]);
        assert_eq!(week.get(Weekday::Fri).map(|d| d.label()), Some("Friday"));
        assert!(week.get(Weekday::Tue).is_none());
    }
}
