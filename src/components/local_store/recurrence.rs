//! RRULE text for recurring events.

/// Recurrence frequencies the store understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            "yearly" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    fn as_rrule(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

/// Optional parts of a rule
#[derive(Debug, Default)]
pub struct RuleParts<'a> {
    pub interval: Option<u32>,
    /// Already formatted `UNTIL` value
    pub until: Option<String>,
    pub occurrence: Option<u32>,
    pub days_of_week: Option<&'a [String]>,
    pub week_start: Option<&'a str>,
    pub week_position_in_month: Option<i32>,
    pub days_of_month: Option<&'a [u32]>,
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the rule, or `None` for an unknown frequency
pub fn build_rule(frequency: &str, parts: &RuleParts<'_>) -> Option<String> {
    let frequency = Frequency::parse(frequency)?;
    let mut rule = format!("FREQ={}", frequency.as_rrule());

    let days_of_week = parts.days_of_week.filter(|days| !days.is_empty());
    let days_of_month = parts.days_of_month.filter(|days| !days.is_empty());

    if let (Frequency::Weekly, Some(days)) = (frequency, days_of_week) {
        rule.push_str(&format!(";BYDAY={}", join(days)));
    }

    if frequency == Frequency::Monthly {
        match (days_of_week, parts.week_position_in_month, days_of_month) {
            (Some(days), Some(position), _) => {
                rule.push_str(&format!(";BYSETPOS={};BYDAY={}", position, join(days)));
            }
            (_, _, Some(month_days)) => {
                rule.push_str(&format!(";BYMONTHDAY={}", join(month_days)));
            }
            _ => {}
        }
    }

    if let Some(week_start) = parts.week_start {
        rule.push_str(&format!(";WKST={}", week_start));
    }

    if let Some(interval) = parts.interval {
        rule.push_str(&format!(";INTERVAL={}", interval));
    }

    if let Some(until) = &parts.until {
        rule.push_str(&format!(";UNTIL={}", until));
    } else if let Some(count) = parts.occurrence {
        rule.push_str(&format!(";COUNT={}", count));
    }

    Some(rule)
}
