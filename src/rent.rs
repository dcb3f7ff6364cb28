//! Rent status derivation.
//!
//! A unit's rent for a billing month is `paid` once a completed payment for
//! that (unit, month) exists. Otherwise the status depends on where today
//! falls relative to the due date and the end of the grace period.

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use crate::error::RentifyError;
use crate::models::{Payment, PaymentStatus, Unit};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RentStatus {
    Paid,
    Pending,
    OverdueGrace,
    OverdueLate,
}

impl RentStatus {
    pub fn is_overdue(self) -> bool {
        matches!(self, RentStatus::OverdueGrace | RentStatus::OverdueLate)
    }
}

impl fmt::Display for RentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RentStatus::Paid => "paid",
            RentStatus::Pending => "pending",
            RentStatus::OverdueGrace => "overdue-grace",
            RentStatus::OverdueLate => "overdue-late",
        })
    }
}

/// A `YYYY-MM` billing month.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, RentifyError> {
        if !(1..=12).contains(&month) {
            return Err(RentifyError::validation(format!("month {} out of range", month)));
        }
        if !(0..=9999).contains(&year) {
            return Err(RentifyError::validation(format!("year {} out of range", year)));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        // year and month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Calendar date of `due_day` within this month.
    ///
    /// Days past the end of the month spill into the next one, so day 31 of
    /// a 30-day month is the 1st of the following month.
    pub fn due_date(self, due_day: u32) -> NaiveDate {
        add_days(self.first_day(), i64::from(due_day) - 1)
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingMonth {
    type Err = RentifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RentifyError::validation(format!("expected YYYY-MM, got {:?}", s));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !digits(year) || !digits(month) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for BillingMonth {
    type Error = RentifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingMonth> for String {
    fn from(month: BillingMonth) -> Self {
        month.to_string()
    }
}

/// Saturating day arithmetic; the bounds are far beyond any real due date.
fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Source of "today" for status derivation.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date, no timezone normalization.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a date that can be moved by hand.
#[derive(Debug)]
pub struct FixedClock(Mutex<NaiveDate>);

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self(Mutex::new(today))
    }

    pub fn set(&self, today: NaiveDate) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Status of `unit`'s rent for `month` as of `today`.
///
/// Boundaries are whole calendar days: the due day itself is still
/// `Pending` and the last grace day is still `OverdueGrace`.
pub fn evaluate<'a, I>(unit: &Unit, month: BillingMonth, payments: I, today: NaiveDate) -> RentStatus
where
    I: IntoIterator<Item = &'a Payment>,
{
    let paid = payments.into_iter().any(|p| {
        p.unit_id == unit.id && p.month == month && p.status == PaymentStatus::Completed
    });
    if paid {
        return RentStatus::Paid;
    }

    let due = month.due_date(unit.due_date);
    let grace_end = add_days(due, i64::from(unit.grace_period_days));

    if today <= due {
        RentStatus::Pending
    } else if today <= grace_end {
        RentStatus::OverdueGrace
    } else {
        RentStatus::OverdueLate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn unit(due_date: u32, grace_period_days: u32) -> Unit {
        Unit {
            id: "unit-1".to_string(),
            property_id: "prop-1".to_string(),
            name: "Unit 101".to_string(),
            monthly_rent: 1200.0,
            due_date,
            grace_period_days,
        }
    }

    fn payment(month: &str, status: PaymentStatus) -> Payment {
        Payment {
            id: "pay-1".to_string(),
            unit_id: "unit-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            amount: 1200.0,
            date: date(2025, 12, 28),
            month: month.parse().unwrap(),
            status,
        }
    }

    #[test]
    fn test_completed_payment_is_paid_on_any_date() {
        let january: BillingMonth = "2026-01".parse().unwrap();
        let payments = vec![payment("2026-01", PaymentStatus::Completed)];
        for today in [date(2025, 12, 1), date(2026, 1, 4), date(2026, 6, 30)] {
            assert_eq!(evaluate(&unit(1, 5), january, &payments, today), RentStatus::Paid);
        }
    }

    #[test]
    fn test_pending_grace_late_boundaries() {
        let january: BillingMonth = "2026-01".parse().unwrap();
        let u = unit(3, 5);
        let none: Vec<Payment> = vec![];

        assert_eq!(evaluate(&u, january, &none, date(2026, 1, 3)), RentStatus::Pending);
        assert_eq!(evaluate(&u, january, &none, date(2026, 1, 4)), RentStatus::OverdueGrace);
        assert_eq!(evaluate(&u, january, &none, date(2026, 1, 8)), RentStatus::OverdueGrace);
        assert_eq!(evaluate(&u, january, &none, date(2026, 1, 9)), RentStatus::OverdueLate);
        assert_eq!(evaluate(&u, january, &none, date(2026, 1, 10)), RentStatus::OverdueLate);
    }

    #[test]
    fn test_due_on_first_with_five_day_grace() {
        let january: BillingMonth = "2026-01".parse().unwrap();
        let u = unit(1, 5);
        let none: Vec<Payment> = vec![];

        assert_eq!(evaluate(&u, january, &none, date(2025, 12, 31)), RentStatus::Pending);
        assert_eq!(evaluate(&u, january, &none, date(2026, 1, 1)), RentStatus::Pending);
        assert_eq!(evaluate(&u, january, &none, date(2026, 1, 6)), RentStatus::OverdueGrace);
        assert_eq!(evaluate(&u, january, &none, date(2026, 1, 7)), RentStatus::OverdueLate);
    }

    #[test]
    fn test_non_completed_or_other_month_payments_do_not_count() {
        let january: BillingMonth = "2026-01".parse().unwrap();
        let payments = vec![
            payment("2026-01", PaymentStatus::Failed),
            payment("2026-01", PaymentStatus::Pending),
            payment("2025-12", PaymentStatus::Completed),
        ];
        assert_eq!(
            evaluate(&unit(1, 5), january, &payments, date(2026, 1, 20)),
            RentStatus::OverdueLate
        );
    }

    #[test]
    fn test_due_day_past_month_end_rolls_over() {
        let february: BillingMonth = "2026-02".parse().unwrap();
        assert_eq!(february.due_date(31), date(2026, 3, 3));
        assert_eq!(february.due_date(28), date(2026, 2, 28));

        let leap: BillingMonth = "2024-02".parse().unwrap();
        assert_eq!(leap.due_date(30), date(2024, 3, 1));

        // Rolled-over due date still drives the status.
        let none: Vec<Payment> = vec![];
        assert_eq!(evaluate(&unit(31, 0), february, &none, date(2026, 3, 2)), RentStatus::Pending);
        assert_eq!(evaluate(&unit(31, 0), february, &none, date(2026, 3, 4)), RentStatus::OverdueLate);
    }

    #[test]
    fn test_billing_month_parsing() {
        let month: BillingMonth = "2026-01".parse().unwrap();
        assert_eq!((month.year(), month.month()), (2026, 1));
        assert_eq!(month.to_string(), "2026-01");
        assert_eq!(BillingMonth::containing(date(2025, 11, 30)).to_string(), "2025-11");

        for bad in ["2026-13", "2026-00", "2026-1", "26-01", "2026/01", "", "2026-01-05", "+202-01", "2026-+1"] {
            assert!(bad.parse::<BillingMonth>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_billing_month_serde_as_string() {
        let month: BillingMonth = serde_json::from_str("\"2025-12\"").unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2025-12\"");
        assert!(serde_json::from_str::<BillingMonth>("\"December\"").is_err());
    }

    #[test]
    fn test_fixed_clock_moves() {
        let clock = FixedClock::new(date(2026, 1, 3));
        assert_eq!(clock.today(), date(2026, 1, 3));
        clock.set(date(2026, 1, 10));
        assert_eq!(clock.today(), date(2026, 1, 10));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&RentStatus::OverdueGrace).unwrap(), "\"overdue-grace\"");
        assert_eq!(RentStatus::OverdueLate.to_string(), "overdue-late");
        assert!(RentStatus::OverdueGrace.is_overdue());
        assert!(!RentStatus::Pending.is_overdue());
    }
}
