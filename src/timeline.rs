//! Timeline view: today's and tomorrow's slots, grouped by space.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Serialize;

use crate::api::{DaySchedule, ResourceId, Slot, Timeline};

/// Korea Standard Time, UTC+9 all year.
const KST_OFFSET_HOURS: i64 = 9;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineView {
    pub today: DayView,
    pub tomorrow: DayView,
}

impl TimelineView {
    /// Builds the view, dating the two days by the store's local calendar at
    /// `now`.
    pub fn build(timeline: &Timeline, now: DateTime<Utc>) -> Self {
        let (today, tomorrow) = local_dates(now);
        Self {
            today: DayView::build(today, timeline.today.as_ref()),
            tomorrow: DayView::build(tomorrow, timeline.tomorrow.as_ref()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    /// Empty when there is nothing scheduled for the day.
    pub spaces: Vec<SpaceView>,
}

impl DayView {
    fn build(date: NaiveDate, schedule: Option<&DaySchedule>) -> Self {
        let spaces = schedule
            .map(|day| {
                day.spaces
                    .iter()
                    .map(|space| SpaceView {
                        name: space.space_name.clone(),
                        slots: space.slots.iter().map(SlotView::build).collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { date, spaces }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpaceView {
    pub name: Option<String>,
    pub slots: Vec<SlotView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotView {
    pub slot_id: Option<ResourceId>,
    pub time: String,
    #[serde(flatten)]
    pub state: SlotState,
    /// The one manual action the owner can take on this slot.
    pub action: SlotControl,
}

impl SlotView {
    pub fn build(slot: &Slot) -> Self {
        let state = SlotState::of(slot);
        Self {
            slot_id: slot.slot_id.clone(),
            time: slot.time.clone().unwrap_or_else(|| "-".to_string()),
            action: state.control(),
            state,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotState {
    /// Booked by a guest.
    Reserved {
        reservation_id: Option<ResourceId>,
        guest: String,
        menu: String,
    },
    /// Marked sold out by the owner.
    ManuallyClosed,
    Available,
}

impl SlotState {
    pub fn of(slot: &Slot) -> Self {
        match (&slot.reservation_info, slot.is_reserved) {
            (Some(info), true) => SlotState::Reserved {
                reservation_id: info.reservation_id.clone(),
                guest: mask_email(info.user_email.as_deref()),
                menu: info.menu_name.clone().unwrap_or_else(|| "-".to_string()),
            },
            (None, true) => SlotState::ManuallyClosed,
            (_, false) => SlotState::Available,
        }
    }

    pub fn control(&self) -> SlotControl {
        match self {
            SlotState::Reserved { .. } => SlotControl::Cancel,
            SlotState::ManuallyClosed => SlotControl::Open,
            SlotState::Available => SlotControl::Close,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotControl {
    Cancel,
    Open,
    Close,
}

/// Hides most of a guest's mailbox name: `jane.doe@mail.com` becomes
/// `jan***@mail.com`.
pub fn mask_email(email: Option<&str>) -> String {
    match email {
        Some(email) => match email.split_once('@') {
            Some((user, domain)) => {
                let prefix: String = user.chars().take(3).collect();
                format!("{prefix}***@{domain}")
            }
            None if !email.is_empty() => email.to_string(),
            None => "reserved".to_string(),
        },
        None => "reserved".to_string(),
    }
}

/// Today's and tomorrow's date in Korea Standard Time.
pub fn local_dates(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let today = (now.naive_utc() + TimeDelta::hours(KST_OFFSET_HOURS)).date();
    (today, today.succ_opt().unwrap_or(today))
}
