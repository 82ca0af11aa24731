//! Meal container ("vianda") model.
//!
//! A container is identified by the scan code printed on it, belongs to the
//! collaborator who prepared it and sits in exactly one fridge at a time.
//! Status changes are decided by the lifecycle service; this module only
//! holds validated values and the transition table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length accepted for a container scan code.
pub const CONTAINER_CODE_MAX: usize = 64;

/// Codes that collide with fixed `/containers/...` routes and could never be
/// looked up by code.
pub const RESERVED_CONTAINER_CODES: [&str; 2] = ["search", "counters"];

/// Validation errors raised while building container values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerValidationError {
    #[error("container code must not be empty")]
    EmptyCode,
    #[error("container code must not contain surrounding whitespace")]
    CodeContainsWhitespace,
    #[error("container code must be at most {max} characters")]
    CodeTooLong { max: usize },
    #[error("container code `{value}` is reserved")]
    ReservedCode { value: String },
    #[error("collaborator id must be positive, got {value}")]
    InvalidCollaboratorId { value: i64 },
    #[error("fridge id must be positive, got {value}")]
    InvalidFridgeId { value: i64 },
    #[error("month must be between 1 and 12, got {month}")]
    InvalidMonth { month: u32 },
    #[error("year {year} is out of range")]
    InvalidYear { year: i32 },
    #[error("unknown container status `{value}`")]
    UnknownStatus { value: String },
}

/// Unique scan code of a container.
///
/// # Examples
/// ```
/// use viandas::domain::ContainerCode;
///
/// let code = ContainerCode::new("QR1").expect("valid code");
/// assert_eq!(code.as_str(), "QR1");
/// assert!(ContainerCode::new(" QR1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerCode(String);

impl ContainerCode {
    /// Validate and construct a scan code.
    pub fn new(value: impl Into<String>) -> Result<Self, ContainerValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(ContainerValidationError::EmptyCode);
        }
        if raw.trim() != raw {
            return Err(ContainerValidationError::CodeContainsWhitespace);
        }
        if raw.chars().count() > CONTAINER_CODE_MAX {
            return Err(ContainerValidationError::CodeTooLong {
                max: CONTAINER_CODE_MAX,
            });
        }
        if RESERVED_CONTAINER_CODES.contains(&raw.as_str()) {
            return Err(ContainerValidationError::ReservedCode { value: raw });
        }
        Ok(Self(raw))
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ContainerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ContainerCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for ContainerCode {
    type Error = ContainerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContainerCode> for String {
    fn from(value: ContainerCode) -> Self {
        value.0
    }
}

/// Identifier of the collaborator who prepared a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CollaboratorId(i64);

impl CollaboratorId {
    /// Validate and construct a collaborator identifier.
    pub fn new(value: i64) -> Result<Self, ContainerValidationError> {
        if value <= 0 {
            return Err(ContainerValidationError::InvalidCollaboratorId { value });
        }
        Ok(Self(value))
    }

    /// Raw identifier value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CollaboratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for CollaboratorId {
    type Error = ContainerValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CollaboratorId> for i64 {
    fn from(value: CollaboratorId) -> Self {
        value.0
    }
}

/// Identifier of the fridge currently holding a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct FridgeId(i64);

impl FridgeId {
    /// Validate and construct a fridge identifier.
    pub fn new(value: i64) -> Result<Self, ContainerValidationError> {
        if value <= 0 {
            return Err(ContainerValidationError::InvalidFridgeId { value });
        }
        Ok(Self(value))
    }

    /// Raw identifier value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for FridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for FridgeId {
    type Error = ContainerValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FridgeId> for i64 {
    fn from(value: FridgeId) -> Self {
        value.0
    }
}

/// Lifecycle status of a container.
///
/// `Prepared` is initial and `Expired` is terminal. The only forward edges are
/// `Prepared -> InTransit`, `Prepared -> Expired` and `InTransit -> Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Prepared,
    InTransit,
    Expired,
}

impl ContainerStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Prepared, Self::InTransit, Self::Expired];

    /// Stable lowercase identifier used in storage and JSON payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prepared => "prepared",
            Self::InTransit => "in_transit",
            Self::Expired => "expired",
        }
    }

    /// Whether no further transition may leave this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Whether the state machine has an edge from `self` to `next`.
    ///
    /// # Examples
    /// ```
    /// use viandas::domain::ContainerStatus;
    ///
    /// assert!(ContainerStatus::Prepared.permits(ContainerStatus::InTransit));
    /// assert!(!ContainerStatus::InTransit.permits(ContainerStatus::Prepared));
    /// assert!(!ContainerStatus::Expired.permits(ContainerStatus::InTransit));
    /// ```
    pub fn permits(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Prepared, Self::InTransit)
                | (Self::Prepared, Self::Expired)
                | (Self::InTransit, Self::Expired)
        )
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerStatus {
    type Err = ContainerValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ContainerValidationError::UnknownStatus {
                value: value.to_owned(),
            })
    }
}

/// Calendar month used to select containers by preparation date.
///
/// The period covers `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparationPeriod {
    month: u32,
    year: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl PreparationPeriod {
    /// Validate and construct the period for `month`/`year`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use viandas::domain::PreparationPeriod;
    ///
    /// let period = PreparationPeriod::new(12, 2024).expect("valid period");
    /// assert!(period.contains(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()));
    /// assert!(!period.contains(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
    /// ```
    pub fn new(month: u32, year: i32) -> Result<Self, ContainerValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ContainerValidationError::InvalidMonth { month });
        }
        let (next_year, next_month) = if month == 12 {
            (year.checked_add(1), 1)
        } else {
            (Some(year), month + 1)
        };
        let start = month_start(year, month).ok_or(ContainerValidationError::InvalidYear { year })?;
        let end = next_year
            .and_then(|next_year| month_start(next_year, next_month))
            .ok_or(ContainerValidationError::InvalidYear { year })?;
        Ok(Self {
            month,
            year,
            start,
            end,
        })
    }

    /// Calendar month, `1..=12`.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `instant` falls inside the period.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Unvalidated registration input.
///
/// Any status supplied by a client is ignored: registration always starts a
/// container in [`ContainerStatus::Prepared`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDraft {
    pub code: String,
    pub collaborator_id: i64,
    pub fridge_id: i64,
    pub prepared_at: Option<DateTime<Utc>>,
}

/// A registered meal container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    code: ContainerCode,
    collaborator_id: CollaboratorId,
    fridge_id: FridgeId,
    status: ContainerStatus,
    prepared_at: DateTime<Utc>,
}

impl Container {
    /// Validate a draft and build a freshly prepared container.
    ///
    /// `now` is used when the draft carries no preparation timestamp.
    pub fn prepare(
        draft: ContainerDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ContainerValidationError> {
        let ContainerDraft {
            code,
            collaborator_id,
            fridge_id,
            prepared_at,
        } = draft;
        Ok(Self {
            code: ContainerCode::new(code)?,
            collaborator_id: CollaboratorId::new(collaborator_id)?,
            fridge_id: FridgeId::new(fridge_id)?,
            status: ContainerStatus::Prepared,
            prepared_at: prepared_at.unwrap_or(now),
        })
    }

    /// Rebuild a container from already validated parts, as read back from a
    /// store.
    pub fn restore(
        code: ContainerCode,
        collaborator_id: CollaboratorId,
        fridge_id: FridgeId,
        status: ContainerStatus,
        prepared_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            collaborator_id,
            fridge_id,
            status,
            prepared_at,
        }
    }

    pub fn code(&self) -> &ContainerCode {
        &self.code
    }

    pub fn collaborator_id(&self) -> CollaboratorId {
        self.collaborator_id
    }

    pub fn fridge_id(&self) -> FridgeId {
        self.fridge_id
    }

    pub fn status(&self) -> ContainerStatus {
        self.status
    }

    pub fn prepared_at(&self) -> DateTime<Utc> {
        self.prepared_at
    }

    pub(crate) fn with_status(mut self, status: ContainerStatus) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn with_fridge(mut self, fridge_id: FridgeId) -> Self {
        self.fridge_id = fridge_id;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Validation and transition table coverage.

    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn draft() -> ContainerDraft {
        ContainerDraft {
            code: "QR1".to_owned(),
            collaborator_id: 7,
            fridge_id: 3,
            prepared_at: None,
        }
    }

    #[rstest]
    #[case("", ContainerValidationError::EmptyCode)]
    #[case("   ", ContainerValidationError::EmptyCode)]
    #[case(" QR1", ContainerValidationError::CodeContainsWhitespace)]
    #[case("QR1\n", ContainerValidationError::CodeContainsWhitespace)]
    fn rejects_malformed_codes(#[case] raw: &str, #[case] expected: ContainerValidationError) {
        assert_eq!(ContainerCode::new(raw), Err(expected));
    }

    #[rstest]
    #[case("search")]
    #[case("counters")]
    fn rejects_codes_shadowed_by_fixed_routes(#[case] raw: &str) {
        assert_eq!(
            ContainerCode::new(raw),
            Err(ContainerValidationError::ReservedCode {
                value: raw.to_owned()
            })
        );
    }

    #[test]
    fn rejects_overlong_codes() {
        let raw = "q".repeat(CONTAINER_CODE_MAX + 1);
        assert_eq!(
            ContainerCode::new(raw),
            Err(ContainerValidationError::CodeTooLong {
                max: CONTAINER_CODE_MAX
            })
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    fn rejects_non_positive_identifiers(#[case] value: i64) {
        assert!(CollaboratorId::new(value).is_err());
        assert!(FridgeId::new(value).is_err());
    }

    #[rstest]
    #[case(ContainerStatus::Prepared, ContainerStatus::InTransit, true)]
    #[case(ContainerStatus::Prepared, ContainerStatus::Expired, true)]
    #[case(ContainerStatus::InTransit, ContainerStatus::Expired, true)]
    #[case(ContainerStatus::InTransit, ContainerStatus::Prepared, false)]
    #[case(ContainerStatus::Expired, ContainerStatus::Prepared, false)]
    #[case(ContainerStatus::Expired, ContainerStatus::InTransit, false)]
    #[case(ContainerStatus::Prepared, ContainerStatus::Prepared, false)]
    fn transition_table_matches_lifecycle(
        #[case] from: ContainerStatus,
        #[case] to: ContainerStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.permits(to), allowed);
    }

    #[rstest]
    #[case("prepared", ContainerStatus::Prepared)]
    #[case("IN_TRANSIT", ContainerStatus::InTransit)]
    #[case(" expired ", ContainerStatus::Expired)]
    fn parses_status_names(#[case] raw: &str, #[case] expected: ContainerStatus) {
        assert_eq!(raw.parse::<ContainerStatus>(), Ok(expected));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let error = "spoiled".parse::<ContainerStatus>().expect_err("unknown status");
        assert!(error.to_string().contains("spoiled"));
    }

    #[test]
    fn prepare_forces_prepared_status_and_defaults_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let container = Container::prepare(draft(), now).expect("valid draft");

        assert_eq!(container.status(), ContainerStatus::Prepared);
        assert_eq!(container.prepared_at(), now);
        assert_eq!(container.code().as_str(), "QR1");
    }

    #[test]
    fn prepare_keeps_supplied_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let supplied = Utc.with_ymd_and_hms(2024, 4, 1, 8, 30, 0).unwrap();
        let container = Container::prepare(
            ContainerDraft {
                prepared_at: Some(supplied),
                ..draft()
            },
            now,
        )
        .expect("valid draft");

        assert_eq!(container.prepared_at(), supplied);
    }

    #[test]
    fn prepare_rejects_missing_fridge() {
        let error = Container::prepare(
            ContainerDraft {
                fridge_id: 0,
                ..draft()
            },
            Utc::now(),
        )
        .expect_err("fridge is required");
        assert_eq!(error, ContainerValidationError::InvalidFridgeId { value: 0 });
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    fn period_rejects_out_of_range_months(#[case] month: u32) {
        assert_eq!(
            PreparationPeriod::new(month, 2024),
            Err(ContainerValidationError::InvalidMonth { month })
        );
    }

    #[test]
    fn december_period_rolls_into_next_year() {
        let period = PreparationPeriod::new(12, 2024).expect("valid period");
        assert_eq!(
            period.end(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn period_bounds_are_half_open() {
        let period = PreparationPeriod::new(2, 2024).expect("valid period");
        assert!(period.contains(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert!(period.contains(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn period_rejects_unrepresentable_years() {
        assert!(PreparationPeriod::new(12, i32::MAX).is_err());
    }
}
