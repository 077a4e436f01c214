//! Visitor tracking service.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use sea_orm::Set;
use serde::Serialize;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::entities::ip;
use yatube_db::repositories::IpRepository;

/// Visitor counters shown on every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisitStats {
    /// Every visitor record ever stored.
    #[serde(rename = "all")]
    pub total: u64,
    /// Records created during the current day of the site time zone.
    pub today: u64,
}

/// Service recording visitor addresses and post views.
#[derive(Clone)]
pub struct VisitService {
    ip_repo: IpRepository,
    time_zone: Tz,
    id_gen: IdGenerator,
}

impl VisitService {
    /// Create a new visit service.
    #[must_use]
    pub const fn new(ip_repo: IpRepository, time_zone: Tz) -> Self {
        Self {
            ip_repo,
            time_zone,
            id_gen: IdGenerator::new(),
        }
    }

    /// Remember the address if it is new, then report the counters.
    ///
    /// A failed insert is logged and otherwise ignored.
    pub async fn record(&self, address: &str) -> AppResult<VisitStats> {
        if self.ip_repo.find_by_address(address).await?.is_none()
            && let Err(e) = self.ip_repo.create(self.new_record(address)).await
        {
            tracing::warn!(error = %e, address = %address, "Failed to store visitor address");
        }

        self.stats().await
    }

    /// Current visitor counters.
    pub async fn stats(&self) -> AppResult<VisitStats> {
        let total = self.ip_repo.count_all().await?;

        let (start, end) = day_bounds(self.time_zone, Utc::now())
            .ok_or_else(|| AppError::Internal("cannot resolve the current day".to_string()))?;
        let today = self
            .ip_repo
            .count_between(start.into(), end.into())
            .await?;

        Ok(VisitStats { total, today })
    }

    /// Count a view of `post_id` from `address`. Repeat views are ignored.
    pub async fn record_view(&self, post_id: &str, address: &str) -> AppResult<()> {
        let visitor = match self.ip_repo.find_by_address(address).await? {
            Some(visitor) => visitor,
            None => self.ip_repo.create(self.new_record(address)).await?,
        };

        self.ip_repo.add_view(post_id, &visitor.id).await
    }

    fn new_record(&self, address: &str) -> ip::ActiveModel {
        ip::ActiveModel {
            id: Set(self.id_gen.generate()),
            address: Set(address.to_string()),
            created_at: Set(Utc::now().into()),
        }
    }
}

/// UTC bounds `[start, end)` of the calendar day containing `now` in `tz`.
#[must_use]
pub fn day_bounds(tz: Tz, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today.succ_opt()?;

    let start = tz
        .from_local_datetime(&today.and_time(NaiveTime::MIN))
        .earliest()?;
    let end = tz
        .from_local_datetime(&tomorrow.and_time(NaiveTime::MIN))
        .earliest()?;

    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_day_bounds_follow_site_time_zone() {
        // 22:30 UTC is already the next day in Moscow (UTC+3).
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 22, 30, 0).unwrap();
        let (start, end) = day_bounds(chrono_tz::Europe::Moscow, now).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 10, 21, 0, 0).unwrap());
        assert_eq!(end - start, Duration::hours(24));
        assert!(start <= now && now < end);
    }

    #[test]
    fn test_day_bounds_utc() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let (start, end) = day_bounds(chrono_tz::UTC, now).unwrap();

        assert_eq!(start, now);
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_visit_stats_serialize_as_all_and_today() {
        let stats = VisitStats { total: 5, today: 2 };
        let json = serde_json::to_value(stats).unwrap();

        assert_eq!(json, serde_json::json!({"all": 5, "today": 2}));
    }
}
