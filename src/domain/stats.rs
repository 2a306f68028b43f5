//! Daily figures for the admin dashboard.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::reservation::{Reservation, ReservationStatus};

/// How many services the dashboard ranks.
pub const TOP_SERVICES: usize = 3;

/// Booking count of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ServiceCount {
    /// Service display name.
    pub name: String,
    /// Reservations of the service.
    pub count: u32,
}

/// Aggregates over the reservations of one date.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    /// Day the figures refer to.
    #[schema(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
    /// All reservations of the day, whatever their status.
    pub total_reservations: u32,
    /// Completed reservations.
    pub completed: u32,
    /// Cancelled reservations.
    pub cancelled: u32,
    /// No-shows.
    pub no_shows: u32,
    /// Revenue from completed reservations.
    pub revenue: u64,
    /// Mean rating of rated completed reservations.
    pub average_rating: Option<f64>,
    /// Distinct customers with a reservation that day.
    pub unique_customers: u32,
    /// Most booked services, most frequent first.
    pub top_services: Vec<ServiceCount>,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl DashboardStats {
    /// Computes the figures for `date` from `reservations`.
    ///
    /// Reservations of other dates are ignored.
    #[must_use]
    pub fn compute(date: NaiveDate, reservations: &[Reservation]) -> Self {
        let day: Vec<&Reservation> = reservations.iter().filter(|r| r.date == date).collect();
        let with_status =
            |status: ReservationStatus| count(day.iter().filter(|r| r.status == status).count());

        let completed: Vec<&&Reservation> = day
            .iter()
            .filter(|r| r.status == ReservationStatus::Completed)
            .collect();
        let revenue = completed
            .iter()
            .fold(0_u64, |acc, r| acc.saturating_add(r.total_price));
        let ratings: Vec<u8> = completed.iter().filter_map(|r| r.rating).collect();
        let average_rating = if ratings.is_empty() {
            None
        } else {
            let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
            Some(f64::from(sum) / f64::from(count(ratings.len())))
        };

        let unique_customers = day
            .iter()
            .map(|r| &r.customer_id)
            .collect::<BTreeSet<_>>()
            .len();

        let mut by_service: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &day {
            *by_service.entry(r.service_name.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(&str, usize)> = by_service.into_iter().collect();
        // stable sort keeps ties in name order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let top_services = ranked
            .into_iter()
            .take(TOP_SERVICES)
            .map(|(name, n)| ServiceCount {
                name: name.to_string(),
                count: count(n),
            })
            .collect();

        Self {
            date,
            total_reservations: count(day.len()),
            completed: count(completed.len()),
            cancelled: with_status(ReservationStatus::Cancelled),
            no_shows: with_status(ReservationStatus::NoShow),
            revenue,
            average_rating,
            unique_customers: count(unique_customers),
            top_services,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::CustomerId;
    use crate::domain::reservation::tests::sample_reservation;
    use chrono::NaiveTime;

    #[test]
    fn aggregates_one_day() {
        let (Some(date), Some(other), Some(t)) = (
            NaiveDate::from_ymd_opt(2026, 10, 20),
            NaiveDate::from_ymd_opt(2026, 10, 21),
            NaiveTime::from_hms_opt(9, 0, 0),
        ) else {
            panic!("valid date/time");
        };
        let mut a = sample_reservation(date, t, ReservationStatus::Completed);
        a.rating = Some(5);
        let mut b = sample_reservation(date, t, ReservationStatus::Completed);
        b.rating = Some(4);
        b.customer_id = CustomerId::from("cust-2");
        b.service_name = "Taille de Barbe Premium".to_string();
        b.total_price = 9_400;
        let c = sample_reservation(date, t, ReservationStatus::Cancelled);
        let d = sample_reservation(date, t, ReservationStatus::NoShow);
        let elsewhere = sample_reservation(other, t, ReservationStatus::Completed);

        let stats = DashboardStats::compute(date, &[a, b, c, d, elsewhere]);
        assert_eq!(stats.total_reservations, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.no_shows, 1);
        assert_eq!(stats.revenue, 10_640 + 9_400);
        assert_eq!(stats.average_rating, Some(4.5));
        assert_eq!(stats.unique_customers, 2);
        let Some(top) = stats.top_services.first() else {
            panic!("at least one service");
        };
        assert_eq!(top.name, "Coupe Classique Homme");
        assert_eq!(top.count, 3);
    }

    #[test]
    fn empty_day_has_no_rating() {
        let Some(date) = NaiveDate::from_ymd_opt(2026, 10, 20) else {
            panic!("valid date");
        };
        let stats = DashboardStats::compute(date, &[]);
        assert_eq!(stats.revenue, 0);
        assert_eq!(stats.average_rating, None);
        assert!(stats.top_services.is_empty());
    }
}
