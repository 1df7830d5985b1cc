use crate::CoreError;
use crate::domain::{
    Booking, BookingStatus, Branch, Complaint, ComplaintStatus, Hotel, Room, RoomStatus, User, UserRole,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hotel-wide figures for the director dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_branches: usize,
    pub total_rooms: usize,
    pub booked_rooms: usize,
    pub available_rooms: usize,
    pub total_clients: usize,
    pub active_clients: usize,
    pub check_ins_today: usize,
    pub check_outs_today: usize,
    pub daily_revenue: f64,
    pub monthly_revenue: f64,
    pub total_staff: usize,
    pub active_admins: usize,
}

impl GlobalStats {
    pub fn compute(
        branch_count: usize,
        rooms: &[Room],
        bookings: &[Booking],
        users: &[User],
        today: NaiveDate,
    ) -> Self {
        let today_str = today.format("%Y-%m-%d").to_string();
        let booked_rooms = count_occupied(rooms);
        let with_role = |role: UserRole| users.iter().filter(move |u| u.role == role);

        Self {
            total_branches: branch_count,
            total_rooms: rooms.len(),
            booked_rooms,
            available_rooms: rooms.len() - booked_rooms,
            total_clients: with_role(UserRole::Client).count(),
            active_clients: with_role(UserRole::Client).filter(|u| u.is_active()).count(),
            check_ins_today: bookings
                .iter()
                .filter(|b| b.check_in == today_str && b.status == BookingStatus::CheckedIn)
                .count(),
            check_outs_today: bookings
                .iter()
                .filter(|b| b.check_out == today_str && b.status == BookingStatus::CheckedOut)
                .count(),
            daily_revenue: revenue_checked_in_on(bookings, &today_str),
            monthly_revenue: bookings
                .iter()
                .filter(|b| {
                    parse_date(&b.check_in)
                        .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
                })
                .map(|b| b.total_price)
                .sum(),
            total_staff: with_role(UserRole::Admin).count(),
            active_admins: with_role(UserRole::Admin).filter(|u| u.is_active()).count(),
        }
    }
}

/// Figures for one branch's admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStats {
    pub total_rooms: usize,
    pub occupied_rooms: usize,
    pub available_rooms: usize,
    /// Whole percent, 0 when the branch has no rooms.
    pub occupancy: u32,
    pub today_revenue: f64,
    pub total_bookings: usize,
    pub active_bookings: usize,
    pub total_complaints: usize,
    pub pending_complaints: usize,
}

impl BranchStats {
    pub fn compute(
        rooms: &[Room],
        bookings: &[Booking],
        complaints: &[Complaint],
        today: NaiveDate,
    ) -> Self {
        let today_str = today.format("%Y-%m-%d").to_string();
        let occupied_rooms = count_occupied(rooms);

        Self {
            total_rooms: rooms.len(),
            occupied_rooms,
            available_rooms: rooms.len() - occupied_rooms,
            occupancy: occupancy_percent(occupied_rooms, rooms.len()),
            today_revenue: revenue_checked_in_on(bookings, &today_str),
            total_bookings: bookings.len(),
            active_bookings: bookings.iter().filter(|b| b.status.is_active()).count(),
            total_complaints: complaints.len(),
            pending_complaints: complaints
                .iter()
                .filter(|c| c.status == ComplaintStatus::Pending)
                .count(),
        }
    }
}

fn count_occupied(rooms: &[Room]) -> usize {
    rooms
        .iter()
        .filter(|r| r.status == RoomStatus::Occupied)
        .count()
}

fn revenue_checked_in_on(bookings: &[Booking], day: &str) -> f64 {
    bookings
        .iter()
        .filter(|b| b.check_in == day)
        .map(|b| b.total_price)
        .sum()
}

/// `occupied / total * 100`, rounded half up.
pub fn occupancy_percent(occupied: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((occupied * 200 + total) / (total * 2)) as u32
}

// Booking dates are YYYY-MM-DD, but older records carry full timestamps.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Read-only reductions over the live collections. Nothing is cached here.
#[derive(Clone)]
pub struct Dashboard {
    hotel: Hotel,
}

#[derive(Debug, Clone)]
pub struct GlobalOverview {
    pub stats: GlobalStats,
    pub branches: Vec<Branch>,
    pub users: Vec<User>,
}

impl Dashboard {
    pub fn new(hotel: Hotel) -> Self {
        Self { hotel }
    }

    pub async fn global_stats(&self) -> Result<GlobalStats, CoreError> {
        self.global_stats_on(Utc::now().date_naive()).await
    }

    pub async fn global_stats_on(&self, today: NaiveDate) -> Result<GlobalStats, CoreError> {
        Ok(self.global_overview_on(today).await?.stats)
    }

    /// Global stats together with the branch and user lists they were
    /// computed from, for callers that need both.
    pub async fn global_overview_on(&self, today: NaiveDate) -> Result<GlobalOverview, CoreError> {
        let branches = self.hotel.branches();
        let rooms = self.hotel.rooms();
        let bookings = self.hotel.bookings();
        let users = self.hotel.users();

        let (branches, rooms, bookings, users) = tokio::try_join!(
            branches.get_all(),
            rooms.get_all(),
            bookings.get_all(),
            users.get_all(),
        )?;
        debug!(
            "global stats over {} branches, {} rooms, {} bookings, {} users",
            branches.len(),
            rooms.len(),
            bookings.len(),
            users.len()
        );
        let stats = GlobalStats::compute(branches.len(), &rooms, &bookings, &users, today);
        Ok(GlobalOverview {
            stats,
            branches,
            users,
        })
    }

    pub async fn branch_stats(&self, branch_id: &str) -> Result<BranchStats, CoreError> {
        self.branch_stats_on(branch_id, Utc::now().date_naive()).await
    }

    pub async fn branch_stats_on(
        &self,
        branch_id: &str,
        today: NaiveDate,
    ) -> Result<BranchStats, CoreError> {
        let rooms = self.hotel.rooms();
        let bookings = self.hotel.bookings();
        let complaints = self.hotel.complaints();

        let (rooms, bookings, complaints) = tokio::try_join!(
            rooms.by_branch(branch_id),
            bookings.by_branch(branch_id),
            complaints.by_branch(branch_id),
        )?;
        debug!("branch stats for {}: {} rooms", branch_id, rooms.len());
        Ok(BranchStats::compute(&rooms, &bookings, &complaints, today))
    }
}
