use crate::CoreError;
use crate::dashboard::{Dashboard, GlobalStats};
use crate::domain::{Booking, Branch, Complaint, Hotel, Room, User, UserRole};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Who is looking: the explicit replacement for an ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub branch_id: Option<String>,
}

/// The director's headline figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineStats {
    pub total_branches: usize,
    pub total_rooms: usize,
    pub total_clients: usize,
    pub total_staff: usize,
    pub monthly_revenue: f64,
    pub daily_revenue: f64,
}

impl From<&GlobalStats> for HeadlineStats {
    fn from(stats: &GlobalStats) -> Self {
        Self {
            total_branches: stats.total_branches,
            total_rooms: stats.total_rooms,
            total_clients: stats.total_clients,
            total_staff: stats.total_staff,
            monthly_revenue: stats.monthly_revenue,
            daily_revenue: stats.daily_revenue,
        }
    }
}

/// Everything a role view may draw from. Lists may already be scoped.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub stats: HeadlineStats,
    pub branches: Vec<Branch>,
    pub rooms: Vec<Room>,
    pub bookings: Vec<Booking>,
    pub complaints: Vec<Complaint>,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleView {
    Director {
        stats: HeadlineStats,
        branches: Vec<Branch>,
        staff: Vec<User>,
    },
    Admin {
        rooms: Vec<Room>,
        bookings: Vec<Booking>,
        complaints: Vec<Complaint>,
        branch: Option<Branch>,
    },
    Client {
        booking: Option<Booking>,
        room: Option<Room>,
    },
}

/// Pick the slice of `snapshot` the viewer's role is allowed to see.
pub fn select_view(viewer: &Viewer, snapshot: &Snapshot) -> RoleView {
    match viewer.role {
        UserRole::Director => RoleView::Director {
            stats: snapshot.stats.clone(),
            branches: snapshot.branches.clone(),
            staff: snapshot
                .users
                .iter()
                .filter(|u| u.role != UserRole::Client)
                .cloned()
                .collect(),
        },
        UserRole::Admin => {
            let Some(branch_id) = viewer.branch_id.as_deref() else {
                return RoleView::Admin {
                    rooms: Vec::new(),
                    bookings: Vec::new(),
                    complaints: Vec::new(),
                    branch: None,
                };
            };
            RoleView::Admin {
                rooms: in_branch(&snapshot.rooms, |r| r.branch_id.as_str(), branch_id),
                bookings: in_branch(&snapshot.bookings, |b| b.branch_id.as_str(), branch_id),
                complaints: in_branch(&snapshot.complaints, |c| c.branch_id.as_str(), branch_id),
                branch: snapshot.branches.iter().find(|b| b.id == branch_id).cloned(),
            }
        }
        UserRole::Client => {
            let booking = snapshot.bookings.iter().find(|b| b.email == viewer.email);
            let room = booking.and_then(|booking| {
                snapshot.rooms.iter().find(|r| {
                    r.room_number == booking.room_number && r.branch_id == booking.branch_id
                })
            });
            RoleView::Client {
                booking: booking.cloned(),
                room: room.cloned(),
            }
        }
    }
}

fn in_branch<T: Clone>(items: &[T], branch_of: impl Fn(&T) -> &str, branch_id: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| branch_of(*item) == branch_id)
        .cloned()
        .collect()
}

/// Load only what the viewer's role needs from the live store, then select.
pub async fn load_view(hotel: &Hotel, viewer: &Viewer, today: NaiveDate) -> Result<RoleView, CoreError> {
    debug!("loading {} view for {}", viewer.role, viewer.email);
    let mut snapshot = Snapshot {
        stats: HeadlineStats::default(),
        branches: Vec::new(),
        rooms: Vec::new(),
        bookings: Vec::new(),
        complaints: Vec::new(),
        users: Vec::new(),
    };

    match viewer.role {
        UserRole::Director => {
            let overview = Dashboard::new(hotel.clone()).global_overview_on(today).await?;
            snapshot.stats = HeadlineStats::from(&overview.stats);
            snapshot.branches = overview.branches;
            snapshot.users = overview.users;
        }
        UserRole::Admin => {
            if let Some(branch_id) = viewer.branch_id.as_deref() {
                let branches = hotel.branches();
                let rooms = hotel.rooms();
                let bookings = hotel.bookings();
                let complaints = hotel.complaints();
                let (branch, rooms, bookings, complaints) = tokio::try_join!(
                    branches.get_by_id(branch_id),
                    rooms.by_branch(branch_id),
                    bookings.by_branch(branch_id),
                    complaints.by_branch(branch_id),
                )?;
                snapshot.branches = branch.into_iter().collect();
                snapshot.rooms = rooms;
                snapshot.bookings = bookings;
                snapshot.complaints = complaints;
            }
        }
        UserRole::Client => {
            snapshot.bookings = hotel.bookings().by_email(&viewer.email).await?;
            if let Some(booking) = snapshot.bookings.first() {
                snapshot.rooms = hotel.rooms().by_branch(&booking.branch_id).await?;
            }
        }
    }

    Ok(select_view(viewer, &snapshot))
}
