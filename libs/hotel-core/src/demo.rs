//! Bundled sample data for demo mode, and a seeder that writes it to a store.

use crate::CoreError;
use crate::domain::{
    Booking, BookingStatus, Branch, Complaint, ComplaintStatus, Hotel, NewBooking, NewBranch,
    NewComplaint, NewRoom, NewUser, Room, RoomStatus, User, UserRole, UserStatus,
};
use crate::views::{HeadlineStats, RoleView, Snapshot, Viewer, select_view};
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use tracing::info;

// 2024-08-01T00:00:00Z
const SAMPLE_EPOCH_SECONDS: i64 = 1_722_470_400;

/// Sign-in password shared by the bundled accounts.
pub const DEMO_PASSWORD: &str = "password123";

fn sample_time() -> DateTime<Utc> {
    DateTime::from_timestamp(SAMPLE_EPOCH_SECONDS, 0).unwrap_or_default()
}

pub fn headline_stats() -> HeadlineStats {
    HeadlineStats {
        total_branches: 5,
        total_rooms: 150,
        total_clients: 450,
        total_staff: 45,
        monthly_revenue: 850_000.0,
        daily_revenue: 45_000.0,
    }
}

fn branch_drafts() -> Vec<(String, NewBranch)> {
    [
        ("Downtown Branch", "Downtown", 45, 85, 12_000.0, "admin@hotel.com"),
        ("Airport Branch", "Airport", 38, 92, 15_000.0, "admin2@hotel.com"),
        ("Beach Resort", "Beachfront", 32, 78, 18_000.0, "admin3@hotel.com"),
        ("City Center", "City Center", 25, 88, 10_000.0, "admin4@hotel.com"),
        ("Business District", "Business District", 10, 95, 8_000.0, "admin5@hotel.com"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (name, location, rooms, occupancy, revenue, admin_id))| {
        (
            format!("branch-{}", i + 1),
            NewBranch {
                name: name.into(),
                location: location.into(),
                rooms,
                occupancy,
                revenue,
                admin_id: admin_id.into(),
            },
        )
    })
    .collect()
}

fn room_drafts() -> Vec<(String, NewRoom)> {
    [
        (101, RoomStatus::Occupied, Some(("John Smith", "2024-08-05")), "Deluxe Suite", 250.0),
        (102, RoomStatus::Available, None, "Standard Room", 120.0),
        (103, RoomStatus::Cleaning, None, "Standard Room", 120.0),
        (104, RoomStatus::Occupied, Some(("Sarah Wilson", "2024-08-04")), "Standard Room", 120.0),
        (105, RoomStatus::Available, None, "Deluxe Suite", 250.0),
        (106, RoomStatus::Occupied, Some(("Mike Johnson", "2024-08-06")), "Family Room", 180.0),
    ]
    .into_iter()
    .map(|(number, status, stay, room_type, price)| {
        (
            format!("room-{number}"),
            NewRoom {
                room_number: number,
                status,
                guest: stay.map(|(guest, _)| guest.to_string()),
                check_out: stay.map(|(_, date)| date.to_string()),
                branch_id: "branch-1".into(),
                room_type: room_type.into(),
                price,
            },
        )
    })
    .collect()
}

fn booking_drafts() -> Vec<(String, NewBooking)> {
    vec![
        (
            "booking-1".into(),
            NewBooking {
                guest_name: "John Smith".into(),
                email: "client@hotel.com".into(),
                room_number: 101,
                room_type: "Deluxe Suite".into(),
                check_in: "2024-08-02".into(),
                check_out: "2024-08-05".into(),
                branch_id: "branch-1".into(),
                status: BookingStatus::CheckedIn,
                total_price: 750.0,
            },
        ),
        (
            "booking-2".into(),
            NewBooking {
                guest_name: "Sarah Wilson".into(),
                email: "sarah@example.com".into(),
                room_number: 104,
                room_type: "Standard Room".into(),
                check_in: "2024-08-01".into(),
                check_out: "2024-08-04".into(),
                branch_id: "branch-1".into(),
                // due out; still in the room
                status: BookingStatus::CheckedIn,
                total_price: 360.0,
            },
        ),
    ]
}

fn complaint_drafts() -> Vec<(String, NewComplaint)> {
    [
        ("John Smith", 101, "Air conditioning not working", ComplaintStatus::Pending, "2 hours ago"),
        ("Sarah Wilson", 104, "Noisy neighbors", ComplaintStatus::Resolved, "1 day ago"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (client, room, issue, status, time))| {
        (
            format!("complaint-{}", i + 1),
            NewComplaint {
                client: client.into(),
                room,
                issue: issue.into(),
                status,
                time: time.into(),
                branch_id: "branch-1".into(),
            },
        )
    })
    .collect()
}

fn user_drafts() -> Vec<(String, NewUser)> {
    [
        ("Director Admin", UserRole::Director, "director@hotel.com", None, "2024-08-03"),
        ("Branch Manager", UserRole::Admin, "admin@hotel.com", Some("branch-1"), "2024-08-03"),
        ("John Smith", UserRole::Client, "client@hotel.com", Some("branch-1"), "2024-08-02"),
    ]
    .into_iter()
    .map(|(name, role, email, branch_id, last_login)| {
        (
            email.to_string(),
            NewUser {
                name: name.into(),
                role,
                email: email.into(),
                branch_id: branch_id.map(String::from),
                status: UserStatus::Active,
                last_login: last_login.into(),
            },
        )
    })
    .collect()
}

/// Ids of the bundled user accounts.
pub fn account_ids() -> Vec<String> {
    user_drafts().into_iter().map(|(id, _)| id).collect()
}

/// The bundled data as typed records, with the fixed headline stats.
pub fn snapshot() -> Snapshot {
    let at = sample_time();
    Snapshot {
        stats: headline_stats(),
        branches: branch_drafts()
            .into_iter()
            .map(|(id, d)| Branch {
                id,
                name: d.name,
                location: d.location,
                rooms: d.rooms,
                occupancy: d.occupancy,
                revenue: d.revenue,
                admin_id: d.admin_id,
                created_at: at,
                updated_at: at,
            })
            .collect(),
        rooms: room_drafts()
            .into_iter()
            .map(|(id, d)| Room {
                id,
                room_number: d.room_number,
                status: d.status,
                guest: d.guest,
                check_out: d.check_out,
                branch_id: d.branch_id,
                room_type: d.room_type,
                price: d.price,
                created_at: at,
                updated_at: at,
            })
            .collect(),
        bookings: booking_drafts()
            .into_iter()
            .map(|(id, d)| Booking {
                id,
                guest_name: d.guest_name,
                email: d.email,
                room_number: d.room_number,
                room_type: d.room_type,
                check_in: d.check_in,
                check_out: d.check_out,
                branch_id: d.branch_id,
                status: d.status,
                total_price: d.total_price,
                created_at: at,
                updated_at: at,
            })
            .collect(),
        complaints: complaint_drafts()
            .into_iter()
            .map(|(id, d)| Complaint {
                id,
                client: d.client,
                room: d.room,
                issue: d.issue,
                status: d.status,
                time: d.time,
                branch_id: d.branch_id,
                created_at: at,
                updated_at: at,
            })
            .collect(),
        users: user_drafts()
            .into_iter()
            .map(|(id, d)| User {
                id,
                name: d.name,
                role: d.role,
                email: d.email,
                branch_id: d.branch_id,
                status: d.status,
                last_login: d.last_login,
                created_at: at,
                updated_at: at,
            })
            .collect(),
    }
}

/// Role view over the bundled data.
pub fn demo_view(viewer: &Viewer) -> RoleView {
    select_view(viewer, &snapshot())
}

/// Write the bundled data into the store under fixed ids. Re-running
/// overwrites the sample records and leaves everything else alone.
pub async fn seed(hotel: &Hotel) -> Result<(), CoreError> {
    let branches = hotel.branches();
    let rooms = hotel.rooms();
    let bookings = hotel.bookings();
    let complaints = hotel.complaints();
    let users = hotel.users();

    let branch_drafts = branch_drafts();
    let room_drafts = room_drafts();
    let booking_drafts = booking_drafts();
    let complaint_drafts = complaint_drafts();
    let user_drafts = user_drafts();

    tokio::try_join!(
        try_join_all(branch_drafts.iter().map(|(id, d)| branches.put(id, d))),
        try_join_all(room_drafts.iter().map(|(id, d)| rooms.put(id, d))),
        try_join_all(booking_drafts.iter().map(|(id, d)| bookings.put(id, d))),
        try_join_all(complaint_drafts.iter().map(|(id, d)| complaints.put(id, d))),
        try_join_all(user_drafts.iter().map(|(id, d)| users.put(id, d))),
    )?;

    info!(
        "Seeded demo data: {} branches, {} rooms, {} bookings, {} complaints, {} users",
        branch_drafts.len(),
        room_drafts.len(),
        booking_drafts.len(),
        complaint_drafts.len(),
        user_drafts.len()
    );
    Ok(())
}
