pub mod booking;
pub mod branch;
pub mod complaint;
pub mod entity;
pub mod room;
pub mod user;

pub use booking::{Booking, BookingPatch, BookingStatus, NewBooking};
pub use branch::{Branch, BranchPatch, NewBranch};
pub use complaint::{Complaint, ComplaintPatch, ComplaintStatus, NewComplaint};
pub use entity::{Entity, EntityRepository};
pub use room::{NewRoom, Room, RoomPatch, RoomStatus};
pub use user::{NewUser, User, UserPatch, UserRole, UserStatus};

use crate::DocumentStore;
use std::sync::Arc;

/// Entry point to the entity access layer: hands out one repository per
/// collection, all sharing the same document store.
#[derive(Clone)]
pub struct Hotel {
    store: Arc<dyn DocumentStore>,
}

impl Hotel {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn repository<E: Entity>(&self) -> EntityRepository<E> {
        EntityRepository::new(self.store.clone())
    }

    pub fn branches(&self) -> EntityRepository<Branch> {
        self.repository()
    }

    pub fn rooms(&self) -> EntityRepository<Room> {
        self.repository()
    }

    pub fn bookings(&self) -> EntityRepository<Booking> {
        self.repository()
    }

    pub fn complaints(&self) -> EntityRepository<Complaint> {
        self.repository()
    }

    pub fn users(&self) -> EntityRepository<User> {
        self.repository()
    }
}
