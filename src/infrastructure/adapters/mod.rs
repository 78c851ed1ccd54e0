//! Infrastructure adapters module
//!
//! Concrete collaborators behind the domain ports: the Razorpay gateway, the
//! Supabase datastore, its in-memory counterpart and the bearer token verifier.

pub mod authentication;
pub mod memory_store;
pub mod razorpay;
pub mod supabase;

pub use authentication::{AuthenticationAdapter, SessionClaims};
pub use memory_store::MemoryStore;
pub use razorpay::RazorpayAdapter;
pub use supabase::SupabaseStore;

use std::sync::Arc;

use crate::domain::ports::{BookingRepository, CouponRepository, DatastoreHealth, ProfileRepository};

/// Per-table handles onto one datastore
#[derive(Clone)]
pub struct Repositories {
    pub coupons: Arc<dyn CouponRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub health: Arc<dyn DatastoreHealth>,
}

impl Repositories {
    /// Share one concrete store across every port it implements
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CouponRepository + BookingRepository + ProfileRepository + DatastoreHealth + 'static,
    {
        Self {
            coupons: store.clone(),
            bookings: store.clone(),
            profiles: store.clone(),
            health: store,
        }
    }
}
