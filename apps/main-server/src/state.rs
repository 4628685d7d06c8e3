//! Application state.

use std::sync::Arc;

use auth::JwtManager;
use booking_store::BookingStore;

use crate::config::Config;
use crate::services::{
    BookingLedger, DoctorDirectory, PaymentGateway, PaymentReconciler, UserRegistry,
};

/// Shared application state.
pub struct AppState<S: BookingStore> {
    /// Portal store, shared by every service.
    pub store: Arc<S>,
    /// Token signer and verifier.
    pub jwt_manager: JwtManager,
    /// Booking ledger.
    pub ledger: BookingLedger<S>,
    /// User registry.
    pub registry: UserRegistry<S>,
    /// Payment reconciler.
    pub payments: PaymentReconciler<S>,
    /// Doctor directory.
    pub doctors: DoctorDirectory<S>,
}

impl<S: BookingStore> AppState<S> {
    /// Creates new application state, wiring every service to `store`.
    pub fn new(
        config: &Config,
        store: Arc<S>,
        jwt_manager: JwtManager,
        gateway: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        let payments =
            PaymentReconciler::new(store.clone(), gateway, config.payment_currency.clone());

        Self {
            ledger: BookingLedger::new(store.clone()),
            registry: UserRegistry::new(store.clone(), jwt_manager.clone()),
            doctors: DoctorDirectory::new(store.clone()),
            payments,
            jwt_manager,
            store,
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;
