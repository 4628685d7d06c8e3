//! Domain services.
//!
//! Each service owns a handle to the shared store, injected at startup, and
//! implements one part of the booking engine.

pub mod availability;
pub mod doctors;
pub mod gateway;
pub mod ledger;
pub mod payments;
pub mod registry;

pub use availability::{compute_availability, options_for_date, treatment_names};
pub use doctors::DoctorDirectory;
pub use gateway::{GatewayError, PaymentGateway, PaymentIntent, StripeGateway};
pub use ledger::{BookingLedger, BookingOutcome};
pub use payments::{PaymentReconciler, to_minor_units};
pub use registry::{SignIn, UserRegistry};
