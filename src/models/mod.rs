pub mod booking;
pub mod customer;
pub mod event;

pub use booking::{Booking, BookingFilter, BookingStatus, NewBooking, PaymentMethod, PlanType};
pub use customer::{Customer, LoginRequest, SignupRequest};
pub use event::{BookingEvent, BookingEventKind};
