pub(crate) mod auth;
pub(crate) mod bookings;
pub(crate) mod health;
pub(crate) mod rooms;
