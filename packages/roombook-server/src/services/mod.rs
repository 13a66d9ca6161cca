pub(crate) mod auth;
pub(crate) mod authz;
pub(crate) mod bookings;
pub(crate) mod reviews;
pub(crate) mod rooms;
