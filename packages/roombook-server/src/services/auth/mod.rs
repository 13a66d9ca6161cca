pub(crate) mod jwt;
pub(crate) mod user;
