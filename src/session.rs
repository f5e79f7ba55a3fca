pub(crate) mod compose_session;
pub(crate) mod opts;
