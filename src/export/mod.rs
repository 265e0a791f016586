pub(crate) mod artifact;
pub(crate) mod compose;
pub(crate) mod job;
pub(crate) mod store;
