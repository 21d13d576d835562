pub(crate) mod logging;

pub(crate) mod mem_store;
