//! The persistent state of the engine: the pluggable store interface, the key namespace, typed
//! accessors over both, and the bundled Redis implementation.

pub mod accessors;

pub mod keys;

pub mod pluggables;

pub mod redis;
