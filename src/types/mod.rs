//! Types shared across the engine: inert newtypes in [`basic`], the votable-entity type in
//! [`target`].

pub mod basic;

pub mod target;
