pub mod person;

pub use person::{DocType, Person, PERSON_SCHEMA};
