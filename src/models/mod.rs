pub mod enums;

mod anterior_segment;
mod appointment;
mod contact_lens;
mod functional_test;
mod fundus;
mod group;
mod medical_history;
mod patient;
mod refraction;
mod user;
mod working_hours;

pub use anterior_segment::*;
pub use appointment::*;
pub use contact_lens::*;
pub use functional_test::*;
pub use fundus::*;
pub use group::*;
pub use medical_history::*;
pub use patient::*;
pub use refraction::*;
pub use user::*;
pub use working_hours::*;
