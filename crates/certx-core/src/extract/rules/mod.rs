//! Rule-based normalizers and patterns for certificate fields.

pub mod address;
pub mod dates;
pub mod name;
pub mod patterns;
pub mod register;
pub mod sex;

pub use address::normalize_address;
pub use dates::normalize_dob;
pub use name::{mentions_any, normalize_name};
pub use register::normalize_register_number;
pub use sex::normalize_sex;
