//! Secret handling
//!
//! The dashboard key is the only secret Menubot holds. It is wrapped in
//! `SecretString` so it never shows up in logs or `Debug` output.

pub mod string;

pub use string::SecretString;
