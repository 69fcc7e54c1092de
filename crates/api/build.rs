//! Build script for the api crate.
//!
//! `sqlx::migrate!` embeds the migration files at compile time, so Cargo has
//! to rebuild whenever one of them changes.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
