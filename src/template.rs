//! Tera template registry
//!
//! Templates are compiled once at startup from templates/. A broken
//! template is a deployment error, so failing to compile aborts the
//! process.

use lazy_static::lazy_static;
use tera::Tera;

lazy_static! {
    pub static ref TERA: Tera = match Tera::new("templates/**/*.html") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
}
