//! Component id generation.
//!
//! Ids are UUID v7 strings: a 48-bit millisecond timestamp prefix followed
//! by a random suffix. Time-ordered across a request, unique enough that
//! duplicate introduction is ruled out by construction. Ties within the same
//! millisecond are broken by the random suffix.

use uuid::Uuid;

/// Generate a fresh component id.
pub fn new_component_id() -> String {
    Uuid::now_v7().to_string()
}
