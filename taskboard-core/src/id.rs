use uuid::Uuid;

/// Generates a fresh record identifier.
///
/// Identifiers are random v4 UUIDs in hyphenated form. They are unrelated to
/// the storage row key and never change after creation.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
