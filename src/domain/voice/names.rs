use super::Role;

/// Map a capitalised speaker name used in transcripts to its role.
///
/// Covers the display names of the current voice table and the names older
/// script templates used before roles were introduced.
pub fn role_for_name(name: &str) -> Option<Role> {
    let role = match name {
        // Current display names
        "Alex" => Role::Host,
        "Morgan" => Role::Expert,
        "Sam" => Role::Questioner,
        "Jordan" => Role::Correspondent,
        // Legacy template names
        "Sarah" | "Emily" => Role::Host,
        "David" | "Chen" => Role::Expert,
        "Maya" | "Lucas" => Role::Questioner,
        "James" | "Elena" => Role::Correspondent,
        _ => return None,
    };
    Some(role)
}
