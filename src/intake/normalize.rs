//! Keyword and number matching for user replies.
//!
//! Every matcher works on the trimmed, lowercased input. Menu keys are exact
//! matches; keywords are substring matches.

use std::sync::LazyLock;

use regex::Regex;

use super::model::{ProjectType, Room, Unit};

/// Runs of characters that can make up a typed phone number.
static PHONE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d\s()+\-]+").expect("phone run pattern is valid"));

/// Words that confirm the channel's own number in the phone step.
const PHONE_CONFIRM_KEYWORDS: [&str; 3] = ["sim", "este", "correto"];

/// Markers that accept the follow-up offer.
const FOLLOW_UP_KEYWORDS: [&str; 3] = ["sim", "✅", "quero"];

/// Minimum accepted name length, in characters.
pub const MIN_NAME_CHARS: usize = 2;

fn normalized(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Unit menu: `1`/"ijui" or `2`/"catuipe".
pub fn parse_unit(input: &str) -> Option<Unit> {
    let text = normalized(input);
    if text == "1" || text.contains("ijui") {
        Some(Unit::Ijui)
    } else if text == "2" || text.contains("catuipe") {
        Some(Unit::Catuipe)
    } else {
        None
    }
}

/// Trimmed name, or `None` when it is too short to be a name.
pub fn parse_name(input: &str) -> Option<String> {
    let name = input.trim();
    (name.chars().count() >= MIN_NAME_CHARS).then(|| name.to_string())
}

/// Whether the client confirmed the number they are writing from.
pub fn confirms_channel_phone(input: &str) -> bool {
    let text = normalized(input);
    PHONE_CONFIRM_KEYWORDS.iter().any(|k| text.contains(k))
}

/// First run of digits, spaces, `+`, `-` and parentheses that contains at
/// least one digit, trimmed.
pub fn find_phone(input: &str) -> Option<&str> {
    PHONE_RUN
        .find_iter(input)
        .map(|m| m.as_str().trim())
        .find(|run| run.chars().any(|c| c.is_ascii_digit()))
}

/// Pull a typed phone number out of free text, falling back to the trimmed
/// input.
pub fn extract_phone(input: &str) -> String {
    find_phone(input).unwrap_or_else(|| input.trim()).to_string()
}

/// Project menu: `1`/"tenho" or `2`/"novo"/"preciso".
pub fn parse_project_type(input: &str) -> Option<ProjectType> {
    let text = normalized(input);
    if text == "1" || text.contains("tenho") {
        Some(ProjectType::HasArchitectPlan)
    } else if text == "2" || text.contains("novo") || text.contains("preciso") {
        Some(ProjectType::NeedsNewPlan)
    } else {
        None
    }
}

/// Menu keys for `Room::VOCABULARY`, in order.
const ROOM_KEYS: [&str; 6] = ["1", "2", "3", "4", "5", "6"];

/// Room menu. Never fails: exact menu key, then vocabulary substring, then
/// the trimmed input as a custom room.
pub fn parse_room(input: &str) -> Room {
    let text = normalized(input);

    if let Some(room) = ROOM_KEYS
        .iter()
        .position(|key| *key == text)
        .and_then(|i| Room::VOCABULARY.into_iter().nth(i))
    {
        return room;
    }

    Room::VOCABULARY
        .into_iter()
        .find(|room| text.contains(&room.name().to_lowercase()))
        .unwrap_or_else(|| Room::Custom(input.trim().to_string()))
}

/// Follow-up offer. Anything without an accepting marker is a no.
pub fn wants_follow_up(input: &str) -> bool {
    let text = normalized(input);
    FOLLOW_UP_KEYWORDS.iter().any(|k| text.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_by_key_and_keyword() {
        assert_eq!(parse_unit("1"), Some(Unit::Ijui));
        assert_eq!(parse_unit(" Ijui "), Some(Unit::Ijui));
        assert_eq!(parse_unit("IJUI"), Some(Unit::Ijui));
        assert_eq!(parse_unit("2"), Some(Unit::Catuipe));
        assert_eq!(parse_unit("catuipe"), Some(Unit::Catuipe));
        assert_eq!(parse_unit("prefiro Catuipe"), Some(Unit::Catuipe));
    }

    #[test]
    fn unit_rejects_other_input() {
        assert_eq!(parse_unit("3"), None);
        assert_eq!(parse_unit("12"), None);
        assert_eq!(parse_unit("porto alegre"), None);
        assert_eq!(parse_unit(""), None);
    }

    #[test]
    fn name_requires_two_chars() {
        assert_eq!(parse_name("A"), None);
        assert_eq!(parse_name("  A  "), None);
        assert_eq!(parse_name(""), None);
        assert_eq!(parse_name("  Ana Silva "), Some("Ana Silva".to_string()));
        assert_eq!(parse_name("Jô"), Some("Jô".to_string()));
    }

    #[test]
    fn phone_confirmation_keywords() {
        assert!(confirms_channel_phone("Sim"));
        assert!(confirms_channel_phone("é este mesmo"));
        assert!(confirms_channel_phone("está correto"));
        assert!(!confirms_channel_phone("(55) 99999-0000"));
    }

    #[test]
    fn phone_extracted_from_text() {
        assert_eq!(extract_phone("meu número é (55) 99876-5432"), "(55) 99876-5432");
        assert_eq!(extract_phone("+55 55 91234-5678 obrigado"), "+55 55 91234-5678");
        assert_eq!(extract_phone("5599998888"), "5599998888");
    }

    #[test]
    fn find_phone_needs_a_digit() {
        assert_eq!(find_phone("sim, (55) 99876-5432"), Some("(55) 99876-5432"));
        assert_eq!(find_phone("sim"), None);
        assert_eq!(find_phone(" - "), None);
    }

    #[test]
    fn phone_falls_back_to_raw_input() {
        assert_eq!(extract_phone("  não tenho  "), "não tenho");
        assert_eq!(extract_phone("ligue - depois"), "ligue - depois");
    }

    #[test]
    fn project_by_key_and_keyword() {
        assert_eq!(parse_project_type("1"), Some(ProjectType::HasArchitectPlan));
        assert_eq!(
            parse_project_type("Já tenho projeto"),
            Some(ProjectType::HasArchitectPlan)
        );
        assert_eq!(parse_project_type("2"), Some(ProjectType::NeedsNewPlan));
        assert_eq!(parse_project_type("um novo"), Some(ProjectType::NeedsNewPlan));
        assert_eq!(
            parse_project_type("preciso de ajuda"),
            Some(ProjectType::NeedsNewPlan)
        );
        assert_eq!(parse_project_type("talvez"), None);
    }

    #[test]
    fn room_by_menu_key() {
        assert_eq!(parse_room("1"), Room::Kitchen);
        assert_eq!(parse_room(" 5 "), Room::Office);
        assert_eq!(parse_room("6"), Room::Other);
    }

    #[test]
    fn room_by_substring() {
        assert_eq!(parse_room("quero um escritório"), Room::Office);
        assert_eq!(parse_room("BANHEIRO social"), Room::Bathroom);
        assert_eq!(parse_room("sala de estar"), Room::LivingRoom);
    }

    #[test]
    fn room_free_text() {
        assert_eq!(parse_room("varanda"), Room::Custom("varanda".into()));
        assert_eq!(parse_room(" Área gourmet "), Room::Custom("Área gourmet".into()));
        assert_eq!(parse_room("7"), Room::Custom("7".into()));
        assert_eq!(parse_room("0"), Room::Custom("0".into()));
    }

    #[test]
    fn room_keys_must_match_exactly() {
        assert_eq!(parse_room("+1"), Room::Custom("+1".into()));
        assert_eq!(parse_room("01"), Room::Custom("01".into()));
        assert_eq!(parse_room("0006"), Room::Custom("0006".into()));
        assert_eq!(parse_room("1."), Room::Custom("1.".into()));
    }

    #[test]
    fn follow_up_markers() {
        assert!(wants_follow_up("Sim"));
        assert!(wants_follow_up("✅"));
        assert!(wants_follow_up("quero sim"));
        assert!(!wants_follow_up("não"));
        assert!(!wants_follow_up("❌ Não, apenas registrar"));
        assert!(!wants_follow_up(""));
    }
}
