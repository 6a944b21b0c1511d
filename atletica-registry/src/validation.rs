//! Field rules for customer records. Each function returns the normalized
//! value or `InvalidValue`.

use atletica_core::{ShopError, ShopResult};

/// 6 to 20 ASCII digits
pub fn student_id(raw: &str) -> ShopResult<String> {
    let id = raw.trim();
    if !(6..=20).contains(&id.len()) || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ShopError::invalid(format!(
            "student id must be 6 to 20 digits, got {:?}",
            id
        )));
    }
    Ok(id.to_string())
}

/// Letters and spaces, at least 3 characters
pub fn name(raw: &str) -> ShopResult<String> {
    let name = raw.trim();
    if name.chars().count() < 3 || !name.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Err(ShopError::invalid(
            "name must have at least 3 characters, letters and spaces only",
        ));
    }
    Ok(name.to_string())
}

pub fn email(raw: &str) -> ShopResult<String> {
    let email = raw.trim();
    let domain_has_dot = email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'));

    if email.len() < 5 || !domain_has_dot {
        return Err(ShopError::invalid(format!("malformed email: {:?}", email)));
    }
    Ok(email.to_string())
}

/// Keeps digits only; area code plus 8 or 9 digit number
pub fn phone(raw: &str) -> ShopResult<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(10..=11).contains(&digits.len()) {
        return Err(ShopError::invalid("phone must have 10 or 11 digits including area code"));
    }
    Ok(digits)
}

/// Capitalizes the first letter of each word, lowercases the rest
fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn length_ok(value: &str) -> bool {
    (2..=50).contains(&value.chars().count())
}

/// Favourite team: 2 to 50 characters of letters, digits, spaces, `-` or `'`
pub fn favorite_team(raw: &str) -> ShopResult<String> {
    let team = title_case(raw);
    let allowed = |c: char| c.is_alphanumeric() || c == ' ' || c == '-' || c == '\'';
    if !length_ok(&team) || !team.chars().all(allowed) {
        return Err(ShopError::invalid(
            "team must have 2 to 50 characters: letters, digits, spaces, hyphens or apostrophes",
        ));
    }
    Ok(team)
}

/// Home city: 2 to 50 characters of letters, spaces or `-`, with at least one letter
pub fn home_city(raw: &str) -> ShopResult<String> {
    let city = title_case(raw);
    let allowed = |c: char| c.is_alphabetic() || c == ' ' || c == '-';
    if !length_ok(&city) || !city.chars().all(allowed) || !city.chars().any(char::is_alphabetic) {
        return Err(ShopError::invalid(
            "city must have 2 to 50 characters: letters, spaces or hyphens",
        ));
    }
    Ok(city)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_id() {
        assert_eq!(student_id(" 20231234 ").unwrap(), "20231234");
        assert!(student_id("12345").is_err());
        assert!(student_id("2023A1234").is_err());
        assert!(student_id("123456789012345678901").is_err());
    }

    #[test]
    fn test_name() {
        assert_eq!(name("  João Araújo ").unwrap(), "João Araújo");
        assert!(name("Jo").is_err());
        assert!(name("R2D2 Silva").is_err());
    }

    #[test]
    fn test_email() {
        assert!(email("ana@ufpe.br").is_ok());
        assert!(email("ana@ufpe").is_err());
        assert!(email("ana.ufpe.br").is_err());
        assert!(email("a@b.").is_err());
    }

    #[test]
    fn test_phone_normalized_to_digits() {
        assert_eq!(phone("(81) 99999-0000").unwrap(), "81999990000");
        assert_eq!(phone("81 3333-4444").unwrap(), "8133334444");
        assert!(phone("9999-0000").is_err());
    }

    #[test]
    fn test_favorite_team() {
        assert_eq!(favorite_team("  sport   club do recife ").unwrap(), "Sport Club Do Recife");
        assert_eq!(favorite_team("america-mg").unwrap(), "America-mg");
        assert_eq!(favorite_team("Botafogo 1904").unwrap(), "Botafogo 1904");
        assert!(favorite_team("S").is_err());
        assert!(favorite_team("   ").is_err());
        assert!(favorite_team("Náutico!").is_err());
        assert!(favorite_team(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_home_city() {
        assert_eq!(home_city("são lourenço da mata").unwrap(), "São Lourenço Da Mata");
        assert!(home_city("Recife2").is_err());
        assert!(home_city("--").is_err());
        assert!(home_city("R").is_err());
    }
}
