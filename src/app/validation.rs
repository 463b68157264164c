// src/app/validation.rs
//! Client-side form checks run before any request is sent.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";
pub const PASSWORD_MIN_LEN: usize = 8;

pub const EMAIL_REQUIRED: &str = "⚠ Seu e-mail é obrigatório";
pub const EMAIL_INVALID: &str = "⚠ E-mail inválido";
pub const PASSWORD_REQUIRED: &str = "⚠ É obrigatório digitar uma senha";
pub const PASSWORD_MISMATCH: &str = "⚠ Senhas não conferem";
pub const FULL_NAME_REQUIRED: &str = "⚠ Nome completo é obrigatório";
pub const USERNAME_REQUIRED: &str = "⚠ Nome de usuário é obrigatório";
pub const BIRTH_REQUIRED: &str = "⚠ Data de nascimento é obrigatória";
pub const LOGIN_FIELDS_REQUIRED: &str = "⚠ Preencha todos os campos";
pub const NEW_USERNAME_REQUIRED: &str = "Digite um username válido.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl PasswordRule {
    pub const ALL: [Self; 5] = [
        Self::MinLength,
        Self::Uppercase,
        Self::Lowercase,
        Self::Digit,
        Self::Symbol,
    ];

    pub const fn guidance(self) -> &'static str {
        match self {
            Self::MinLength => "- 8 caracteres",
            Self::Uppercase => "- 1 letra maiúscula",
            Self::Lowercase => "- 1 letra minúscula",
            Self::Digit => "- 1 número",
            Self::Symbol => "- 1 caractere especial (!@#$%^&*)",
        }
    }

    fn holds(self, pw: &str) -> bool {
        match self {
            Self::MinLength => pw.chars().count() >= PASSWORD_MIN_LEN,
            Self::Uppercase => pw.chars().any(|c| c.is_ascii_uppercase()),
            Self::Lowercase => pw.chars().any(|c| c.is_ascii_lowercase()),
            Self::Digit => pw.chars().any(|c| c.is_ascii_digit()),
            Self::Symbol => pw.chars().any(|c| PASSWORD_SYMBOLS.contains(c)),
        }
    }
}

/// Rules the password breaks, in display order.
pub fn failed_password_rules(pw: &str) -> Vec<PasswordRule> {
    PasswordRule::ALL
        .into_iter()
        .filter(|r| !r.holds(pw))
        .collect()
}

/// Itemized guidance listing the full policy.
pub fn password_policy_message() -> String {
    let mut msg = String::from("⚠ Sua senha deve conter ao menos:");
    for rule in PasswordRule::ALL {
        msg.push('\n');
        msg.push_str(rule.guidance());
    }
    msg
}

pub fn validate_email(value: &str) -> Result<(), String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(EMAIL_REQUIRED.into());
    }
    if !EMAIL_RE.is_match(v) {
        return Err(EMAIL_INVALID.into());
    }
    Ok(())
}

pub fn validate_password(value: &str) -> Result<(), String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(PASSWORD_REQUIRED.into());
    }
    if failed_password_rules(v).is_empty() {
        Ok(())
    } else {
        Err(password_policy_message())
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegisterInput {
    pub full_name: String,
    pub username: String,
    pub birth: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Per-field inline errors; all `None` means the form may be submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterErrors {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub birth: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl RegisterErrors {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub fn validate_registration(input: &RegisterInput) -> Result<(), RegisterErrors> {
    let mut errs = RegisterErrors {
        email: validate_email(&input.email).err(),
        password: validate_password(&input.password).err(),
        ..Default::default()
    };
    if input.password.trim() != input.confirm_password.trim() {
        errs.confirm_password = Some(PASSWORD_MISMATCH.into());
    }
    if input.full_name.trim().is_empty() {
        errs.full_name = Some(FULL_NAME_REQUIRED.into());
    }
    if input.username.trim().is_empty() {
        errs.username = Some(USERNAME_REQUIRED.into());
    }
    if input.birth.trim().is_empty() {
        errs.birth = Some(BIRTH_REQUIRED.into());
    }
    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

pub fn validate_login(username: &str, password: &str) -> Result<(), String> {
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(LOGIN_FIELDS_REQUIRED.into());
    }
    Ok(())
}

pub fn validate_new_username(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(NEW_USERNAME_REQUIRED.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> RegisterInput {
        RegisterInput {
            full_name: "Ana Souza".into(),
            username: "ana".into(),
            birth: "1994-03-02".into(),
            email: "ana@example.com".into(),
            password: "Filmes#2024".into(),
            confirm_password: "Filmes#2024".into(),
        }
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["ana.example.com", "ana@", "ana@example", "@example.com", "ana@example.c", "a b@x.com"] {
            assert_eq!(validate_email(bad), Err(EMAIL_INVALID.to_string()), "{bad}");
        }
        assert_eq!(validate_email("   "), Err(EMAIL_REQUIRED.to_string()));
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
    }

    #[test]
    fn each_policy_rule_is_enforced() {
        let cases = [
            ("Sh0rt!", PasswordRule::MinLength),
            ("lowercase1!", PasswordRule::Uppercase),
            ("UPPERCASE1!", PasswordRule::Lowercase),
            ("NoDigits!!", PasswordRule::Digit),
            ("NoSymbol123", PasswordRule::Symbol),
        ];
        for (pw, rule) in cases {
            assert_eq!(failed_password_rules(pw), vec![rule], "{pw}");
            assert_eq!(validate_password(pw), Err(password_policy_message()));
        }
        assert!(validate_password("Filmes#2024").is_ok());
        // '?' is not in the accepted symbol set
        assert_eq!(failed_password_rules("Filmes?2024"), vec![PasswordRule::Symbol]);
    }

    #[test]
    fn policy_message_is_itemized() {
        let msg = password_policy_message();
        assert_eq!(msg.lines().count(), 6);
        assert!(msg.contains("- 1 letra maiúscula"));
    }

    #[test]
    fn registration_reports_every_field() {
        let errs = validate_registration(&RegisterInput::default()).unwrap_err();
        assert_eq!(errs.email.as_deref(), Some(EMAIL_REQUIRED));
        assert_eq!(errs.password.as_deref(), Some(PASSWORD_REQUIRED));
        assert_eq!(errs.full_name.as_deref(), Some(FULL_NAME_REQUIRED));
        assert_eq!(errs.username.as_deref(), Some(USERNAME_REQUIRED));
        assert_eq!(errs.birth.as_deref(), Some(BIRTH_REQUIRED));
        assert_eq!(errs.confirm_password, None);
    }

    #[test]
    fn registration_checks_confirmation_and_policy() {
        assert!(validate_registration(&valid_input()).is_ok());

        let mut input = valid_input();
        input.confirm_password = "Filmes#2025".into();
        let errs = validate_registration(&input).unwrap_err();
        assert_eq!(errs.confirm_password.as_deref(), Some(PASSWORD_MISMATCH));

        let mut input = valid_input();
        input.password = "weakpass".into();
        input.confirm_password = "weakpass".into();
        let errs = validate_registration(&input).unwrap_err();
        assert_eq!(errs.password, Some(password_policy_message()));
    }

    #[test]
    fn login_and_username_presence() {
        assert!(validate_login("ana", "x").is_ok());
        assert_eq!(validate_login(" ", "x"), Err(LOGIN_FIELDS_REQUIRED.to_string()));
        assert!(validate_new_username("  ").is_err());
        assert!(validate_new_username("ana2").is_ok());
    }
}
