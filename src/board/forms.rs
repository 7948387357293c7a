//! Form payloads and the checks run before anything reaches the backend.

use serde::Deserialize;

pub const MIN_PASSWORD_LEN: usize = 6;

pub const INVALID_CREDENTIALS: &str = "이메일 또는 비밀번호가 올바르지 않습니다.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.nickname.trim().is_empty() {
            return Err("닉네임을 입력해주세요.");
        }
        if self.email.trim().is_empty() {
            return Err("이메일을 입력해주세요.");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("비밀번호는 6자 이상이어야 합니다.");
        }
        if self.password != self.password_confirm {
            return Err("비밀번호가 일치하지 않습니다.");
        }
        Ok(())
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("이메일과 비밀번호를 입력해주세요.");
        }
        Ok(())
    }
}

impl PostForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("제목을 입력해주세요.");
        }
        if self.content.trim().is_empty() {
            return Err("내용을 입력해주세요.");
        }
        Ok(())
    }
}

/// Map the auth service's sign-in failure to what members see. Known
/// credential errors get the localized message; anything else is shown
/// as the service worded it.
pub fn login_error_message(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    if lowered.contains("invalid login credentials") || lowered.contains("invalid email or password")
    {
        INVALID_CREDENTIALS.to_string()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            nickname: "포커왕".into(),
            email: "a@example.com".into(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn signup_requires_six_character_password() {
        assert_eq!(
            signup("12345", "12345").validate(),
            Err("비밀번호는 6자 이상이어야 합니다.")
        );
        assert!(signup("123456", "123456").validate().is_ok());
    }

    #[test]
    fn signup_requires_matching_confirmation() {
        assert_eq!(
            signup("123456", "123457").validate(),
            Err("비밀번호가 일치하지 않습니다.")
        );
    }

    #[test]
    fn signup_requires_nickname_and_email() {
        let mut form = signup("123456", "123456");
        form.nickname = "  ".into();
        assert!(form.validate().is_err());

        let mut form = signup("123456", "123456");
        form.email = "".into();
        assert!(form.validate().is_err());
    }

    #[test]
    fn post_form_requires_title_and_content() {
        let form = PostForm {
            title: " ".into(),
            content: "본문".into(),
            tags: String::new(),
        };
        assert_eq!(form.validate(), Err("제목을 입력해주세요."));
    }

    #[test]
    fn credential_errors_are_localized() {
        assert_eq!(
            login_error_message("Invalid login credentials"),
            INVALID_CREDENTIALS
        );
        assert_eq!(
            login_error_message("INVALID EMAIL OR PASSWORD"),
            INVALID_CREDENTIALS
        );
        assert_eq!(
            login_error_message("Email not confirmed"),
            "Email not confirmed"
        );
    }
}
