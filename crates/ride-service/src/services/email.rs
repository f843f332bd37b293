//! Outgoing email content

use ride_core::entities::User;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Account verification message carrying a signed token
pub fn confirmation_email(user: &User, token: &str, verify_base_url: &str) -> OutgoingEmail {
    let link = format!(
        "{}/users/verify?token={token}",
        verify_base_url.trim_end_matches('/')
    );
    let name = escape_html(&user.first_name);
    let username = escape_html(&user.username);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <body>
    <p>Hi {name},</p>
    <p>Thanks for joining Comparte Ride as <strong>@{username}</strong>.</p>
    <p>Verify your account within the next 3 days to start offering and taking rides:</p>
    <p><a href="{link}">Verify my account</a></p>
    <p>If the link does not work, copy this token into the app:</p>
    <pre>{token}</pre>
  </body>
</html>
"#
    );

    OutgoingEmail {
        to: user.email.clone(),
        subject: format!(
            "Welcome @{}! Verify your account to start using Comparte Ride",
            user.username
        ),
        html,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ride_core::Snowflake;

    fn user() -> User {
        User::new(
            Snowflake::new(1),
            "ana@example.com".to_string(),
            "ana_p".to_string(),
            "<Ana>".to_string(),
            "Perez".to_string(),
        )
    }

    #[test]
    fn test_confirmation_email() {
        let email = confirmation_email(&user(), "abc.def.ghi", "https://ride.example.com/");
        assert_eq!(email.to, "ana@example.com");
        assert_eq!(
            email.subject,
            "Welcome @ana_p! Verify your account to start using Comparte Ride"
        );
        assert!(email
            .html
            .contains("https://ride.example.com/users/verify?token=abc.def.ghi"));
        assert!(email.html.contains("&lt;Ana&gt;"));
    }
}
