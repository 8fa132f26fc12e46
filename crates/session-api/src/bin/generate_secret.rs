//! Prints a fresh signing secret for `JWT_SECRET`
//!
//! Run with:
//! ```bash
//! cargo run -p session-api --bin generate-secret
//! ```

use session_common::generate_signing_secret;

fn main() {
    print!("{}", render(&generate_signing_secret()));
}

fn render(secret: &str) -> String {
    format!(
        "Signing secret (base64, 256 bits):\n\
         {secret}\n\
         \n\
         Add to your .env file:\n\
         JWT_SECRET={secret}\n\
         \n\
         Use a different secret per environment and keep it out of version control.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_common::AppConfig;

    #[test]
    fn test_rendered_secret_is_accepted_by_config() {
        let output = render(&generate_signing_secret());
        let line = output
            .lines()
            .find_map(|line| line.strip_prefix("JWT_SECRET="))
            .unwrap();

        let config = AppConfig::from_lookup(|key| match key {
            "SESSION_STORE" => Some("memory".to_string()),
            "JWT_SECRET" => Some(line.to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.session.signing_secret, line);
    }
}
