//! The `token` command.

use async_trait::async_trait;
use formcraft_core::signing::TokenSigner;
use formcraft_core::{FormcraftError, FormcraftResult, Settings};

use crate::command::ManagementCommand;

/// Prints a bearer token for a principal, signed with the configured secret.
pub struct TokenCommand;

/// Issues a token for `principal` with the settings' secret key.
pub fn issue_token(settings: &Settings, principal: &str) -> FormcraftResult<String> {
    if settings.secret_key.is_empty() {
        return Err(FormcraftError::ConfigurationError(
            "secret_key must be set to issue tokens".to_string(),
        ));
    }
    TokenSigner::from_settings(settings).issue(principal)
}

#[async_trait]
impl ManagementCommand for TokenCommand {
    fn name(&self) -> &'static str {
        "token"
    }

    fn help(&self) -> &'static str {
        "Issues a bearer token for a principal"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("principal")
                .required(true)
                .help("The principal (user id) the token is for"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormcraftResult<()> {
        let principal = matches
            .get_one::<String>("principal")
            .map_or("", String::as_str);
        let token = issue_token(settings, principal)?;
        println!("{token}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_token_round_trip() {
        let settings = Settings {
            secret_key: "s3cret".into(),
            ..Settings::default()
        };
        let token = issue_token(&settings, "user_1").unwrap();
        let principal = TokenSigner::new("s3cret").verify(&token, Some(60)).unwrap();
        assert_eq!(principal, "user_1");
    }

    #[test]
    fn test_issue_token_needs_secret() {
        assert!(issue_token(&Settings::default(), "user_1").is_err());
    }
}
