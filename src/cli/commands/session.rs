use clap::{Arg, ArgMatches, Command, builder::ValueParser};

use crate::session::{
    Environment,
    policy::{ACCESS_TOKEN_MAX_AGE_SECONDS, REFRESH_TOKEN_MAX_AGE_SECONDS},
};

pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_ACCESS_TOKEN_MAX_AGE: &str = "access-token-max-age";
pub const ARG_REFRESH_TOKEN_MAX_AGE: &str = "refresh-token-max-age";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub environment: Environment,
    pub access_max_age: i64,
    pub refresh_max_age: i64,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            environment: matches
                .get_one::<Environment>(ARG_ENVIRONMENT)
                .copied()
                .unwrap_or_default(),
            access_max_age: matches
                .get_one::<i64>(ARG_ACCESS_TOKEN_MAX_AGE)
                .copied()
                .unwrap_or(ACCESS_TOKEN_MAX_AGE_SECONDS),
            refresh_max_age: matches
                .get_one::<i64>(ARG_REFRESH_TOKEN_MAX_AGE)
                .copied()
                .unwrap_or(REFRESH_TOKEN_MAX_AGE_SECONDS),
        }
    }
}

#[must_use]
pub fn validator_environment() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<Environment, String> {
        Environment::parse(value)
            .ok_or_else(|| format!("invalid environment '{value}', expected development or production"))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment: development or production")
                .long_help(
                    "Deployment environment: development or production.\nProduction marks the session cookies Secure.",
                )
                .env("VEHIREG_ENV")
                .default_value("development")
                .value_parser(validator_environment()),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_MAX_AGE)
                .long(ARG_ACCESS_TOKEN_MAX_AGE)
                .help("Access token cookie lifetime in seconds")
                .env("VEHIREG_ACCESS_TOKEN_MAX_AGE")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_MAX_AGE)
                .long(ARG_REFRESH_TOKEN_MAX_AGE)
                .help("Refresh token cookie lifetime in seconds")
                .env("VEHIREG_REFRESH_TOKEN_MAX_AGE")
                .default_value("14400")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}
