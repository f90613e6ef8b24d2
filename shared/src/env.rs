use std::{env, str::FromStr};
use strum::EnumString;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    #[strum(serialize = "development", serialize = "dev")]
    Development,
    #[strum(serialize = "production", serialize = "prod")]
    Production,
}

// ENV が未設定の場合、デバッグビルドでは開発環境、リリースビルドでは本番環境とみなす
pub fn which() -> Environment {
    #[cfg(debug_assertions)]
    let default_env = Environment::Development;
    #[cfg(not(debug_assertions))]
    let default_env = Environment::Production;

    match env::var("ENV") {
        Err(_) => default_env,
        Ok(v) => Environment::from_str(&v).unwrap_or(default_env),
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("development", Some(Environment::Development))]
    #[case("DEV", Some(Environment::Development))]
    #[case("production", Some(Environment::Production))]
    #[case("prod", Some(Environment::Production))]
    #[case("staging", None)]
    fn parse_env_value(#[case] input: &str, #[case] expected: Option<Environment>) {
        assert_eq!(Environment::from_str(input).ok(), expected);
    }
}
