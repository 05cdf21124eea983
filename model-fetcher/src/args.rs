use std::path::PathBuf;

use constants::stage::StageKey;

use crate::error::FetchError;

pub const DEFAULT_OUTPUT_DIR: &str = "water-supply-viewer/assets";
pub const DEFAULT_API_BASE: &str = "https://api.sketchfab.com/v3";
pub const TOKEN_ENV_VAR: &str = "MODEL_API_TOKEN";

pub const USAGE: &str = "\
Usage: model-fetcher [--output <assets dir>] [--stage <key>]... [--token <token>] [--api-base <url>]

Downloads one GLB model per water supply stage and writes models/manifest.json
under the output directory. Without a token an empty manifest is written.

Options:
  --output <dir>      Asset root of the viewer (default: water-supply-viewer/assets)
  --stage <key>       Stage to fetch; repeat for several (default: all)
  --token <token>     API token (default: $MODEL_API_TOKEN)
  --api-base <url>    Model API base URL
  --help              Show this message

Stages: lake, dam, canal, treatment_plant, pump_station, pipeline, residential";

#[derive(Debug, Clone, PartialEq)]
pub struct FetchArgs {
    pub output: PathBuf,
    pub stages: Vec<StageKey>,
    pub token: Option<String>,
    pub api_base: String,
    pub show_help: bool,
}

impl FetchArgs {
    /// Parse command line arguments (without the program name). `env_token`
    /// is only used when `--token` is absent.
    pub fn parse<I>(args: I, env_token: Option<String>) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut output = PathBuf::from(DEFAULT_OUTPUT_DIR);
        let mut stages = Vec::new();
        let mut token = None;
        let mut api_base = DEFAULT_API_BASE.to_string();
        let mut show_help = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => show_help = true,
                "--output" | "-o" => output = PathBuf::from(value_for(&arg, args.next())?),
                "--stage" | "-s" => {
                    let value = value_for(&arg, args.next())?;
                    let stage = StageKey::from_string(&value).ok_or_else(|| {
                        FetchError::InvalidArgument(format!("unknown stage '{}'", value))
                    })?;
                    if !stages.contains(&stage) {
                        stages.push(stage);
                    }
                }
                "--token" => token = Some(value_for(&arg, args.next())?),
                "--api-base" => {
                    api_base = value_for(&arg, args.next())?
                        .trim_end_matches('/')
                        .to_string()
                }
                other => {
                    return Err(FetchError::InvalidArgument(format!(
                        "unexpected argument '{}'",
                        other
                    )));
                }
            }
        }

        if stages.is_empty() {
            stages = StageKey::ALL.to_vec();
        }
        let token = token
            .or(env_token)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            output,
            stages,
            token,
            api_base,
            show_help,
        })
    }

    pub fn models_dir(&self) -> PathBuf {
        self.output.join(constants::path::MODEL_DIRECTORY)
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, FetchError> {
    match value {
        Some(v) if !v.starts_with("--") => Ok(v),
        _ => Err(FetchError::InvalidArgument(format!(
            "{} requires a value",
            flag
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: Option<&str>) -> Result<FetchArgs, FetchError> {
        FetchArgs::parse(
            args.iter().map(|a| a.to_string()),
            env.map(str::to_string),
        )
    }

    #[test]
    fn defaults_fetch_every_stage() {
        let args = parse(&[], None).unwrap();
        assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(args.stages, StageKey::ALL.to_vec());
        assert_eq!(args.token, None);
        assert_eq!(args.api_base, DEFAULT_API_BASE);
        assert!(!args.show_help);
        assert_eq!(
            args.models_dir(),
            PathBuf::from(DEFAULT_OUTPUT_DIR).join("models")
        );
    }

    #[test]
    fn repeated_stages_keep_order_without_duplicates() {
        let args = parse(
            &["--stage", "dam", "--stage", "lake", "-s", "dam", "--output", "out"],
            None,
        )
        .unwrap();
        assert_eq!(args.stages, vec![StageKey::Dam, StageKey::Lake]);
        assert_eq!(args.output, PathBuf::from("out"));
    }

    #[test]
    fn flag_token_wins_over_environment() {
        let args = parse(&["--token", "abc"], Some("env")).unwrap();
        assert_eq!(args.token.as_deref(), Some("abc"));

        let args = parse(&[], Some("env")).unwrap();
        assert_eq!(args.token.as_deref(), Some("env"));

        let args = parse(&[], Some("   ")).unwrap();
        assert_eq!(args.token, None);
    }

    #[test]
    fn api_base_drops_trailing_slash() {
        let args = parse(&["--api-base", "http://localhost:8080/v3/"], None).unwrap();
        assert_eq!(args.api_base, "http://localhost:8080/v3");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(&["--stage", "ocean"], None),
            Err(FetchError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse(&["--output"], None),
            Err(FetchError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse(&["--token", "--stage"], None),
            Err(FetchError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse(&["extra"], None),
            Err(FetchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn help_flag() {
        assert!(parse(&["--help"], None).unwrap().show_help);
    }
}
