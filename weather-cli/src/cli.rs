use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text, validator::Validation};
use weather_screen_core::{
    Config, FailurePolicy, SubmitOutcome, WeatherScreenController, provider_from_config,
};

use crate::render::{TerminalNotifier, render_frame};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-screen", version, about = "Mock weather screen")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Flags that take precedence over the stored configuration.
#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// Override the configured fetch delay, in milliseconds.
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Override the configured failure rate (0.0 - 1.0).
    #[arg(long, global = true)]
    pub failure_rate: Option<f64>,

    /// Seed the mock provider for reproducible readings.
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    /// Layer the flags over `config` and validate the result.
    pub fn apply(&self, mut config: Config) -> anyhow::Result<Config> {
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if let Some(rate) = self.failure_rate {
            config.failure_rate = rate;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a single city and print the screen once.
    Show {
        /// City name.
        city: String,

        /// Print the view model as JSON instead of the rendered screen.
        #[arg(long)]
        json: bool,
    },

    /// Interactive screen: enter cities until Esc.
    Screen,

    /// Edit the stored configuration.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Show { city, json } => {
                let config = self.overrides.apply(Config::load()?)?;
                let outcome = show(&config, city, json).await?;
                Ok(exit_code(&outcome))
            }
            Command::Screen => {
                let config = self.overrides.apply(Config::load()?)?;
                screen(&config).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Whether a one-shot lookup produced a reading on screen.
fn is_success(outcome: &SubmitOutcome) -> bool {
    matches!(outcome, SubmitOutcome::Resolved)
}

fn exit_code(outcome: &SubmitOutcome) -> ExitCode {
    if is_success(outcome) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn build_controller(config: &Config, interactive: bool) -> anyhow::Result<WeatherScreenController> {
    let provider = provider_from_config(config)?;
    let notifier = Arc::new(TerminalNotifier { interactive });

    Ok(WeatherScreenController::new(
        Arc::from(provider),
        notifier,
        config.failure_policy,
    ))
}

/// Submit the current input, letting Ctrl-C abandon the fetch.
async fn submit_with_interrupt(ctl: &mut WeatherScreenController) -> SubmitOutcome {
    let ticket = match ctl.begin_submit() {
        Ok(ticket) => ticket,
        Err(outcome) => return outcome,
    };

    print!("{}", render_frame(&ctl.view_model()));

    let result = tokio::select! {
        res = ctl.run_fetch(&ticket) => Some(res),
        _ = tokio::signal::ctrl_c() => None,
    };

    match result {
        Some(res) => ctl.complete(ticket.request.seq, res),
        None => {
            ctl.cancel_in_flight();
            SubmitOutcome::Cancelled
        }
    }
}

async fn show(config: &Config, city: String, json: bool) -> anyhow::Result<SubmitOutcome> {
    let mut ctl = build_controller(config, false)?;
    ctl.set_city_input(city);

    let outcome = if json {
        ctl.submit().await
    } else {
        submit_with_interrupt(&mut ctl).await
    };
    tracing::debug!(?outcome, "show finished");

    if json {
        let out = serde_json::to_string_pretty(&ctl.view_model())
            .context("Failed to serialize view model")?;
        println!("{out}");
    } else {
        print!("{}", render_frame(&ctl.view_model()));
    }

    Ok(outcome)
}

async fn screen(config: &Config) -> anyhow::Result<()> {
    let mut ctl = build_controller(config, true)?;
    print!("{}", render_frame(&ctl.view_model()));

    loop {
        let input = Text::new("City:")
            .with_placeholder("e.g. Rome")
            .with_initial_value(ctl.state().city_input())
            .with_help_message("Enter to search, Esc to quit")
            .prompt();

        let text = match input {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        ctl.set_city_input(text);
        if submit_with_interrupt(&mut ctl).await == SubmitOutcome::Rejected {
            continue;
        }

        print!("{}", render_frame(&ctl.view_model()));
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "stored configuration is invalid, resetting failure rate");
        eprintln!("Warning: {e} Using the default failure rate.");
        config.failure_rate = Config::default().failure_rate;
    }

    config.delay_ms = CustomType::<u64>::new("Fetch delay (ms):")
        .with_default(config.delay_ms)
        .prompt()?;

    config.failure_rate = CustomType::<f64>::new("Failure rate (0.0 - 1.0):")
        .with_default(config.failure_rate)
        .with_validator(|v: &f64| {
            if (0.0..=1.0).contains(v) {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid("Enter a value between 0.0 and 1.0".into()))
            }
        })
        .prompt()?;

    let seed = Text::new("RNG seed (empty for random):")
        .with_initial_value(&config.seed.map(|s| s.to_string()).unwrap_or_default())
        .with_validator(|v: &str| {
            if v.trim().is_empty() || v.trim().parse::<u64>().is_ok() {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid("Enter a whole number or leave empty".into()))
            }
        })
        .prompt()?;
    config.seed = match seed.trim() {
        "" => None,
        s => Some(s.parse().context("Invalid seed")?),
    };

    let current = FailurePolicy::ALL
        .iter()
        .position(|p| *p == config.failure_policy)
        .unwrap_or(0);
    config.failure_policy = Select::new("When a fetch fails:", FailurePolicy::ALL.to_vec())
        .with_starting_cursor(current)
        .prompt()?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("weather-screen").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn stored() -> Config {
        Config {
            delay_ms: 2000,
            failure_rate: 0.1,
            seed: Some(7),
            failure_policy: FailurePolicy::KeepLastKnownGood,
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_stored_values() {
        let cli = parse(&[
            "show",
            "Rome",
            "--delay-ms",
            "10",
            "--failure-rate",
            "0.5",
            "--seed",
            "3",
        ]);
        let cfg = cli.overrides.apply(stored()).expect("overrides are valid");

        assert_eq!(cfg.delay_ms, 10);
        assert_eq!(cfg.failure_rate, 0.5);
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.failure_policy, FailurePolicy::KeepLastKnownGood);
    }

    #[test]
    fn global_flags_accepted_before_subcommand() {
        let cli = parse(&["--delay-ms", "25", "screen"]);
        assert_eq!(cli.overrides.delay_ms, Some(25));
        assert!(matches!(cli.command, Command::Screen));
    }

    #[test]
    fn absent_flags_keep_stored_values() {
        let cli = parse(&["show", "Rome"]);
        let cfg = cli.overrides.apply(stored()).expect("stored config is valid");
        assert_eq!(cfg, stored());
    }

    #[test]
    fn valid_flag_repairs_out_of_range_file_value() {
        let broken = Config { failure_rate: 2.0, ..stored() };
        assert!(ConfigOverrides::default().apply(broken.clone()).is_err());

        let cli = parse(&["show", "Rome", "--failure-rate", "0.5"]);
        let cfg = cli.overrides.apply(broken).expect("flag replaces bad value");
        assert_eq!(cfg.failure_rate, 0.5);
    }

    #[test]
    fn out_of_range_failure_rate_flag_is_rejected() {
        let cli = parse(&["show", "Rome", "--failure-rate", "1.5"]);
        let err = cli.overrides.apply(stored()).unwrap_err();
        assert!(err.to_string().contains("Invalid failure_rate"));
    }

    #[test]
    fn nan_failure_rate_flag_is_rejected() {
        let cli = parse(&["show", "Rome", "--failure-rate", "NaN"]);
        assert!(cli.overrides.apply(stored()).is_err());
    }

    #[test]
    fn only_resolved_lookups_count_as_success() {
        assert!(is_success(&SubmitOutcome::Resolved));
        for outcome in [
            SubmitOutcome::Rejected,
            SubmitOutcome::Failed,
            SubmitOutcome::Cancelled,
            SubmitOutcome::Busy,
            SubmitOutcome::Stale,
        ] {
            assert!(!is_success(&outcome), "{outcome:?}");
        }
    }
}
