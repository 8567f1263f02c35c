use gtappl::commands::{self, Cli};
use gtappl::platform;
use gtappl::settings::Settings;
use gtappl::utils::config_paths::{ConfigPaths, UserConfig};
use gtappl::utils::logger::init_logger;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_command();

    match main_impl(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(1)
        }
    }
}

fn main_impl(cli: Cli) -> Result<ExitCode, String> {
    let mut paths = ConfigPaths::new().map_err(|e| e.user_message())?;
    if let Some(file) = cli.config.clone() {
        paths = paths.with_config_file(file);
    }

    let user_config = UserConfig::load(&paths.config_file).map_err(|e| e.user_message())?;
    let settings = Settings::resolve(user_config, cli.overrides()).map_err(|e| e.user_message())?;

    let log_file = if settings.log_to_file {
        paths.ensure_runtime_dir().map_err(|e| e.user_message())?;
        Some(paths.log_file.clone())
    } else {
        None
    };
    init_logger(settings.log_level.as_deref(), log_file).map_err(|e| e.to_string())?;

    let api = platform::native().map_err(|e| e.user_message())?;

    commands::execute(cli.command(), &settings, api).map_err(|err| {
        tracing::error!(
            category = err.category().display_name(),
            details = %err.technical_details(),
            "command failed"
        );
        if err.is_recoverable() {
            format!("{}\n\nStart {} first, or pass --target.", err.user_message(), settings.target)
        } else {
            err.user_message()
        }
    })
}
