use alias_console::logging::{self, LogLevel};
use alias_console::{Config, Console, EchoEngine};
use anyhow::{Context, Result};
use argh::FromArgs;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(FromArgs)]
/// Console that lets registered names be called shell-style: `pos x 10` runs `pos(x, 10)`.
struct Args {
    #[argh(option)]
    /// TOML file with console settings and aliases.
    config: Option<PathBuf>,

    #[argh(option)]
    /// run this script file and exit instead of starting the console.
    script: Option<PathBuf>,

    #[argh(option)]
    /// register a plain alias; may be repeated.
    alias: Vec<String>,

    #[argh(option)]
    /// register a vararg alias; may be repeated.
    vararg: Vec<String>,

    #[argh(option)]
    /// print the translation of this text and exit.
    translate: Option<String>,

    #[argh(switch, short = 'v')]
    /// log diagnostics at debug level.
    verbose: bool,

    #[argh(option)]
    /// log level: trace, debug, info, warn or error; overrides --verbose.
    log_level: Option<LogLevel>,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    logging::init(LogLevel::for_cli(args.verbose, args.log_level));

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    for name in &args.alias {
        alias_console::config::validate_alias_name(name)?;
    }
    for name in &args.vararg {
        alias_console::config::validate_alias_name(name)?;
    }
    config.aliases.plain.extend(args.alias);
    config.aliases.vararg.extend(args.vararg);
    debug!(
        plain = config.aliases.plain.len(),
        vararg = config.aliases.vararg.len(),
        "aliases configured"
    );

    if let Some(text) = &args.translate {
        println!("{}", config.translator().translate(text));
        return Ok(());
    }

    let mut console = Console::from_config(&config, Box::new(EchoEngine));
    if let Some(path) = &args.script {
        let code = console.run_script_file(path)?;
        if code != 0 {
            std::process::exit(code);
        }
        return Ok(());
    }

    info!("starting console");
    console.repl()?;
    Ok(())
}
