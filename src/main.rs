/*!
# milelog

Keeps a local copy of a dailymile training log and searches it offline.

## Usage

```text
milelog [OPTIONS] <COMMAND>

Commands:
  sync   Fetch new entries from the API into the local store
  find   Search the local store
  rm     Remove an entry from the local store ("last" or an entry id)
  user   Show the current user, or set the default user

Options:
  -u, --user <USER>          User to act on, overriding MILELOG_USER and the saved default
  -v, --verbose              Print verbose output
      --log-format <FORMAT>  Log format for stderr [default: text] [possible values: text, json]
```

## Configuration

- `MILELOG_DIR`: working directory (defaults to ~/.milelog)
- `MILELOG_USER`: user to act on
- `MILELOG_API_URL`: base URL of the entries API
- `MILELOG_HTTP_TIMEOUT_SECS`: per-request timeout
- `RUST_LOG`: log filter, overriding `--verbose`

Logs go to stderr; command output goes to stdout.
*/

use chrono::Local;
use milelog::cli::{CliArgs, Command};
use milelog::config::Config;
use milelog::constants::{DEFAULT_LOG_LEVEL, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME};
use milelog::errors::AppResult;
use milelog::ops;
use milelog::remote::HttpEntrySource;
use milelog::render::write_entries;
use std::io::{self, Write};
use tracing::{debug, error, info, info_span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

fn main() {
    let args = CliArgs::parse();
    init_logging(args.verbose, args.json_logs());

    let correlation_id = Uuid::new_v4();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = root_span.enter();

    if let Err(e) = run(args) {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .init();
    }
}

fn run(args: CliArgs) -> AppResult<()> {
    debug!("CLI arguments: {:?}", args);

    let config = Config::load()?.with_user_override(args.user.clone());
    config.validate()?;

    match &args.command {
        Command::Sync => {
            let source = HttpEntrySource::new(config.api_url.clone(), config.http_timeout)?;
            let outcome = ops::sync_entries(&config, &source)?;
            println!("{}", outcome);
        }
        Command::Find { format, .. } => {
            let options = args.command.find_options().unwrap_or_default();
            let today = Local::now().date_naive();
            let found = ops::find_entries(&config, &options, today)?;
            info!("Found {} entries", found.len());

            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_entries(&mut out, &found, *format)?;
            out.flush()?;
        }
        Command::Rm { target } => {
            ops::remove_entry(&config, *target)?;
            println!("Entry removed.");
        }
        Command::User { name: Some(name) } => {
            ops::set_default_user(&config, name)?;
            println!("Default user changed to: {}", name);
        }
        Command::User { name: None } => {
            println!("{}", ops::show_user(&config)?);
        }
    }
    Ok(())
}
