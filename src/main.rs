// SPDX-License-Identifier: MPL-2.0
use eye_fatigue::app::{self, paths, Flags};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
eye-fatigue: photograph an eye and get a fatigue assessment

USAGE:
    eye-fatigue [OPTIONS] [IMAGE]

ARGS:
    [IMAGE]                Image to preload as the pending photo

OPTIONS:
    -h, --help             Print this help
    --lang <LOCALE>        UI language (e.g. en-US, fr)
    --endpoint <URL>       Analysis service endpoint
    --config-dir <DIR>     Directory holding settings.toml
    --data-dir <DIR>       Directory holding state.cbor

ENVIRONMENT:
    RUST_LOG               Log filter (default: eye_fatigue=info)
";

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eye_fatigue=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let flags = match parse_flags(args) {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            std::process::exit(2);
        }
    };

    paths::init_cli_overrides(flags.data_dir.clone(), flags.config_dir.clone());

    app::run(flags)
}

fn parse_flags(mut args: pico_args::Arguments) -> Result<Flags, pico_args::Error> {
    let lang = args.opt_value_from_str("--lang")?;
    let endpoint = args.opt_value_from_str("--endpoint")?;
    let config_dir = args.opt_value_from_str("--config-dir")?;
    let data_dir = args.opt_value_from_str("--data-dir")?;
    let file_path = args
        .finish()
        .into_iter()
        .next()
        .and_then(|s| s.into_string().ok());

    Ok(Flags {
        lang,
        endpoint,
        file_path,
        data_dir,
        config_dir,
    })
}
