use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "slack-relay")]
#[command(about = "Slack relay services and monit notifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the raw line-protocol listener. Each TCP connection sends CHANNEL/LEVEL/FIELD/TEXT/PRETEXT lines, half-closes, and gets the gateway's reply back.
    Raw {
        /// Config file path (default: SLACK_RELAY_CONFIG or ~/.slack-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Socket to listen on (default from config or 0.0.0.0:8081)
        #[arg(long, short, value_name = "ADDR")]
        listen: Option<String>,

        /// Chat gateway URL (default from config or http://localhost:8080)
        #[arg(long = "gw", value_name = "URL")]
        gateway_url: Option<String>,
    },

    /// Run the HTTP relay: forwards any valid JSON body to the webhook (SLACK_GW_URL or relay.postUrl).
    Relay {
        /// Config file path (default: SLACK_RELAY_CONFIG or ~/.slack-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Socket to listen on (default from config or 0.0.0.0:8080)
        #[arg(long, short, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Post a monit alert (from MONIT_* environment) to the webhook.
    Monit {
        /// Options file (YAML with post_url and channel)
        #[arg(short = 'f', long = "file", value_name = "PATH", default_value = relay::monit::DEFAULT_OPTIONS_FILE)]
        file: std::path::PathBuf,

        /// Channel to post to (default from options file or #random)
        #[arg(long)]
        channel: Option<String>,

        /// Slack webhook URL
        #[arg(long)]
        url: Option<String>,

        /// Attachment color (default: guessed from MONIT_EVENT)
        #[arg(long)]
        color: Option<String>,

        /// Enable debug messages
        #[arg(short = 'd', long)]
        debug: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Some(Commands::Monit { debug: true, .. }) => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Some(Commands::Version) => {
            println!("slack-relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Raw {
            config,
            listen,
            gateway_url,
        }) => {
            if let Err(e) = run_raw(config, listen, gateway_url).await {
                log::error!("raw listener failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Relay { config, listen }) => {
            if let Err(e) = run_relay(config, listen).await {
                log::error!("relay failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Monit {
            file,
            channel,
            url,
            color,
            debug: _,
        }) => {
            if let Err(e) = run_monit(file, channel, url, color).await {
                log::error!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_raw(
    config_path: Option<std::path::PathBuf>,
    listen: Option<String>,
    gateway_url: Option<String>,
) -> anyhow::Result<()> {
    let mut config = relay::config::load_config(config_path)?;
    if let Some(l) = listen {
        config.raw.listen = l;
    }
    if let Some(u) = gateway_url {
        config.raw.gateway_url = u;
    }
    relay::raw::run_listener(&config.raw).await
}

async fn run_relay(
    config_path: Option<std::path::PathBuf>,
    listen: Option<String>,
) -> anyhow::Result<()> {
    let mut config = relay::config::load_config(config_path)?;
    if let Some(l) = listen {
        config.relay.listen = l;
    }
    relay::relay::run_relay(&config).await
}

async fn run_monit(
    file: std::path::PathBuf,
    channel: Option<String>,
    url: Option<String>,
    color: Option<String>,
) -> Result<(), relay::monit::MonitError> {
    let options = relay::monit::MonitOptions {
        post_url: url,
        channel,
        color,
    }
    .merge_file(&file)?;
    let event = relay::monit::MonitEvent::from_env();
    relay::monit::notify(&options, &event).await
}
