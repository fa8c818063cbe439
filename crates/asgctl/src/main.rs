use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "asgctl",
    about = "Scaling-group tooling: sign and verify API requests, check cloud configs",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a JSON request body and print the request metadata.
    Sign {
        /// JSON body file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        body: String,
        /// Secret key
        #[arg(short, long, env = "ASG_SECRET_KEY")]
        secret: String,
        /// Access key placed in the metadata
        #[arg(short, long, env = "ASG_ACCESS_KEY", default_value = "")]
        access_key: String,
        /// Request time in unix milliseconds (default: now)
        #[arg(short = 't', long)]
        request_time: Option<u64>,
        /// Sign without the signedHeader merge (body + requestTime only)
        #[arg(long)]
        first_pass: bool,
        /// Also print the canonical string that was signed
        #[arg(long)]
        show_canonical: bool,
    },
    /// Verify a signature over a JSON request body.
    ///
    /// Exits non-zero when the signature does not match.
    Verify {
        #[arg(short, long, default_value = "-")]
        body: String,
        #[arg(short, long, env = "ASG_SECRET_KEY")]
        secret: String,
        /// Signature to check
        #[arg(long)]
        signature: String,
        /// Metadata entries as name=value (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Validate a cloud configuration file and its node-group specs.
    CheckConfig {
        /// Path to the TOML config
        #[arg(short, long, default_value = "cloud.toml")]
        path: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("asgctl=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sign {
            body,
            secret,
            access_key,
            request_time,
            first_pass,
            show_canonical,
        } => commands::sign::sign(&commands::sign::SignArgs {
            body: &body,
            secret: &secret,
            access_key: &access_key,
            request_time,
            first_pass,
            show_canonical,
        }),
        Commands::Verify {
            body,
            secret,
            signature,
            headers,
        } => commands::sign::verify(&body, &secret, &signature, &headers),
        Commands::CheckConfig { path, format } => commands::config::check(&path, &format),
    }
}
