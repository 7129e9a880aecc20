use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "weft",
    about = "Weft: component markers and request body tooling",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the marker comments for a component invocation.
    ///
    /// Parameters are NAME=VALUE pairs. VALUE is parsed as JSON and
    /// falls back to a plain string (`Title=hello` and `Count=5` both work).
    Marker {
        /// Module (assembly) the component lives in
        #[arg(short, long)]
        assembly: Option<String>,
        /// Fully-qualified component type name
        #[arg(short, long)]
        type_name: Option<String>,
        /// Component parameter as NAME=VALUE (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,
        /// Emit a start/end pair with a prerender id
        #[arg(long)]
        prerendered: bool,
        /// Override the render mode (webassembly or server)
        #[arg(short, long)]
        render_mode: Option<String>,
        /// Path to weft.toml
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Manage weft.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a weft.toml scaffold
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
    },
    /// Print the effective configuration
    Show {
        #[arg(short, long, default_value = "weft.toml")]
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("weft=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Marker {
            assembly,
            type_name,
            params,
            prerendered,
            render_mode,
            config,
        } => {
            let request = commands::marker::MarkerRequest {
                assembly,
                type_name,
                params,
                prerendered,
                render_mode,
                config,
            };
            print!("{}", commands::marker::render(&request)?);
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path } => commands::config::init(&path),
            ConfigAction::Show { path } => commands::config::show(&path),
        },
    }
}
