use clap::Parser;
use nuc::api::{ContainerCommand, ServiceCommand};
use nuc::cli::commands;
use nuc::cli::{
    Cli, Commands, ConfigureAction, DockerAction, ServicesAction, SocketsAction, SystemAction,
};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Configure { ref action } => match action {
            ConfigureAction::SetUrl { api_url } => {
                commands::configure::execute_set_url(&cli, api_url)
            }
            ConfigureAction::Auth { reuse_password } => {
                commands::configure::execute_auth(&cli, *reuse_password)
            }
            ConfigureAction::Show => commands::configure::execute_show(&cli),
            ConfigureAction::Keyring { delete } => commands::keyring::execute(&cli, *delete),
        },
        Commands::ApiVersion => commands::api_version::execute(&cli),
        Commands::System { ref action } => match action {
            SystemAction::Services { action } => match action {
                ServicesAction::List => commands::services::execute_list(&cli),
                ServicesAction::Start { service } => {
                    commands::services::execute_command(&cli, ServiceCommand::Start, service)
                }
                ServicesAction::Stop { service } => {
                    commands::services::execute_command(&cli, ServiceCommand::Stop, service)
                }
                ServicesAction::Restart { service } => {
                    commands::services::execute_command(&cli, ServiceCommand::Restart, service)
                }
            },
            SystemAction::Sockets {
                action: SocketsAction::List,
            } => commands::sockets::execute_list(&cli),
        },
        Commands::Docker { ref action } => match action {
            DockerAction::Ps => commands::docker::execute_ps(&cli),
            DockerAction::Start { container } => {
                commands::docker::execute_command(&cli, ContainerCommand::Start, container)
            }
            DockerAction::Stop { container } => {
                commands::docker::execute_command(&cli, ContainerCommand::Stop, container)
            }
            DockerAction::Rm { image, force } => {
                commands::docker::execute_rm(&cli, image, *force)
            }
        },
        Commands::Shell { ref url } => commands::shell::execute(&cli, url.as_deref()),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        nuc::cli::output::error(&e.to_string());
        if let Some(hint) = e.hint() {
            nuc::cli::output::tip(hint);
        }
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so they never mix with command output.
///
/// `NUC_LOG` takes a full filter directive; otherwise `-v` enables debug
/// and `-vv` trace for this crate.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "warn",
        1 => "warn,nuc=debug",
        _ => "warn,nuc=trace",
    };
    let filter = EnvFilter::try_from_env("NUC_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .compact()
        .init();
}
