use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use serde_json::json;

use crate::analytics::EventLog;
use crate::credentials::{self, CredentialsContext};
use crate::easjson::{EasJsonAccessor, Platform};
use crate::errors::EasError;
use crate::graphql::GraphqlClient;
use crate::mutations::{self, WebhookInput};
use crate::project::{evaluate_config_with_env, find_project_root, read_app_config};
use crate::prompts;
use crate::queries::{self, WebhookEvent};
use crate::session::Session;
use crate::sources::{load_asc_api_key, AscApiKeyPath, TerminalPrompter};
use crate::submit::{submit, ArchiveSource, SubmissionContext};
use crate::tools;
use crate::util::{
    format_submission, format_webhook, print_json, spinner, submission_details_url,
};

#[derive(Parser, Debug)]
#[command(name = "eas", version, about = "EAS command-line client", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    verbose: bool,

    /// Print a single structured JSON payload instead of decorated text
    #[arg(long, global = true)]
    json: bool,

    /// Never prompt; fail when a required value is missing
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Global flags shared by every command handler.
struct GlobalFlags {
    verbose: bool,
    json: bool,
    non_interactive: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display project configuration (app.json + eas.json)
    Config {
        #[arg(short = 'p', long)]
        platform: Option<Platform>,
        /// Name of the build profile from eas.json. Defaults to "production" if defined
        #[arg(short = 'e', long, value_name = "PROFILE_NAME")]
        profile: Option<String>,
        /// Print the build profile only, without the evaluated app config
        #[arg(long)]
        eas_json_only: bool,
    },
    /// Log in to your account
    Login {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// One-time password for accounts with 2FA
        #[arg(long)]
        otp: Option<String>,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the currently authenticated account
    Whoami,
    /// Submit an app archive to the store
    Submit {
        #[arg(short = 'p', long)]
        platform: Option<Platform>,
        /// Name of the submit profile from eas.json
        #[arg(short = 'e', long, value_name = "PROFILE_NAME")]
        profile: Option<String>,
        /// URL of the app archive
        #[arg(long)]
        url: Option<String>,
        /// ID of an existing build to submit
        #[arg(long)]
        id: Option<String>,
    },
    /// Manage webhooks
    Webhook {
        #[command(subcommand)]
        command: WebhookCommands,
    },
    /// Manage updates
    Update {
        #[command(subcommand)]
        command: UpdateCommands,
    },
    /// Manage project credentials
    Credentials {
        #[command(subcommand)]
        command: CredentialsCommands,
    },
    /// Manage environment variables
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
}

#[derive(Subcommand, Debug)]
enum WebhookCommands {
    /// List webhooks on the project
    List {
        /// Event type that triggers the webhook
        #[arg(long)]
        event: Option<WebhookEvent>,
    },
    /// Create a webhook on the project
    Create {
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        event: Option<WebhookEvent>,
        /// Secret used to sign webhook payloads (at least 16 characters)
        #[arg(long)]
        secret: Option<String>,
    },
    /// Update an existing webhook
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        event: Option<WebhookEvent>,
        #[arg(long)]
        secret: Option<String>,
    },
    /// Delete a webhook
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum UpdateCommands {
    /// Publish an update group to a branch
    Publish {
        #[arg(long)]
        branch: Option<String>,
        #[arg(short = 'm', long)]
        message: Option<String>,
        /// Runtime version; resolved with the expo-updates CLI when omitted
        #[arg(long)]
        runtime_version: Option<String>,
        #[arg(short = 'p', long)]
        platform: Option<Platform>,
        /// Path to a JSON file holding the update group manifest
        #[arg(long, value_name = "PATH")]
        group_file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum CredentialsCommands {
    /// Remove an App Store Connect API key from the account
    RemoveAscKey {
        /// Path to the key's .p8 file, used to authenticate an optional revocation
        #[arg(long)]
        key_path: Option<PathBuf>,
        #[arg(long)]
        key_id: Option<String>,
        #[arg(long)]
        issuer_id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum EnvCommands {
    /// Set up direnv-based environment variables for this project
    Init,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let flags = GlobalFlags {
        verbose: cli.verbose,
        json: cli.json,
        non_interactive: cli.non_interactive,
    };
    let mut session = Session::load()?;
    let graphql = GraphqlClient::new(session.auth())?;

    match cli.command {
        Commands::Config {
            platform,
            profile,
            eas_json_only,
        } => config_cmd(&flags, platform, profile, eas_json_only),
        Commands::Login {
            username,
            password,
            otp,
        } => login_cmd(&flags, &mut session, username, password, otp).await,
        Commands::Logout => logout_cmd(&mut session),
        Commands::Whoami => whoami_cmd(&flags, &mut session, &graphql).await,
        Commands::Submit {
            platform,
            profile,
            url,
            id,
        } => submit_cmd(&flags, &mut session, &graphql, platform, profile, url, id).await,
        Commands::Webhook { command } => webhook_cmd(&flags, &mut session, &graphql, command).await,
        Commands::Update { command } => update_cmd(&flags, &mut session, &graphql, command).await,
        Commands::Credentials { command } => {
            credentials_cmd(&flags, &mut session, &graphql, command).await
        }
        Commands::Env { command } => env_cmd(&flags, command).await,
    }
}

fn select_platform(flags: &GlobalFlags, platform: Option<Platform>) -> Result<Platform> {
    match platform {
        Some(platform) => Ok(platform),
        None => {
            let items = vec!["Android".to_string(), "iOS".to_string()];
            let index = prompts::select(flags.non_interactive, "Select a platform", &items)?;
            Ok(match index {
                0 => Platform::Android,
                _ => Platform::Ios,
            })
        }
    }
}

/// Flag value, else "production" when defined, else an interactive pick.
fn select_profile_name(
    flags: &GlobalFlags,
    names: &[String],
    flag: Option<String>,
) -> Result<String> {
    if let Some(name) = flag {
        return Ok(name);
    }
    if names.iter().any(|name| name == "production") {
        return Ok("production".to_string());
    }
    if names.is_empty() {
        return Err(EasError::Config("eas.json declares no profiles".to_string()).into());
    }
    let index = prompts::select(flags.non_interactive, "Select a profile", names)?;
    Ok(names[index].clone())
}

fn config_cmd(
    flags: &GlobalFlags,
    platform: Option<Platform>,
    profile: Option<String>,
    eas_json_only: bool,
) -> Result<()> {
    let project_dir = find_project_root(&std::env::current_dir()?)?;
    let accessor = EasJsonAccessor::from_project_dir(&project_dir)?;
    let profile_name = select_profile_name(flags, &accessor.build_profile_names(), profile)?;
    let platform = select_platform(flags, platform)?;
    let profile = accessor.build_profile(platform, &profile_name)?;

    if eas_json_only {
        if flags.json {
            return print_json(&json!({ "buildProfile": profile }));
        }
        println!(
            "{}",
            style(format!(
                "Build profile \"{profile_name}\" ({})",
                platform.display_name()
            ))
            .bold()
        );
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    let exp = read_app_config(&project_dir)?;
    let evaluated = evaluate_config_with_env(exp, &profile.env);
    if flags.json {
        return print_json(&json!({ "buildProfile": profile, "appConfig": evaluated.exp }));
    }
    println!(
        "{}",
        style(format!("App configuration ({})", project_dir.display())).bold()
    );
    println!("{}", serde_json::to_string_pretty(&evaluated.exp)?);
    println!();
    println!(
        "{}",
        style(format!(
            "Build profile \"{profile_name}\" ({})",
            platform.display_name()
        ))
        .bold()
    );
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

async fn login_cmd(
    flags: &GlobalFlags,
    session: &mut Session,
    username: Option<String>,
    password: Option<String>,
    otp: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompts::input(flags.non_interactive, "Username or email")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompts::password(flags.non_interactive, "Password")?,
    };
    let actor = session.login(&username, &password, otp.as_deref()).await?;
    if flags.json {
        return print_json(&json!({ "username": actor.display_name() }));
    }
    println!("Logged in as {}", style(actor.display_name()).bold());
    Ok(())
}

fn logout_cmd(session: &mut Session) -> Result<()> {
    session.logout()?;
    println!("Logged out");
    Ok(())
}

async fn whoami_cmd(
    flags: &GlobalFlags,
    session: &mut Session,
    graphql: &GraphqlClient,
) -> Result<()> {
    match session.actor(graphql).await? {
        Some(actor) => {
            if flags.json {
                return print_json(&json!({
                    "username": actor.display_name(),
                    "accounts": actor.accounts(),
                }));
            }
            println!("{}", style(actor.display_name()).bold());
            Ok(())
        }
        None => Err(EasError::Credentials("not logged in".to_string()).into()),
    }
}

#[allow(clippy::too_many_arguments)]
async fn submit_cmd(
    flags: &GlobalFlags,
    session: &mut Session,
    graphql: &GraphqlClient,
    platform: Option<Platform>,
    profile: Option<String>,
    url: Option<String>,
    id: Option<String>,
) -> Result<()> {
    let project_dir = find_project_root(&std::env::current_dir()?)?;
    let accessor = EasJsonAccessor::from_project_dir(&project_dir)?;
    let platform = select_platform(flags, platform)?;
    let profile_name = select_profile_name(flags, &accessor.submit_profile_names(), profile)?;
    let profile = accessor.submit_profile(platform, &profile_name)?;

    let actor = session.ensure_logged_in(graphql).await?.clone();
    let exp = read_app_config(&project_dir)?;
    let project_id = exp.project_id()?;

    let archive_source = match (url, id) {
        (Some(_), Some(_)) => {
            return Err(
                EasError::Config("pass either --url or --id, not both".to_string()).into(),
            );
        }
        (Some(url), None) => ArchiveSource::Url(url),
        (None, Some(id)) => ArchiveSource::BuildId(id),
        (None, None) => ArchiveSource::Prompt,
    };

    let ctx = SubmissionContext {
        platform,
        project_dir,
        project_id,
        archive_source,
        profile,
        non_interactive: flags.non_interactive,
        json: flags.json,
        graphql,
    };
    let mut log = EventLog::new(flags.verbose);
    let mut prompter = TerminalPrompter;
    let submission = submit(&ctx, &mut log, &mut prompter).await?;

    if flags.json {
        return print_json(&submission);
    }
    println!("{}", format_submission(&submission));
    let details_url = submission_details_url(&actor.account_name(), &exp.slug, &submission.id);
    println!("{details_url}");
    if !flags.non_interactive
        && prompts::confirm(flags.non_interactive, "Open the submission details page?")?
    {
        let _ = open::that(&details_url);
    }
    Ok(())
}

async fn webhook_cmd(
    flags: &GlobalFlags,
    session: &mut Session,
    graphql: &GraphqlClient,
    command: WebhookCommands,
) -> Result<()> {
    let project_dir = find_project_root(&std::env::current_dir()?)?;
    let actor = session.ensure_logged_in(graphql).await?.clone();
    let exp = read_app_config(&project_dir)?;
    let project_id = exp.project_id()?;
    let project_name = exp.full_name(Some(&actor));

    match command {
        WebhookCommands::List { event } => {
            let pb = spinner(
                &format!("Fetching the list of webhooks on project {project_name}"),
                !flags.json,
            );
            let webhooks = queries::webhooks_by_app_id(graphql, &project_id, event).await;
            match &webhooks {
                Ok(list) => pb.finish_with_message(format!(
                    "Found {} webhooks on project {project_name}",
                    list.len()
                )),
                Err(_) => pb.abandon_with_message(format!(
                    "Couldn't fetch the webhook list for project {project_name}"
                )),
            }
            let webhooks = webhooks?;
            if flags.json {
                return print_json(&webhooks);
            }
            if webhooks.is_empty() {
                println!("There are no webhooks on project {project_name}");
                return Ok(());
            }
            let list = webhooks
                .iter()
                .map(format_webhook)
                .collect::<Vec<_>>()
                .join(&format!("\n\n{}\n\n", style("———").dim()));
            println!("\n{list}");
            Ok(())
        }
        WebhookCommands::Create { url, event, secret } => {
            let input = webhook_input(flags, url, event, secret, None)?;
            let pb = spinner("Creating webhook", !flags.json);
            let webhook = mutations::create_webhook(graphql, &project_id, &input).await;
            match &webhook {
                Ok(_) => pb.finish_with_message("Created webhook"),
                Err(_) => pb.abandon_with_message("Failed to create webhook"),
            }
            let webhook = webhook?;
            if flags.json {
                return print_json(&webhook);
            }
            println!("{}", format_webhook(&webhook));
            Ok(())
        }
        WebhookCommands::Update {
            id,
            url,
            event,
            secret,
        } => {
            let existing = queries::webhook_by_id(graphql, &id).await?;
            let input = webhook_input(flags, url, event, secret, Some(&existing))?;
            let pb = spinner("Updating webhook", !flags.json);
            let webhook = mutations::update_webhook(graphql, &id, &input).await;
            match &webhook {
                Ok(_) => pb.finish_with_message("Updated webhook"),
                Err(_) => pb.abandon_with_message("Failed to update webhook"),
            }
            let webhook = webhook?;
            if flags.json {
                return print_json(&webhook);
            }
            println!("{}", format_webhook(&webhook));
            Ok(())
        }
        WebhookCommands::Delete { id } => {
            let confirmed = prompts::confirm(
                flags.non_interactive,
                &format!("Permanently delete webhook {id}?"),
            )?;
            if !confirmed {
                println!("Aborting");
                return Ok(());
            }
            mutations::delete_webhook(graphql, &id).await?;
            println!("Deleted webhook {id}");
            Ok(())
        }
    }
}

/// Missing webhook fields fall back to the existing webhook (updates) or to
/// prompts; the secret is never echoed back by the server, so it is always
/// asked for when not passed.
fn webhook_input(
    flags: &GlobalFlags,
    url: Option<String>,
    event: Option<WebhookEvent>,
    secret: Option<String>,
    existing: Option<&queries::Webhook>,
) -> Result<WebhookInput> {
    let url = match url.or_else(|| existing.map(|w| w.url.clone())) {
        Some(url) => url,
        None => prompts::input(flags.non_interactive, "Webhook URL")?,
    };
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(EasError::Config(format!("\"{url}\" is not a valid webhook URL")).into());
    }
    let event = match event.or(existing.map(|w| w.event)) {
        Some(event) => event,
        None => {
            let items = vec!["Build".to_string(), "Submit".to_string()];
            let index = prompts::select(flags.non_interactive, "Select an event type", &items)?;
            match index {
                0 => WebhookEvent::Build,
                _ => WebhookEvent::Submit,
            }
        }
    };
    let secret = match secret {
        Some(secret) => secret,
        None => prompts::password(flags.non_interactive, "Webhook secret")?,
    };
    if secret.len() < 16 {
        return Err(
            EasError::Config("the webhook secret must be at least 16 characters".to_string())
                .into(),
        );
    }
    Ok(WebhookInput { url, secret, event })
}

async fn update_cmd(
    flags: &GlobalFlags,
    session: &mut Session,
    graphql: &GraphqlClient,
    command: UpdateCommands,
) -> Result<()> {
    let UpdateCommands::Publish {
        branch,
        message,
        runtime_version,
        platform,
        group_file,
    } = command;

    let project_dir = find_project_root(&std::env::current_dir()?)?;
    session.ensure_logged_in(graphql).await?;
    let exp = read_app_config(&project_dir)?;
    let project_id = exp.project_id()?;
    let platform = select_platform(flags, platform)?;

    let branch_name = match branch {
        Some(branch) => branch,
        None => prompts::input(flags.non_interactive, "Branch to publish on")?,
    };
    let message = match message {
        Some(message) => message,
        None => prompts::input(flags.non_interactive, "Update message")?,
    };
    let runtime_version = match runtime_version {
        Some(version) => version,
        None => resolve_runtime_version(&project_dir, platform).await?,
    };

    let branch_id =
        match queries::update_branch_id_by_name(graphql, &project_id, &branch_name).await? {
            Some(id) => id,
            None => {
                if flags.verbose {
                    eprintln!("Branch \"{branch_name}\" does not exist yet, creating it");
                }
                mutations::create_update_branch(graphql, &project_id, &branch_name).await?
            }
        };

    let group_text = fs::read_to_string(&group_file)
        .map_err(|e| EasError::Config(format!("failed to read {}: {e}", group_file.display())))?;
    let update_info_group: serde_json::Value = serde_json::from_str(&group_text)
        .map_err(|e| EasError::Config(format!("{} is not valid: {e}", group_file.display())))?;

    let input = json!([{
        "branchId": branch_id,
        "updateInfoGroup": update_info_group,
        "runtimeVersion": runtime_version,
        "message": message,
    }]);
    let pb = spinner(
        &format!("Publishing update to branch {branch_name}"),
        !flags.json,
    );
    let publications = mutations::publish_update_group(graphql, input).await;
    match &publications {
        Ok(_) => pb.finish_with_message(format!("Published update to branch {branch_name}")),
        Err(_) => pb.abandon_with_message("Failed to publish update"),
    }
    let publications = publications?;
    if flags.json {
        return print_json(&publications);
    }
    for publication in &publications {
        println!(
            "{} {} ({}, runtime {})",
            style("Update group").dim(),
            publication.group,
            publication.platform,
            publication.runtime_version
        );
        if let Some(permalink) = &publication.manifest_permalink {
            println!("{} {}", style("Manifest").dim(), permalink);
        }
    }
    Ok(())
}

/// Asks the project-local expo-updates CLI for the runtime version.
async fn resolve_runtime_version(
    project_dir: &std::path::Path,
    platform: Platform,
) -> Result<String> {
    let stdout = tools::expo_updates_command(
        project_dir,
        &[
            "runtimeversion:resolve",
            "--platform",
            match platform {
                Platform::Android => "android",
                Platform::Ios => "ios",
            },
        ],
        &Default::default(),
    )
    .await?;
    let parsed: serde_json::Value =
        serde_json::from_str(stdout.trim()).map_err(|_| EasError::ExternalTool {
            tool: "expo-updates".to_string(),
            message: format!("unexpected runtimeversion:resolve output: {stdout}"),
        })?;
    parsed
        .get("runtimeVersion")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| {
            EasError::ExternalTool {
                tool: "expo-updates".to_string(),
                message: "runtimeversion:resolve returned no runtimeVersion".to_string(),
            }
            .into()
        })
}

async fn credentials_cmd(
    flags: &GlobalFlags,
    session: &mut Session,
    graphql: &GraphqlClient,
    command: CredentialsCommands,
) -> Result<()> {
    let CredentialsCommands::RemoveAscKey {
        key_path,
        key_id,
        issuer_id,
    } = command;

    let project_dir = find_project_root(&std::env::current_dir()?)?;
    let actor = session.ensure_logged_in(graphql).await?.clone();

    let accounts = actor.accounts();
    let account = match accounts.len() {
        0 => return Err(EasError::Credentials("this actor has no accounts".to_string()).into()),
        1 => &accounts[0],
        _ => {
            let items: Vec<String> = accounts.iter().map(|a| a.name.clone()).collect();
            let index = prompts::select(flags.non_interactive, "Select an account", &items)?;
            &accounts[index]
        }
    };

    let ctx = CredentialsContext {
        project_dir,
        graphql,
        non_interactive: flags.non_interactive,
    };
    let Some(selected) = credentials::select_asc_api_key(&ctx, &account.id).await? else {
        return Ok(());
    };

    // Local key material, when provided, authenticates the optional
    // revocation step against Apple.
    let asc = match (key_path, key_id, issuer_id) {
        (Some(path), Some(key_id), Some(issuer_id)) => {
            let loaded = load_asc_api_key(&AscApiKeyPath {
                key_p8_path: path,
                key_id,
                issuer_id,
            })?;
            Some(crate::asc::AppStoreConnectClient::new(loaded.key)?)
        }
        _ => None,
    };

    credentials::remove_asc_api_key(&ctx, &selected, asc.as_ref()).await?;
    println!("{}", style("Removed App Store Connect API key").green());
    Ok(())
}

const ENVRC_TEMPLATE: &str =
    "dotenv_if_exists .env;\ndotenv_if_exists .env.local;\ndotenv_if_exists .env.eas.local;\n";

async fn env_cmd(flags: &GlobalFlags, command: EnvCommands) -> Result<()> {
    let EnvCommands::Init = command;
    if flags.non_interactive {
        return Err(EasError::NonInteractive("setting up direnv".to_string()).into());
    }

    let project_dir = find_project_root(&std::env::current_dir()?)?;

    println!("Checking direnv installation...");
    if tools::is_direnv_installed().await {
        println!("direnv is already installed");
    } else {
        println!("direnv is not installed");
        let install = prompts::confirm(
            flags.non_interactive,
            "Do you want the CLI to install direnv for you?",
        )?;
        if !install {
            return Err(EasError::ExternalTool {
                tool: "direnv".to_string(),
                message: "direnv must be installed manually before continuing".to_string(),
            }
            .into());
        }
        tools::install_direnv().await?;
        println!("direnv installed");
    }

    // .envrc
    let envrc_path = project_dir.join(".envrc");
    if envrc_path.exists() {
        let content = fs::read_to_string(&envrc_path)?;
        if content.contains(ENVRC_TEMPLATE) {
            println!(".envrc file is already set up");
        } else if prompts::confirm(
            flags.non_interactive,
            "Do you want to modify the existing .envrc file?",
        )? {
            fs::write(&envrc_path, content + ENVRC_TEMPLATE)?;
            println!(".envrc file modified");
        } else {
            println!("Skipping modifying .envrc file");
        }
    } else {
        fs::write(&envrc_path, ENVRC_TEMPLATE)?;
        println!(".envrc file created");
    }

    // Shell hook
    match tools::shell_direnv_config() {
        Some(config) if config.shell_config_path.exists() => {
            let confirmed = prompts::confirm(
                flags.non_interactive,
                &format!(
                    "Do you want to add the direnv hook to {}?",
                    config.shell_config_path.display()
                ),
            )?;
            if confirmed {
                let content = fs::read_to_string(&config.shell_config_path)?;
                if content.contains(config.hook_cmd) {
                    println!("The direnv hook is already present in the shell config");
                } else {
                    fs::write(
                        &config.shell_config_path,
                        format!("{content}\n{}\n", config.hook_cmd),
                    )?;
                    println!(
                        "Added direnv hook to {}",
                        config.shell_config_path.display()
                    );
                }
            } else {
                println!("Skipping adding the direnv hook to the shell config");
                println!("Learn more: https://direnv.net/docs/hook.html");
            }
        }
        _ => {
            println!("Unable to determine the user's shell");
            println!("You may need to add the direnv hook to your shell config manually.");
            println!("Learn more: https://direnv.net/docs/hook.html");
        }
    }

    // .gitignore
    let gitignore_path = project_dir.join(".gitignore");
    if gitignore_path.exists() {
        let content = fs::read_to_string(&gitignore_path)?;
        let to_add: Vec<&str> = [".envrc", ".env.eas.local", ".env.eas.local.original"]
            .into_iter()
            .filter(|entry| !content.contains(entry))
            .collect();
        if to_add.is_empty() {
            println!(".envrc entries are already present in .gitignore");
        } else if prompts::confirm(
            flags.non_interactive,
            &format!("Do you want to add {} to .gitignore?", to_add.join(",")),
        )? {
            fs::write(&gitignore_path, format!("{content}{}\n", to_add.join("\n")))?;
            println!("{} added to .gitignore", to_add.join(","));
        } else {
            println!("Skipping adding .envrc entries to .gitignore");
        }
    }

    println!("Running direnv allow...");
    tools::direnv_allow(&project_dir).await
}
